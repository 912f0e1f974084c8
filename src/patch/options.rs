//! Patch configuration.

/// How sibling keys are checked before the children differ runs.
///
/// Duplicate keys make the differ reuse the wrong host nodes. Checking costs
/// one hash set per children list, so it is opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyValidation {
    /// No checking. Duplicate keys give undefined (but memory-safe) results.
    #[default]
    Off,
    /// Log a warning per duplicate and carry on.
    Warn,
    /// Fail the patch with [`PatchError::DuplicateKey`](super::PatchError::DuplicateKey).
    Reject,
}

/// Engine options, fixed at [`Patcher`](super::Patcher) construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchOptions {
    pub key_validation: KeyValidation,
}

impl PatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_validation(mut self, key_validation: KeyValidation) -> Self {
        self.key_validation = key_validation;
        self
    }
}
