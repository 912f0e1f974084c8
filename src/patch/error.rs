//! Patch errors.

use thiserror::Error;

use crate::types::Key;
use crate::vnode::VNode;

/// Errors surfaced by [`Patcher::patch`](super::Patcher::patch).
///
/// A failed patch may leave the host tree partially updated. Identity
/// mismatches are never errors; they fall back to subtree replacement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// An old node carries no host handle: it was never mounted, or it was
    /// already consumed by an earlier patch.
    #[error("node `{sel}` has no host node (never mounted or already patched)")]
    NotRealized { sel: String },

    /// Two siblings share a key. Only reported under
    /// [`KeyValidation::Reject`](super::KeyValidation::Reject).
    #[error("duplicate key `{key}` among children of `{parent}`")]
    DuplicateKey { key: Key, parent: String },

    /// Unmount requested with nothing mounted.
    #[error("nothing is mounted")]
    NothingMounted,
}

/// Short label for a node in diagnostics.
pub(crate) fn describe(node: &VNode) -> String {
    match node.sel() {
        Some(sel) => sel.to_string(),
        None if node.is_text() => "#text".to_string(),
        None => "#empty".to_string(),
    }
}
