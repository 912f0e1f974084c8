//! Core types for spark-vdom.
//!
//! These types are shared by every layer: the node model stores them, the
//! host adapter hands them out, and the patch engine compares them.

use std::fmt;

// =============================================================================
// HostId - Handle into the host node arena
// =============================================================================

/// Opaque handle to a live host node.
///
/// Host nodes are NOT owned by the virtual tree directly. They live in the
/// host adapter's arena and the tree refers to them by index. A patched node
/// takes over its predecessor's handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostId(pub(crate) usize);

impl HostId {
    /// Build a handle from a raw arena index.
    ///
    /// Only meaningful for the host that issued the index.
    pub const fn from_raw(index: usize) -> Self {
        Self(index)
    }

    /// Raw arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Key - Sibling identity
// =============================================================================

/// Sibling key used by the children differ to track moved nodes.
///
/// Keys must be unique among the children of one parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

/// Indices above `i64::MAX` become string keys instead of wrapping.
impl From<usize> for Key {
    fn from(value: usize) -> Self {
        match i64::try_from(value) {
            Ok(n) => Key::Int(n),
            Err(_) => Key::Str(value.to_string()),
        }
    }
}

// =============================================================================
// HookSet (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Lifecycle hook points as a bitfield.
    ///
    /// Modules declare which hooks they supply with it, and per-node hook
    /// tables report which slots are filled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HookSet: u16 {
        const NONE = 0;
        const PRE = 1 << 0;
        const INIT = 1 << 1;
        const CREATE = 1 << 2;
        const INSERT = 1 << 3;
        const PREPATCH = 1 << 4;
        const UPDATE = 1 << 5;
        const POSTPATCH = 1 << 6;
        const DESTROY = 1 << 7;
        const REMOVE = 1 << 8;
        const POST = 1 << 9;
    }
}

impl HookSet {
    /// Hooks a registered module may supply.
    pub const MODULE: Self = Self::PRE
        .union(Self::CREATE)
        .union(Self::UPDATE)
        .union(Self::DESTROY)
        .union(Self::REMOVE)
        .union(Self::POST);
}
