//! # spark-vdom
//!
//! Virtual tree reconciliation engine for Rust.
//!
//! Re-renders produce a fresh virtual tree; the engine compares it with the
//! previous one and replays only the differences onto a host tree through a
//! small adapter trait. Built on
//! [spark-signals](https://github.com/RLabs-Inc/spark-signals) for reactive
//! re-rendering.
//!
//! ## Architecture
//!
//! ```text
//! render() → VNode tree → Patcher::patch → Module hooks + Host mutations
//!                              │
//!                              └─ keyed four-pointer children differ
//! ```
//!
//! Host nodes live in the host's own storage and are referred to by
//! [`HostId`] handles. A patched virtual node takes over its predecessor's
//! handle, so unchanged host nodes are never recreated.
//!
//! ## Modules
//!
//! - [`types`] - Core types (HostId, Key, HookSet)
//! - [`vnode`] - Virtual node model, builder and lifecycle hooks
//! - [`host`] - Host adapter traits and the in-memory host
//! - [`modules`] - Module registry and the attrs/class/props/style/events modules
//! - [`patch`] - The patch engine and children differ
//! - [`pipeline`] - Root bookkeeping and reactive mounting

pub mod host;
pub mod modules;
pub mod patch;
pub mod pipeline;
pub mod types;
pub mod vnode;

// Re-export commonly used items
pub use types::*;

pub use vnode::{
    AttrValue, ClassValue, Content, Event, Handler, Hooks, Listener, NodeData, NodeKind, PropValue,
    VNode, h, same_vnode,
};

pub use host::{ElementOps, Host, MemoryHost, Mutation};

pub use modules::{
    AttrsModule, ClassModule, EventsModule, Module, ModuleRegistry, PropsModule, RemoveDone,
    StyleModule, default_modules,
};

pub use patch::{KeyValidation, PatchError, PatchOptions, Patcher, Previous};

pub use pipeline::{MountHandle, Root, mount};
