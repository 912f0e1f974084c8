//! Render Pipeline
//!
//! Connects render functions to the patch engine.
//!
//! ```text
//! render() -> VNode -> Root::update -> Patcher::patch -> host mutations
//!    ↑                                                        │
//!    └──────────── signal write re-runs the effect ───────────┘
//! ```
//!
//! - [`Root`] keeps the previous tree so each render patches against it.
//! - [`mount`] wraps a render function in a reactive effect.

pub mod mount;
pub mod root;

// Re-exports
pub use mount::{MountHandle, mount};
pub use root::Root;
