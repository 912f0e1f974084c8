//! Host Adapter - The only way the engine touches the real tree.
//!
//! The patch engine is written against [`Host`] alone. Aspect modules need a
//! little more (attributes, classes, listeners) and ask for [`ElementOps`].
//!
//! # Contract
//!
//! - Every method is synchronous and takes effect immediately.
//! - Every method is infallible at this layer. A host that cannot complete an
//!   operation panics; the engine does not retry or translate the failure.
//! - Methods take `&self`. Removal may complete later from inside a module's
//!   remove callback, so the host is shared (`Rc<H>`) and uses interior
//!   mutability.
//!
//! [`MemoryHost`] is the default implementation: an in-memory arena that
//! also records every mutation for inspection.

mod memory;

pub use memory::*;

use crate::types::HostId;
use crate::vnode::{Handler, PropValue};

/// Structural capabilities consumed by the patch engine.
pub trait Host {
    /// Create a detached element.
    fn create_element(&self, tag: &str) -> HostId;

    /// Create a detached element in a namespace.
    fn create_element_ns(&self, ns: &str, tag: &str) -> HostId;

    /// Create a detached text node.
    fn create_text_node(&self, text: &str) -> HostId;

    /// Append `child` as the last child of `parent`, moving it if attached.
    fn append_child(&self, parent: HostId, child: HostId);

    /// Insert `node` before `reference` under `parent`, moving it if
    /// attached. `None` appends.
    fn insert_before(&self, parent: HostId, node: HostId, reference: Option<HostId>);

    /// Detach `child` from `parent`.
    fn remove_child(&self, parent: HostId, child: HostId);

    fn parent_node(&self, node: HostId) -> Option<HostId>;

    fn next_sibling(&self, node: HostId) -> Option<HostId>;

    /// Replace all content of `node` with `text`.
    fn set_text_content(&self, node: HostId, text: &str);

    fn tag_name(&self, node: HostId) -> String;
}

/// Per-aspect capabilities consumed by the built-in modules.
pub trait ElementOps: Host {
    fn set_attribute(&self, node: HostId, name: &str, value: &str);

    fn remove_attribute(&self, node: HostId, name: &str);

    fn set_property(&self, node: HostId, name: &str, value: &PropValue);

    /// Live property value.
    fn property(&self, node: HostId, name: &str) -> Option<PropValue>;

    fn remove_property(&self, node: HostId, name: &str);

    /// Replace the whole class attribute.
    fn set_class(&self, node: HostId, class: &str);

    fn set_style(&self, node: HostId, name: &str, value: &str);

    fn remove_style(&self, node: HostId, name: &str);

    /// Register `handler` for `event`. The host keeps the handle and calls
    /// whatever listener it holds at dispatch time.
    fn add_listener(&self, node: HostId, event: &str, capture: bool, handler: Handler);

    fn remove_listener(&self, node: HostId, event: &str, capture: bool);
}
