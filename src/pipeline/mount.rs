//! Mount API - Re-render a root whenever the signals it reads change.
//!
//! One effect wraps the render function. Signals read while rendering become
//! its dependencies; writing any of them re-runs the render and patches the
//! result into the live tree.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_signals::signal;
//! use spark_vdom::{MemoryHost, Patcher, Root, VNode, default_modules, mount};
//!
//! let host = Rc::new(MemoryHost::new());
//! let anchor = host.create_root("div");
//! let root = Root::new(Patcher::new(host.clone(), default_modules()), anchor);
//!
//! let count = signal(0);
//! let count_view = count.clone();
//! let handle = mount(root, move || {
//!     VNode::element("div").text_child(format!("count: {}", count_view.get()))
//! });
//!
//! count.set(1); // patches the text node in place
//! handle.unmount();
//! ```
//!
//! Hooks run inside the effect. A hook that writes a signal the render reads
//! re-enters the root and panics.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::effect;
use tracing::error;

use super::Root;
use crate::host::Host;
use crate::patch::PatchError;
use crate::vnode::VNode;

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`].
///
/// Dropping it stops re-rendering but leaves the host tree in place.
pub struct MountHandle<H: Host + 'static> {
    stop_effect: Option<Box<dyn FnOnce()>>,
    root: Rc<RefCell<Root<H>>>,
}

impl<H: Host + 'static> MountHandle<H> {
    /// Stop the render effect, then tear the tree down.
    pub fn unmount(mut self) -> Result<(), PatchError> {
        self.stop();
        self.root.borrow_mut().unmount()
    }

    /// Stop re-rendering. The tree stays mounted.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_effect.is_some()
    }

    /// Shared access to the root.
    pub fn root(&self) -> Rc<RefCell<Root<H>>> {
        Rc::clone(&self.root)
    }
}

impl<H: Host + 'static> Drop for MountHandle<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Render into `root` now and again after every change to a signal `render`
/// read.
///
/// Patch errors are logged and the effect keeps running.
pub fn mount<H, F>(root: Root<H>, render: F) -> MountHandle<H>
where
    H: Host + 'static,
    F: Fn() -> VNode + 'static,
{
    let root = Rc::new(RefCell::new(root));
    let root_for_effect = Rc::clone(&root);

    let stop_fn = effect(move || {
        let next = render();
        if let Err(err) = root_for_effect.borrow_mut().update(next) {
            error!(%err, "render patch failed");
        }
    });

    MountHandle {
        stop_effect: Some(Box::new(stop_fn)),
        root,
    }
}
