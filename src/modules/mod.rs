//! Module Registry - Pluggable per-aspect lifecycle hooks.
//!
//! A module owns one aspect of a host element (attributes, class, style,
//! ...) and gets called at fixed points of every patch:
//!
//! ```text
//! pre                      once, before anything else
//! create(empty, node)      after a host element and its children exist
//! update(old, node)        on every in-place patch of an element
//! destroy(node)            during the destroy pass of a removed subtree
//! remove(node, done)       before detaching; detach waits for `done`
//! post                     once, after insert hooks
//! ```
//!
//! Modules run in registration order. The registry is handed to the
//! [`Patcher`](crate::patch::Patcher) at construction and never changes
//! afterwards.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_vdom::{MemoryHost, Patcher, default_modules};
//!
//! let host = Rc::new(MemoryHost::new());
//! let patcher = Patcher::new(host.clone(), default_modules());
//! ```

mod attrs;
mod class;
mod events;
mod props;
mod style;

pub use attrs::{AttrsModule, is_boolean_attr};
pub use class::ClassModule;
pub use events::EventsModule;
pub use props::PropsModule;
pub use style::StyleModule;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::host::ElementOps;
use crate::types::HookSet;
use crate::vnode::VNode;

// =============================================================================
// Module trait
// =============================================================================

/// One aspect's hooks.
///
/// Only the hooks named by [`Module::hooks`] are ever called. The others may
/// keep their default no-op bodies.
pub trait Module<H: ?Sized> {
    /// Name for diagnostics.
    fn name(&self) -> &'static str;

    /// Hooks this module supplies. Bits outside [`HookSet::MODULE`] are ignored.
    fn hooks(&self) -> HookSet;

    fn pre(&self, _host: &H) {}

    fn create(&self, _host: &H, _empty: &VNode, _node: &mut VNode) {}

    fn update(&self, _host: &H, _old: &VNode, _node: &mut VNode) {}

    fn destroy(&self, _host: &H, _node: &VNode) {}

    /// Call `done` exactly once when the node may be detached.
    fn remove(&self, _host: &H, _node: &VNode, done: RemoveDone) {
        done.call();
    }

    fn post(&self, _host: &H) {}
}

/// The built-in aspect modules in their default order.
pub fn default_modules<H: ElementOps + 'static>() -> Vec<Box<dyn Module<H>>> {
    vec![
        Box::new(AttrsModule),
        Box::new(ClassModule),
        Box::new(PropsModule),
        Box::new(StyleModule),
        Box::new(EventsModule),
    ]
}

// =============================================================================
// Registry
// =============================================================================

/// Ordered modules plus, per hook, the indices of the modules supplying it.
pub struct ModuleRegistry<H: ?Sized> {
    modules: Vec<Box<dyn Module<H>>>,
    pre: Vec<usize>,
    create: Vec<usize>,
    update: Vec<usize>,
    destroy: Vec<usize>,
    remove: Vec<usize>,
    post: Vec<usize>,
}

impl<H: ?Sized> ModuleRegistry<H> {
    pub fn new(modules: Vec<Box<dyn Module<H>>>) -> Self {
        let supplying = |hook: HookSet| -> Vec<usize> {
            modules
                .iter()
                .enumerate()
                .filter(|(_, m)| m.hooks().contains(hook))
                .map(|(i, _)| i)
                .collect()
        };
        let pre = supplying(HookSet::PRE);
        let create = supplying(HookSet::CREATE);
        let update = supplying(HookSet::UPDATE);
        let destroy = supplying(HookSet::DESTROY);
        let remove = supplying(HookSet::REMOVE);
        let post = supplying(HookSet::POST);

        Self {
            modules,
            pre,
            create,
            update,
            destroy,
            remove,
            post,
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Number of modules supplying a remove hook.
    pub fn remove_count(&self) -> usize {
        self.remove.len()
    }

    pub fn pre(&self, host: &H) {
        for &i in &self.pre {
            self.modules[i].pre(host);
        }
    }

    pub fn create(&self, host: &H, empty: &VNode, node: &mut VNode) {
        for &i in &self.create {
            self.modules[i].create(host, empty, node);
        }
    }

    pub fn update(&self, host: &H, old: &VNode, node: &mut VNode) {
        for &i in &self.update {
            self.modules[i].update(host, old, node);
        }
    }

    pub fn destroy(&self, host: &H, node: &VNode) {
        for &i in &self.destroy {
            self.modules[i].destroy(host, node);
        }
    }

    pub fn remove(&self, host: &H, node: &VNode, done: &RemoveDone) {
        for &i in &self.remove {
            self.modules[i].remove(host, node, done.clone());
        }
    }

    pub fn post(&self, host: &H) {
        for &i in &self.post {
            self.modules[i].post(host);
        }
    }
}

impl<H: ?Sized> fmt::Debug for ModuleRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .finish()
    }
}

// =============================================================================
// Removal fan-in
// =============================================================================

struct RemoveState {
    remaining: Cell<usize>,
    detach: RefCell<Option<Box<dyn FnOnce()>>>,
}

/// Shared completion callback gating the physical detach of a removed node.
///
/// Created with one listener per remove hook plus one. Every [`call`] counts
/// one listener down; the detach action runs once, when the count hits zero.
/// A hook that never calls leaves the host node attached for good.
///
/// [`call`]: RemoveDone::call
#[derive(Clone)]
pub struct RemoveDone(Rc<RemoveState>);

impl RemoveDone {
    pub fn new(listeners: usize, detach: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RemoveState {
            remaining: Cell::new(listeners),
            detach: RefCell::new(Some(Box::new(detach))),
        }))
    }

    /// Signal one completion.
    pub fn call(&self) {
        let left = self.0.remaining.get().saturating_sub(1);
        self.0.remaining.set(left);
        if left == 0 {
            let detach = self.0.detach.borrow_mut().take();
            if let Some(detach) = detach {
                detach();
            }
        }
    }

    /// Completions still outstanding.
    pub fn remaining(&self) -> usize {
        self.0.remaining.get()
    }

    /// Whether the detach action has run.
    pub fn is_done(&self) -> bool {
        self.0.detach.borrow().is_none()
    }
}

impl fmt::Debug for RemoveDone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveDone")
            .field("remaining", &self.remaining())
            .field("done", &self.is_done())
            .finish()
    }
}
