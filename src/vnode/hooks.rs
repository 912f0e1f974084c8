//! Per-node lifecycle hooks.
//!
//! Hooks fire in this order over a node's life:
//!
//! ```text
//! init -> create -> insert            (first mount)
//! prepatch -> update -> postpatch     (every in-place patch)
//! destroy -> remove                   (removal)
//! ```

use std::fmt;
use std::rc::Rc;

use super::VNode;
use crate::modules::RemoveDone;
use crate::types::HookSet;

/// Runs before creation. May redirect the node (see [`VNode::redirect`]).
pub type InitHook = Rc<dyn Fn(&mut VNode)>;
/// `(empty, node)` after the host node and its children exist.
pub type CreateHook = Rc<dyn Fn(&VNode, &VNode)>;
/// Runs once the node is attached to the live tree.
pub type InsertHook = Rc<dyn Fn(&VNode)>;
/// `(old, next)` before any mutation. May rewrite `next`.
pub type PrepatchHook = Rc<dyn Fn(&VNode, &mut VNode)>;
/// `(old, next)` for update and postpatch.
pub type UpdateHook = Rc<dyn Fn(&VNode, &VNode)>;
/// Runs during the destroy pass, parents before children.
pub type DestroyHook = Rc<dyn Fn(&VNode)>;
/// Receives the removal fan-in callback. Must call it once to detach.
pub type RemoveHook = Rc<dyn Fn(&VNode, RemoveDone)>;

/// Hook table declared on a node.
#[derive(Clone, Default)]
pub struct Hooks {
    pub init: Option<InitHook>,
    pub create: Option<CreateHook>,
    pub insert: Option<InsertHook>,
    pub prepatch: Option<PrepatchHook>,
    pub update: Option<UpdateHook>,
    pub postpatch: Option<UpdateHook>,
    pub destroy: Option<DestroyHook>,
    pub remove: Option<RemoveHook>,
}

impl Hooks {
    /// Which slots are filled.
    pub fn flags(&self) -> HookSet {
        let mut set = HookSet::NONE;
        set.set(HookSet::INIT, self.init.is_some());
        set.set(HookSet::CREATE, self.create.is_some());
        set.set(HookSet::INSERT, self.insert.is_some());
        set.set(HookSet::PREPATCH, self.prepatch.is_some());
        set.set(HookSet::UPDATE, self.update.is_some());
        set.set(HookSet::POSTPATCH, self.postpatch.is_some());
        set.set(HookSet::DESTROY, self.destroy.is_some());
        set.set(HookSet::REMOVE, self.remove.is_some());
        set
    }

    pub fn is_empty(&self) -> bool {
        self.flags().is_empty()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hooks").field(&self.flags()).finish()
    }
}
