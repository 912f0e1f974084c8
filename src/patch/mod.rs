//! Patch Engine - Reconcile a new virtual tree against the previous one.
//!
//! A [`Patcher`] owns the host adapter and the module registry. Each call to
//! [`Patcher::patch`] walks both trees once and issues the smallest set of
//! host mutations it can find:
//!
//! ```text
//! patch(prev, next)
//!   ├─ same identity?  -> patch_vnode (in place)
//!   │                       ├─ hooks + module update
//!   │                       └─ content: text | children differ | bulk add/remove
//!   └─ otherwise       -> create next, insert before prev, remove prev
//! ```
//!
//! # Pattern: Handle transfer
//!
//! Host node handles move from the old virtual node to the new one as each
//! pair is patched. The returned tree is the only valid input for the next
//! patch; the old tree is consumed.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_vdom::{MemoryHost, Patcher, VNode, default_modules};
//!
//! let host = Rc::new(MemoryHost::new());
//! let anchor = host.create_root("div");
//! let patcher = Patcher::new(host.clone(), default_modules());
//!
//! let tree = patcher.patch(anchor, VNode::element("div").text_child("hi"))?;
//! let tree = patcher.patch(tree, VNode::element("div").text_child("bye"))?;
//! ```

mod children;
mod create;
mod error;
mod options;
mod remove;

pub use error::PatchError;
pub use options::{KeyValidation, PatchOptions};

use std::fmt;
use std::rc::Rc;

use tracing::{debug, debug_span, trace};

use crate::host::Host;
use crate::modules::{Module, ModuleRegistry};
use crate::types::HostId;
use crate::vnode::{Content, InsertHook, NodeKind, VNode, same_vnode};
use error::describe;

/// Insert hooks collected during one top-level patch, in creation order.
///
/// Each entry holds a full clone of the created node, subtree included, so
/// the hook sees its children and their handles. Nested insert hooks clone
/// overlapping subtrees; keep them on leaves or small roots of large lists.
pub(crate) type InsertQueue = Vec<(InsertHook, VNode)>;

/// The previous state handed to [`Patcher::patch`].
#[derive(Debug)]
pub enum Previous {
    /// A bare host node, adopted as an empty element of its own tag.
    Anchor(HostId),
    /// The tree returned by the previous patch.
    Tree(VNode),
}

impl From<HostId> for Previous {
    fn from(anchor: HostId) -> Self {
        Previous::Anchor(anchor)
    }
}

impl From<VNode> for Previous {
    fn from(tree: VNode) -> Self {
        Previous::Tree(tree)
    }
}

// =============================================================================
// Patcher
// =============================================================================

/// Reconciliation engine bound to one host and one module registry.
pub struct Patcher<H: Host + 'static> {
    host: Rc<H>,
    modules: ModuleRegistry<H>,
    options: PatchOptions,
}

impl<H: Host + 'static> Patcher<H> {
    pub fn new(host: Rc<H>, modules: Vec<Box<dyn Module<H>>>) -> Self {
        Self::with_options(host, modules, PatchOptions::default())
    }

    pub fn with_options(host: Rc<H>, modules: Vec<Box<dyn Module<H>>>, options: PatchOptions) -> Self {
        Self {
            host,
            modules: ModuleRegistry::new(modules),
            options,
        }
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    pub fn modules(&self) -> &ModuleRegistry<H> {
        &self.modules
    }

    pub fn options(&self) -> PatchOptions {
        self.options
    }

    /// Reconcile `next` against `prev` and return the now-live tree.
    ///
    /// Module `pre` hooks run first. Insert hooks run after every mutation of
    /// this call, in creation order, then module `post` hooks.
    ///
    /// When `prev` and `next` differ in identity the new tree is inserted
    /// before the old one and the old one goes through removal. If the old
    /// root has no parent, the new tree is created detached and its insert
    /// hooks are dropped.
    ///
    /// Unless key validation is off, `next` is checked for duplicate sibling
    /// keys before anything else runs, so a rejected tree leaves the host
    /// untouched.
    pub fn patch(&self, prev: impl Into<Previous>, next: VNode) -> Result<VNode, PatchError> {
        self.validate_keys(&next)?;
        self.patch_validated(prev.into(), next)
    }

    /// [`Patcher::patch`] for a tree whose keys were already validated.
    pub(crate) fn patch_validated(&self, prev: Previous, mut next: VNode) -> Result<VNode, PatchError> {
        let span = debug_span!("patch", sel = %describe(&next));
        let _guard = span.enter();

        let host = &*self.host;
        let mut queue = InsertQueue::new();
        self.modules.pre(host);

        let mut old = match prev {
            Previous::Anchor(anchor) => VNode::at(host.tag_name(anchor).to_lowercase(), anchor),
            Previous::Tree(tree) => tree,
        };

        if same_vnode(&old, &next) {
            self.patch_vnode(&mut old, &mut next, &mut queue)?;
        } else {
            self.replace(&old, &mut next, &mut queue)?;
        }

        for (hook, node) in &queue {
            hook(node);
        }

        self.modules.post(host);
        Ok(next)
    }

    /// Detach a mounted tree through the removal path.
    ///
    /// Destroy hooks run for the whole subtree. The host node is detached
    /// once every remove hook has signalled.
    pub fn remove(&self, tree: &VNode) {
        self.remove_vnode(tree);
    }

    /// Create `next`, put it where `old` is and remove `old`.
    ///
    /// Without a parent the new subtree stays detached and the insert hooks
    /// it queued are dropped.
    fn replace(&self, old: &VNode, next: &mut VNode, queue: &mut InsertQueue) -> Result<(), PatchError> {
        let elm = realized(old)?;
        let parent = self.host.parent_node(elm);
        debug!(old = %describe(old), new = %describe(next), "identity changed, replacing subtree");

        let mark = queue.len();
        let created = self.create_elm(next, queue)?;
        match parent {
            Some(parent) => {
                self.host.insert_before(parent, created, Some(elm));
                self.remove_vnode(old);
            }
            None if queue.len() > mark => {
                debug!(dropped = queue.len() - mark, "created detached, insert hooks skipped");
                queue.truncate(mark);
            }
            None => {}
        }
        Ok(())
    }

    // =========================================================================
    // patch_vnode
    // =========================================================================

    /// Patch a same-identity pair in place.
    fn patch_vnode(&self, old: &mut VNode, next: &mut VNode, queue: &mut InsertQueue) -> Result<(), PatchError> {
        if let Some(prepatch) = next.hooks().and_then(|h| h.prepatch.clone()) {
            prepatch(old, next);
        }

        // An old component is compared through its target.
        match &mut old.kind {
            NodeKind::Component(component) => self.patch_resolved(&mut component.target, next, queue),
            _ => self.patch_resolved(old, next, queue),
        }
    }

    fn patch_resolved(&self, old: &mut VNode, next: &mut VNode, queue: &mut InsertQueue) -> Result<(), PatchError> {
        if let NodeKind::Component(component) = &mut next.kind {
            self.patch_vnode(old, &mut component.target, queue)?;
            next.realized = component.target.realized;
            return Ok(());
        }

        if !same_vnode(old, next) {
            self.replace(old, next, queue)?;
            return Ok(());
        }

        let elm = realized(old)?;
        old.realized = None;
        next.realized = Some(elm);

        let hooks = next.hooks().cloned();
        if hooks.is_some() {
            self.modules.update(&self.host, old, next);
            if let Some(update) = hooks.as_ref().and_then(|h| h.update.as_ref()) {
                update(old, next);
            }
        }

        self.patch_content(elm, old, next, queue)?;

        if let Some(postpatch) = hooks.as_ref().and_then(|h| h.postpatch.as_ref()) {
            postpatch(old, next);
        }
        Ok(())
    }

    /// Reconcile text or children of a patched pair.
    fn patch_content(&self, elm: HostId, old: &mut VNode, next: &mut VNode, queue: &mut InsertQueue) -> Result<(), PatchError> {
        let host = &*self.host;
        match (&mut old.kind, &mut next.kind) {
            (NodeKind::Text(prev), NodeKind::Text(text)) => {
                if prev != text {
                    host.set_text_content(elm, text);
                }
            }
            (NodeKind::Element(prev), NodeKind::Element(el)) => match (&mut prev.content, &mut el.content) {
                (Content::Text(prev_text), Content::Text(text)) => {
                    if prev_text != text {
                        host.set_text_content(elm, text);
                    }
                }
                (_, Content::Text(text)) => {
                    trace!(node = %elm, "text replaces children");
                    host.set_text_content(elm, text);
                }
                (Content::Children(old_ch), Content::Children(new_ch)) => {
                    self.update_children(elm, old_ch, new_ch, queue)?;
                }
                (prev_content, Content::Children(new_ch)) => {
                    if matches!(prev_content, Content::Text(_)) {
                        host.set_text_content(elm, "");
                    }
                    self.add_vnodes(elm, None, new_ch, queue)?;
                }
                (Content::Children(old_ch), Content::Empty) => {
                    self.remove_vnodes(old_ch.iter());
                }
                (Content::Text(_), Content::Empty) => host.set_text_content(elm, ""),
                (Content::Empty, Content::Empty) => {}
            },
            _ => {}
        }
        Ok(())
    }
}

impl<H: Host + 'static> fmt::Debug for Patcher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patcher")
            .field("modules", &self.modules)
            .field("options", &self.options)
            .finish()
    }
}

/// Host node of an old virtual node.
fn realized(node: &VNode) -> Result<HostId, PatchError> {
    node.realized().ok_or_else(|| PatchError::NotRealized {
        sel: describe(node),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, Mutation};
    use crate::modules::default_modules;
    use std::cell::RefCell;

    fn setup() -> (Rc<MemoryHost>, HostId, Patcher<MemoryHost>) {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("div");
        let patcher = Patcher::new(host.clone(), default_modules());
        (host, anchor, patcher)
    }

    #[test]
    fn test_anchor_adopted_in_place() {
        let (host, anchor, patcher) = setup();

        let tree = patcher
            .patch(anchor, VNode::element("div").attr("id", "app").text_child("hi"))
            .unwrap();

        assert_eq!(tree.realized(), Some(anchor));
        assert_eq!(host.attribute(anchor, "id").as_deref(), Some("app"));
        assert_eq!(host.text_content(anchor), "hi");
    }

    #[test]
    fn test_patch_identical_tree_is_silent() {
        let (host, anchor, patcher) = setup();
        let view = || {
            VNode::element("div").children([
                VNode::element("span").class("x").text_child("a"),
                VNode::text("b"),
            ])
        };
        let tree = patcher.patch(anchor, view()).unwrap();
        host.clear_mutations();

        patcher.patch(tree, view()).unwrap();
        assert!(host.mutations().is_empty(), "{:?}", host.mutations());
    }

    #[test]
    fn test_unmounted_old_tree_rejected() {
        let (_host, _anchor, patcher) = setup();
        let err = patcher
            .patch(VNode::element("div"), VNode::element("div"))
            .unwrap_err();
        assert_eq!(err, PatchError::NotRealized { sel: "div".to_string() });
    }

    #[test]
    fn test_text_node_updated_in_place() {
        let (host, anchor, patcher) = setup();
        let tree = patcher.patch(anchor, VNode::element("div").child(VNode::text("one"))).unwrap();
        let text = tree.child_nodes().unwrap()[0].realized().unwrap();
        host.clear_mutations();

        let tree = patcher.patch(tree, VNode::element("div").child(VNode::text("two"))).unwrap();

        assert_eq!(tree.child_nodes().unwrap()[0].realized(), Some(text));
        assert_eq!(
            host.take_mutations(),
            vec![Mutation::SetText { node: text, text: "two".to_string() }]
        );
    }

    #[test]
    fn test_text_short_circuits_children() {
        let (host, anchor, patcher) = setup();
        let destroyed = Rc::new(RefCell::new(0));
        let destroyed_clone = destroyed.clone();
        let tree = patcher
            .patch(
                anchor,
                VNode::element("div").children([
                    VNode::element("p").hook_destroy(move |_| *destroyed_clone.borrow_mut() += 1),
                    VNode::element("p"),
                ]),
            )
            .unwrap();
        host.clear_mutations();

        patcher.patch(tree, VNode::element("div").text_child("plain")).unwrap();

        assert_eq!(host.text_content(anchor), "plain");
        assert_eq!(host.children(anchor).len(), 1);
        assert!(host.mutations().iter().all(|m| !matches!(m, Mutation::Remove { .. })));
        assert_eq!(*destroyed.borrow(), 0, "children differ skipped");
    }

    #[test]
    fn test_children_cleared_and_text_cleared() {
        let (host, anchor, patcher) = setup();
        let tree = patcher
            .patch(anchor, VNode::element("div").children([VNode::element("a"), VNode::element("b")]))
            .unwrap();
        let tree = patcher.patch(tree, VNode::element("div")).unwrap();
        assert!(host.children(anchor).is_empty());

        let tree = patcher.patch(tree, VNode::element("div").text_child("t")).unwrap();
        patcher.patch(tree, VNode::element("div")).unwrap();
        assert_eq!(host.text_content(anchor), "");
    }

    #[test]
    fn test_text_then_children() {
        let (host, anchor, patcher) = setup();
        let tree = patcher.patch(anchor, VNode::element("div").text_child("t")).unwrap();
        patcher
            .patch(tree, VNode::element("div").children([VNode::element("i"), VNode::element("b")]))
            .unwrap();

        assert_eq!(host.outer_html(anchor), "<div><i></i><b></b></div>");
    }

    #[test]
    fn test_identity_change_replaces() {
        let (host, anchor, patcher) = setup();
        let tree = patcher
            .patch(anchor, VNode::element("div").child(VNode::element("p").key(1)))
            .unwrap();
        let before = host.children(anchor)[0];

        let tree = patcher
            .patch(tree, VNode::element("div").child(VNode::element("p").key(2)))
            .unwrap();

        let after = tree.child_nodes().unwrap()[0].realized().unwrap();
        assert_ne!(before, after);
        assert_eq!(host.children(anchor), vec![after]);
    }

    #[test]
    fn test_root_replacement_detached_anchor() {
        let (host, anchor, patcher) = setup();
        let inserted = Rc::new(RefCell::new(0));
        let inserted_clone = inserted.clone();

        let tree = patcher
            .patch(anchor, VNode::element("section").hook_insert(move |_| *inserted_clone.borrow_mut() += 1))
            .unwrap();

        let elm = tree.realized().unwrap();
        assert_ne!(elm, anchor);
        assert_eq!(host.parent_node(elm), None);
        assert_eq!(*inserted.borrow(), 0);
    }

    #[test]
    fn test_component_target_swap_at_detached_root() {
        let (host, anchor, patcher) = setup();
        let attached = Rc::new(RefCell::new(Vec::new()));

        let tree = patcher
            .patch(anchor, VNode::component("app", VNode::element("div")))
            .unwrap();

        let attached_clone = attached.clone();
        let host_clone = host.clone();
        let span = VNode::element("span").hook_insert(move |node| {
            let parent = host_clone.parent_node(node.realized().unwrap());
            attached_clone.borrow_mut().push(parent.is_some());
        });
        let tree = patcher.patch(tree, VNode::component("app", span)).unwrap();

        let elm = tree.realized().unwrap();
        assert_eq!(host.tag_name(elm), "SPAN");
        assert_eq!(host.parent_node(elm), None);
        assert!(attached.borrow().is_empty(), "{:?}", attached.borrow());
    }

    #[test]
    fn test_rejected_keys_leave_host_untouched() {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("div");
        let patcher = Patcher::with_options(
            host.clone(),
            default_modules(),
            PatchOptions::new().with_key_validation(KeyValidation::Reject),
        );
        let list = |keys: &[&str]| VNode::element("ul").children(keys.iter().map(|k| VNode::element("li").key(*k)));
        let tree = patcher
            .patch(anchor, VNode::element("div").attr("id", "a").children([list(&["a", "b"])]))
            .unwrap();
        host.clear_mutations();

        let next = VNode::element("div")
            .attr("id", "b")
            .children([VNode::element("p"), list(&["a", "a"])]);
        let err = patcher.patch(tree, next).unwrap_err();

        assert!(matches!(err, PatchError::DuplicateKey { .. }));
        assert!(host.mutations().is_empty(), "{:?}", host.mutations());
        assert_eq!(host.attribute(anchor, "id").as_deref(), Some("a"));
    }

    #[test]
    fn test_root_replacement_under_parent() {
        let host = Rc::new(MemoryHost::new());
        let body = host.create_root("body");
        let anchor = host.create_element("div");
        host.append_child(body, anchor);
        let patcher = Patcher::new(host.clone(), default_modules());

        let tree = patcher.patch(anchor, VNode::element("main").text_child("x")).unwrap();

        assert_eq!(host.children(body), vec![tree.realized().unwrap()]);
        assert_eq!(host.parent_node(anchor), None);
    }

    #[test]
    fn test_hook_order_on_patch() {
        let (_host, anchor, patcher) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        let view = |log: &Rc<RefCell<Vec<&'static str>>>| {
            let (a, b, c) = (log.clone(), log.clone(), log.clone());
            VNode::element("div")
                .hook_prepatch(move |_, _| a.borrow_mut().push("prepatch"))
                .hook_update(move |_, _| b.borrow_mut().push("update"))
                .hook_postpatch(move |_, _| c.borrow_mut().push("postpatch"))
        };
        // Adopting the anchor is already an in-place patch.
        let tree = patcher.patch(anchor, view(&log)).unwrap();
        log.borrow_mut().clear();

        patcher.patch(tree, view(&log)).unwrap();
        assert_eq!(*log.borrow(), vec!["prepatch", "update", "postpatch"]);
    }

    #[test]
    fn test_prepatch_may_rewrite_next() {
        let (host, anchor, patcher) = setup();
        let tree = patcher.patch(anchor, VNode::element("div").text_child("a")).unwrap();

        let next = VNode::element("div").text_child("b").hook_prepatch(|_, next| {
            if let NodeKind::Element(el) = &mut next.kind {
                el.content = Content::Text("rewritten".to_string());
            }
        });
        patcher.patch(tree, next).unwrap();

        assert_eq!(host.text_content(anchor), "rewritten");
    }
}
