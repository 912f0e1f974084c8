//! Host node creation.

use tracing::trace;

use super::{InsertQueue, PatchError, Patcher};
use crate::host::Host;
use crate::types::HostId;
use crate::vnode::{Content, NodeKind, VNode};

impl<H: Host + 'static> Patcher<H> {
    /// Build the host subtree for `node` and record its handle.
    ///
    /// Runs the `init` hook first, which may redirect the node. Children are
    /// created and appended in order before module `create` hooks see the
    /// element. The node's `insert` hook is queued, not run, together with a
    /// deep clone of the node.
    pub(crate) fn create_elm(&self, node: &mut VNode, queue: &mut InsertQueue) -> Result<HostId, PatchError> {
        if let Some(init) = node.hooks().and_then(|h| h.init.clone()) {
            init(node);
        }

        let host = &*self.host;
        let elm = match &mut node.kind {
            NodeKind::Component(component) => {
                let elm = self.create_elm(&mut component.target, queue)?;
                node.realized = Some(elm);
                return Ok(elm);
            }
            NodeKind::Text(text) => {
                let elm = host.create_text_node(text);
                node.realized = Some(elm);
                return Ok(elm);
            }
            NodeKind::Empty => {
                let elm = host.create_text_node("");
                node.realized = Some(elm);
                return Ok(elm);
            }
            NodeKind::Element(el) => {
                let elm = match &el.data.ns {
                    Some(ns) => host.create_element_ns(ns, &el.sel),
                    None => host.create_element(&el.sel),
                };
                match &mut el.content {
                    Content::Children(children) => {
                        for child in children.iter_mut() {
                            let child_elm = self.create_elm(child, queue)?;
                            host.append_child(elm, child_elm);
                        }
                    }
                    Content::Text(text) => {
                        let text = host.create_text_node(text);
                        host.append_child(elm, text);
                    }
                    Content::Empty => {}
                }
                trace!(node = %elm, sel = %el.sel, "created element");
                elm
            }
        };
        node.realized = Some(elm);

        self.modules.create(host, &VNode::empty(), node);
        if let Some(hooks) = node.hooks().cloned() {
            if let Some(create) = &hooks.create {
                create(&VNode::empty(), node);
            }
            if let Some(insert) = hooks.insert {
                queue.push((insert, node.clone()));
            }
        }
        Ok(elm)
    }

    /// Create each node and insert it before `before` (append when `None`).
    pub(crate) fn add_vnodes(
        &self,
        parent: HostId,
        before: Option<HostId>,
        nodes: &mut [VNode],
        queue: &mut InsertQueue,
    ) -> Result<(), PatchError> {
        for node in nodes {
            let elm = self.create_elm(node, queue)?;
            self.host.insert_before(parent, elm, before);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::host::{Host, MemoryHost, Mutation};
    use crate::modules::default_modules;
    use crate::patch::Patcher;
    use crate::types::HostId;
    use crate::vnode::VNode;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_children_attached_before_insert_hooks() {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("div");
        let patcher = Patcher::new(host.clone(), default_modules());
        let log = Rc::new(RefCell::new(Vec::new()));

        let (outer, inner) = (log.clone(), log.clone());
        let host_outer = host.clone();
        let tree = VNode::element("div").child(
            VNode::element("ul")
                .hook_insert(move |node| {
                    let elm = node.realized().unwrap();
                    assert!(host_outer.parent_node(elm).is_some(), "attached");
                    outer.borrow_mut().push("ul");
                })
                .child(VNode::element("li").hook_insert(move |_| inner.borrow_mut().push("li"))),
        );
        patcher.patch(anchor, tree).unwrap();

        // Creation order: children finish first.
        assert_eq!(*log.borrow(), vec!["li", "ul"]);
    }

    #[test]
    fn test_insert_hook_snapshot_carries_subtree() {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("div");
        let patcher = Patcher::new(host.clone(), default_modules());
        let seen: Rc<RefCell<Vec<Option<HostId>>>> = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let tree = VNode::element("div").child(
            VNode::element("ul")
                .hook_insert(move |node| {
                    let handles = node.child_nodes().unwrap().iter().map(|c| c.realized()).collect();
                    *seen_clone.borrow_mut() = handles;
                })
                .children([VNode::element("li"), VNode::element("li")]),
        );
        let tree = patcher.patch(anchor, tree).unwrap();

        let ul = &tree.child_nodes().unwrap()[0];
        let live: Vec<_> = ul.child_nodes().unwrap().iter().map(|c| c.realized()).collect();
        assert_eq!(*seen.borrow(), live);
        assert!(live.iter().all(Option::is_some));
    }

    #[test]
    fn test_create_hook_sees_children() {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("div");
        let patcher = Patcher::new(host.clone(), default_modules());
        let seen = Rc::new(RefCell::new(0));

        let (seen_clone, host_clone) = (seen.clone(), host.clone());
        let tree = VNode::element("div").child(
            VNode::element("ul")
                .hook_create(move |empty, node| {
                    assert!(empty.sel().is_none());
                    *seen_clone.borrow_mut() = host_clone.children(node.realized().unwrap()).len();
                })
                .children([VNode::element("li"), VNode::element("li")]),
        );
        patcher.patch(anchor, tree).unwrap();

        assert_eq!(*seen.borrow(), 2);
    }

    #[test]
    fn test_namespaced_element() {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("div");
        let patcher = Patcher::new(host.clone(), default_modules());

        let svg = "http://www.w3.org/2000/svg";
        let tree = patcher
            .patch(anchor, VNode::element("div").child(VNode::element("svg").ns(svg)))
            .unwrap();

        let elm = tree.child_nodes().unwrap()[0].realized().unwrap();
        assert_eq!(host.namespace(elm).as_deref(), Some(svg));
    }

    #[test]
    fn test_init_hook_redirects_to_target() {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("div");
        let patcher = Patcher::new(host.clone(), default_modules());

        let widget = VNode::element("my-widget")
            .hook_init(|node| node.redirect(VNode::element("section").text_child("rendered")));
        let tree = patcher.patch(anchor, VNode::element("div").child(widget)).unwrap();

        let child = &tree.child_nodes().unwrap()[0];
        assert!(child.is_component());
        assert_eq!(child.realized(), child.target().unwrap().realized());
        assert_eq!(host.outer_html(anchor), "<div><section>rendered</section></div>");
        assert!(
            host.mutations()
                .iter()
                .all(|m| !matches!(m, Mutation::CreateElement { tag, .. } if tag == "my-widget"))
        );
    }
}
