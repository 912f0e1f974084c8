//! Removal: destroy pass, then gated detach.
//!
//! ```text
//! remove(node)
//!   ├─ text      -> detach now
//!   └─ element   -> destroy hooks over the whole subtree
//!                -> done = RemoveDone(module remove hooks + 1)
//!                -> every module remove hook gets done
//!                -> node remove hook gets done, or done is called directly
//!                -> detach when the count reaches zero
//! ```

use std::rc::Rc;

use tracing::trace;

use super::Patcher;
use crate::host::Host;
use crate::modules::RemoveDone;
use crate::vnode::{Content, NodeKind, VNode};

impl<H: Host + 'static> Patcher<H> {
    pub(crate) fn remove_vnodes<'a>(&self, nodes: impl IntoIterator<Item = &'a VNode>) {
        for node in nodes {
            self.remove_vnode(node);
        }
    }

    pub(crate) fn remove_vnode(&self, node: &VNode) {
        let Some(elm) = node.realized() else { return };

        if node.sel().is_none() {
            if let Some(parent) = self.host.parent_node(elm) {
                trace!(node = %elm, "removing text");
                self.host.remove_child(parent, elm);
            }
            return;
        }

        self.invoke_destroy_hook(node);

        let host = Rc::clone(&self.host);
        let done = RemoveDone::new(self.modules.remove_count() + 1, move || {
            if let Some(parent) = host.parent_node(elm) {
                trace!(node = %elm, "detaching removed element");
                host.remove_child(parent, elm);
            }
        });

        self.modules.remove(&self.host, node, &done);
        match node.hooks().and_then(|h| h.remove.clone()) {
            Some(remove) => remove(node, done),
            None => done.call(),
        }
    }

    /// Destroy hooks for `node` then, depth first, its descendants.
    fn invoke_destroy_hook(&self, node: &VNode) {
        let Some(data) = node.data() else { return };

        if let Some(destroy) = &data.hook.destroy {
            destroy(node);
        }
        self.modules.destroy(&self.host, node);

        match &node.kind {
            NodeKind::Element(el) => {
                if let Content::Children(children) = &el.content {
                    for child in children {
                        self.invoke_destroy_hook(child);
                    }
                }
            }
            NodeKind::Component(component) => self.invoke_destroy_hook(&component.target),
            NodeKind::Text(_) | NodeKind::Empty => {}
        }
    }
}
