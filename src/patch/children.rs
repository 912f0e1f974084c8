//! Keyed children differ.
//!
//! # Pattern: Four pointers
//!
//! Both children lists are walked from both ends at once:
//!
//! ```text
//! old:  [os ...................... oe]
//! new:  [ns ...................... ne]
//!
//! os~ns  patch in place            oe~ne  patch in place
//! os~ne  patch, move after oe      oe~ns  patch, move before os
//! else   look up ns's key among the remaining old children
//! ```
//!
//! Common edits (append, prepend, remove, reverse, swap ends) resolve
//! through the pointer comparisons alone. The key map is built lazily, at
//! most once per children list, for everything else. Old children consumed
//! through the key map are marked in a `gone` bitmap and skipped when a
//! pointer reaches them. A key hit with a different selector counts as a
//! miss: the new node is created and the old one is removed with the rest.

use std::collections::{HashMap, HashSet};

use tracing::{trace, warn};

use super::{InsertQueue, KeyValidation, PatchError, Patcher, realized};
use crate::host::Host;
use crate::types::{HostId, Key};
use crate::vnode::{Content, NodeKind, VNode, same_vnode};

impl<H: Host + 'static> Patcher<H> {
    /// Reconcile two children lists of the element `parent`.
    ///
    /// Ends are exclusive: `old_end - 1` is the last live old index.
    pub(crate) fn update_children(
        &self,
        parent: HostId,
        old_ch: &mut [VNode],
        new_ch: &mut [VNode],
        queue: &mut InsertQueue,
    ) -> Result<(), PatchError> {
        let host = &*self.host;
        let mut gone = vec![false; old_ch.len()];
        let mut key_map: Option<HashMap<Key, usize>> = None;
        let (mut old_start, mut old_end) = (0, old_ch.len());
        let (mut new_start, mut new_end) = (0, new_ch.len());

        while old_start < old_end && new_start < new_end {
            if gone[old_start] {
                old_start += 1;
            } else if gone[old_end - 1] {
                old_end -= 1;
            } else if same_vnode(&old_ch[old_start], &new_ch[new_start]) {
                self.patch_vnode(&mut old_ch[old_start], &mut new_ch[new_start], queue)?;
                old_start += 1;
                new_start += 1;
            } else if same_vnode(&old_ch[old_end - 1], &new_ch[new_end - 1]) {
                self.patch_vnode(&mut old_ch[old_end - 1], &mut new_ch[new_end - 1], queue)?;
                old_end -= 1;
                new_end -= 1;
            } else if same_vnode(&old_ch[old_start], &new_ch[new_end - 1]) {
                // Moved right.
                self.patch_vnode(&mut old_ch[old_start], &mut new_ch[new_end - 1], queue)?;
                let anchor = host.next_sibling(realized(&old_ch[old_end - 1])?);
                let elm = realized(&new_ch[new_end - 1])?;
                trace!(node = %elm, "move after old end");
                host.insert_before(parent, elm, anchor);
                old_start += 1;
                new_end -= 1;
            } else if same_vnode(&old_ch[old_end - 1], &new_ch[new_start]) {
                // Moved left.
                self.patch_vnode(&mut old_ch[old_end - 1], &mut new_ch[new_start], queue)?;
                let elm = realized(&new_ch[new_start])?;
                let anchor = realized(&old_ch[old_start])?;
                trace!(node = %elm, "move before old start");
                host.insert_before(parent, elm, Some(anchor));
                old_end -= 1;
                new_start += 1;
            } else {
                let map = key_map.get_or_insert_with(|| key_index(&old_ch[old_start..old_end], old_start));
                let found = new_ch[new_start]
                    .get_key()
                    .and_then(|key| map.get(key))
                    .copied()
                    .filter(|&i| !gone[i] && (old_start..old_end).contains(&i))
                    .filter(|&i| same_vnode(&old_ch[i], &new_ch[new_start]));
                let anchor = realized(&old_ch[old_start])?;

                match found {
                    Some(i) => {
                        self.patch_vnode(&mut old_ch[i], &mut new_ch[new_start], queue)?;
                        gone[i] = true;
                        let elm = realized(&new_ch[new_start])?;
                        trace!(node = %elm, from = i, "keyed move");
                        host.insert_before(parent, elm, Some(anchor));
                    }
                    None => {
                        let elm = self.create_elm(&mut new_ch[new_start], queue)?;
                        trace!(node = %elm, "created in place");
                        host.insert_before(parent, elm, Some(anchor));
                    }
                }
                new_start += 1;
            }
        }

        if old_start >= old_end {
            let before = new_ch.get(new_end).and_then(VNode::realized);
            self.add_vnodes(parent, before, &mut new_ch[new_start..new_end], queue)?;
        } else if new_start >= new_end {
            let live = old_ch[old_start..old_end]
                .iter()
                .zip(&gone[old_start..old_end])
                .filter(|(_, gone)| !**gone)
                .map(|(node, _)| node);
            self.remove_vnodes(live);
        }
        Ok(())
    }

    /// Apply the key policy to every children list of `tree`.
    ///
    /// Runs before a patch touches the host. Nodes produced later by `init`
    /// or `prepatch` hooks are not checked.
    pub(crate) fn validate_keys(&self, tree: &VNode) -> Result<(), PatchError> {
        if self.options.key_validation == KeyValidation::Off {
            return Ok(());
        }
        match &tree.kind {
            NodeKind::Element(el) => {
                if let Content::Children(children) = &el.content {
                    self.check_keys(&el.sel, children)?;
                    for child in children {
                        self.validate_keys(child)?;
                    }
                }
            }
            NodeKind::Component(component) => self.validate_keys(&component.target)?,
            NodeKind::Text(_) | NodeKind::Empty => {}
        }
        Ok(())
    }

    /// Apply the configured duplicate-key policy to one children list.
    fn check_keys(&self, parent_sel: &str, children: &[VNode]) -> Result<(), PatchError> {
        let policy = self.options.key_validation;
        if policy == KeyValidation::Off {
            return Ok(());
        }

        let mut seen = HashSet::new();
        for key in children.iter().filter_map(VNode::get_key) {
            if seen.insert(key) {
                continue;
            }
            match policy {
                KeyValidation::Reject => {
                    return Err(PatchError::DuplicateKey {
                        key: key.clone(),
                        parent: parent_sel.to_string(),
                    });
                }
                _ => warn!(%key, parent = parent_sel, "duplicate key among siblings"),
            }
        }
        Ok(())
    }
}

/// Key to absolute index over a window of old children.
///
/// On duplicate keys the last one wins.
fn key_index(window: &[VNode], offset: usize) -> HashMap<Key, usize> {
    window
        .iter()
        .enumerate()
        .filter_map(|(i, node)| node.get_key().map(|key| (key.clone(), offset + i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, Mutation};
    use crate::modules::default_modules;
    use crate::patch::PatchOptions;
    use std::rc::Rc;

    fn list(keys: &[&str]) -> VNode {
        VNode::element("ul").children(keys.iter().map(|k| VNode::element("li").key(*k).text_child(*k)))
    }

    fn mounted(keys: &[&str]) -> (Rc<MemoryHost>, HostId, Patcher<MemoryHost>, VNode) {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("ul");
        let patcher = Patcher::new(host.clone(), default_modules());
        let tree = patcher.patch(anchor, list(keys)).unwrap();
        host.clear_mutations();
        (host, anchor, patcher, tree)
    }

    fn rendered(host: &MemoryHost, anchor: HostId) -> Vec<String> {
        host.children(anchor).into_iter().map(|c| host.text_content(c)).collect()
    }

    #[test]
    fn test_key_index_offsets() {
        let nodes = [VNode::element("li").key("a"), VNode::element("li"), VNode::element("li").key("c")];
        let map = key_index(&nodes, 3);
        assert_eq!(map.get(&Key::from("a")), Some(&3));
        assert_eq!(map.get(&Key::from("c")), Some(&5));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_reverse_moves_only() {
        let (host, anchor, patcher, tree) = mounted(&["a", "b", "c", "d"]);
        let before = host.children(anchor);

        patcher.patch(tree, list(&["d", "c", "b", "a"])).unwrap();

        let after = host.children(anchor);
        assert_eq!(rendered(&host, anchor), ["d", "c", "b", "a"]);
        assert_eq!(after, before.into_iter().rev().collect::<Vec<_>>());
        assert!(host.mutations().iter().all(Mutation::is_insert));
    }

    #[test]
    fn test_unknown_keys_created_mid_list() {
        let (host, anchor, patcher, tree) = mounted(&["a", "b"]);

        patcher.patch(tree, list(&["x", "b", "y"])).unwrap();

        assert_eq!(rendered(&host, anchor), ["x", "b", "y"]);
        let removed = host
            .mutations()
            .iter()
            .filter(|m| matches!(m, Mutation::Remove { .. }))
            .count();
        assert_eq!(removed, 1);
    }

    /// Host node per rendered label.
    fn by_label(host: &MemoryHost, anchor: HostId) -> HashMap<String, HostId> {
        host.children(anchor).into_iter().map(|c| (host.text_content(c), c)).collect()
    }

    fn assert_realized_matches_host(tree: &VNode, host: &MemoryHost, anchor: HostId) {
        let realized: Vec<_> = tree.child_nodes().unwrap().iter().map(|c| c.realized().unwrap()).collect();
        assert_eq!(realized, host.children(anchor));
    }

    #[test]
    fn test_keyed_move_through_key_map() {
        let (host, anchor, patcher, tree) = mounted(&["a", "b", "c", "d", "e"]);
        let before = by_label(&host, anchor);

        let tree = patcher.patch(tree, list(&["b", "e", "d", "a", "c"])).unwrap();

        assert_eq!(rendered(&host, anchor), ["b", "e", "d", "a", "c"]);
        assert_eq!(by_label(&host, anchor), before);
        assert!(host.mutations().iter().all(Mutation::is_insert));
        assert_realized_matches_host(&tree, &host, anchor);
    }

    #[test]
    fn test_key_map_with_creates_and_tail_removal() {
        let (host, anchor, patcher, tree) = mounted(&["a", "b", "c", "d", "e"]);
        let before = by_label(&host, anchor);

        let tree = patcher.patch(tree, list(&["d", "a", "q", "b", "e", "r"])).unwrap();

        assert_eq!(rendered(&host, anchor), ["d", "a", "q", "b", "e", "r"]);
        let after = by_label(&host, anchor);
        for key in ["a", "b", "d", "e"] {
            assert_eq!(after[key], before[key], "{key} reused");
        }
        for key in ["q", "r"] {
            assert!(!before.values().any(|id| *id == after[key]), "{key} created");
        }
        assert_eq!(host.parent_node(before["c"]), None);
        let removed: Vec<_> = host
            .mutations()
            .iter()
            .filter(|m| matches!(m, Mutation::Remove { .. }))
            .map(Mutation::node)
            .collect();
        assert_eq!(removed, vec![before["c"]]);
        assert_realized_matches_host(&tree, &host, anchor);
    }

    #[test]
    fn test_consumed_key_hit_counts_as_miss() {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("ul");
        let patcher = Patcher::with_options(
            host.clone(),
            default_modules(),
            PatchOptions::new().with_key_validation(KeyValidation::Warn),
        );
        let tree = patcher.patch(anchor, list(&["a", "b", "c"])).unwrap();
        let b = host.children(anchor)[1];

        let tree = patcher.patch(tree, list(&["b", "b", "z"])).unwrap();

        assert_eq!(rendered(&host, anchor), ["b", "b", "z"]);
        let children = host.children(anchor);
        assert_eq!(children[0], b);
        assert_ne!(children[1], b);
        assert_realized_matches_host(&tree, &host, anchor);
    }

    #[test]
    fn test_replace_all() {
        let (host, anchor, patcher, tree) = mounted(&["a", "b"]);
        let before = host.children(anchor);

        patcher.patch(tree, list(&["c", "d", "e"])).unwrap();

        assert_eq!(rendered(&host, anchor), ["c", "d", "e"]);
        assert!(host.children(anchor).iter().all(|c| !before.contains(c)));
    }

    #[test]
    fn test_duplicate_keys_warn_but_patch() {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("ul");
        let patcher = Patcher::with_options(
            host.clone(),
            default_modules(),
            PatchOptions::new().with_key_validation(KeyValidation::Warn),
        );

        let tree = patcher.patch(anchor, list(&["a", "a"])).unwrap();
        patcher.patch(tree, list(&["a", "b"])).unwrap();
        assert_eq!(rendered(&host, anchor), ["a", "b"]);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let host = Rc::new(MemoryHost::new());
        let anchor = host.create_root("ul");
        let patcher = Patcher::with_options(
            host.clone(),
            default_modules(),
            PatchOptions::new().with_key_validation(KeyValidation::Reject),
        );

        let err = patcher.patch(anchor, list(&["a", "b", "a"])).unwrap_err();
        assert_eq!(
            err,
            PatchError::DuplicateKey {
                key: Key::from("a"),
                parent: "ul".to_string(),
            }
        );
    }
}
