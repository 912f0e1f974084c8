//! Root - The live tree behind one anchor.

use tracing::debug;

use crate::host::Host;
use crate::patch::{PatchError, Patcher, Previous};
use crate::types::HostId;
use crate::vnode::VNode;

/// Keeps the last patched tree so each render patches against it.
///
/// The first update adopts the anchor host node. After an update that fails
/// part way the root forgets its tree and the next update starts from the
/// anchor again.
pub struct Root<H: Host + 'static> {
    patcher: Patcher<H>,
    anchor: HostId,
    tree: Option<VNode>,
}

impl<H: Host + 'static> Root<H> {
    pub fn new(patcher: Patcher<H>, anchor: HostId) -> Self {
        Self {
            patcher,
            anchor,
            tree: None,
        }
    }

    pub fn patcher(&self) -> &Patcher<H> {
        &self.patcher
    }

    pub fn anchor(&self) -> HostId {
        self.anchor
    }

    /// The live tree, if mounted.
    pub fn tree(&self) -> Option<&VNode> {
        self.tree.as_ref()
    }

    /// Host node of the live tree's root.
    pub fn element(&self) -> Option<HostId> {
        self.tree.as_ref().and_then(VNode::realized)
    }

    pub fn is_mounted(&self) -> bool {
        self.tree.is_some()
    }

    /// Patch the live tree to `next`.
    ///
    /// A tree rejected by key validation leaves the live tree mounted.
    pub fn update(&mut self, next: VNode) -> Result<(), PatchError> {
        self.patcher.validate_keys(&next)?;
        let prev = match self.tree.take() {
            Some(tree) => Previous::Tree(tree),
            None => {
                debug!(anchor = %self.anchor, "mounting");
                Previous::Anchor(self.anchor)
            }
        };
        self.tree = Some(self.patcher.patch_validated(prev, next)?);
        Ok(())
    }

    /// Tear the live tree down.
    ///
    /// A tree patched onto the anchor itself is emptied and the anchor stays.
    /// A tree that replaced the anchor goes through the removal path.
    pub fn unmount(&mut self) -> Result<(), PatchError> {
        let tree = self.tree.take().ok_or(PatchError::NothingMounted)?;
        debug!(anchor = %self.anchor, "unmounting");

        if tree.realized() == Some(self.anchor) {
            let bare = VNode::element(self.patcher.host().tag_name(self.anchor).to_lowercase());
            self.patcher.patch(tree, bare)?;
        } else {
            self.patcher.remove(&tree);
        }
        Ok(())
    }
}
