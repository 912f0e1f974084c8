//! Inline style module.

use std::collections::BTreeMap;

use super::Module;
use crate::host::ElementOps;
use crate::types::HookSet;
use crate::vnode::VNode;

/// Applies `data.style`. Empty values and dropped declarations are cleared.
#[derive(Debug, Default, Clone, Copy)]
pub struct StyleModule;

impl<H: ElementOps + ?Sized> Module<H> for StyleModule {
    fn name(&self) -> &'static str {
        "style"
    }

    fn hooks(&self) -> HookSet {
        HookSet::CREATE | HookSet::UPDATE
    }

    fn create(&self, host: &H, empty: &VNode, node: &mut VNode) {
        update_style(host, empty, node);
    }

    fn update(&self, host: &H, old: &VNode, node: &mut VNode) {
        update_style(host, old, node);
    }
}

fn update_style<H: ElementOps + ?Sized>(host: &H, old: &VNode, node: &VNode) {
    let Some(elm) = node.realized() else { return };
    let none = BTreeMap::new();
    let old_style = old.data().map_or(&none, |d| &d.style);
    let style = node.data().map_or(&none, |d| &d.style);

    for name in old_style.keys() {
        if !style.contains_key(name) {
            host.remove_style(elm, name);
        }
    }

    for (name, cur) in style {
        if old_style.get(name) == Some(cur) {
            continue;
        }
        if cur.is_empty() {
            host.remove_style(elm, name);
        } else {
            host.set_style(elm, name, cur);
        }
    }
}
