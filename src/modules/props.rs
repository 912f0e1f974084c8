//! Properties module.

use std::collections::BTreeMap;

use super::Module;
use crate::host::ElementOps;
use crate::types::HookSet;
use crate::vnode::VNode;

/// Applies `data.props`.
///
/// Props the new node drops (or makes falsy) are removed first, then changed
/// props are set. `value` is also checked against the live host value, since
/// user input changes it behind the tree's back.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropsModule;

impl<H: ElementOps + ?Sized> Module<H> for PropsModule {
    fn name(&self) -> &'static str {
        "props"
    }

    fn hooks(&self) -> HookSet {
        HookSet::CREATE | HookSet::UPDATE
    }

    fn create(&self, host: &H, empty: &VNode, node: &mut VNode) {
        update_props(host, empty, node);
    }

    fn update(&self, host: &H, old: &VNode, node: &mut VNode) {
        update_props(host, old, node);
    }
}

fn update_props<H: ElementOps + ?Sized>(host: &H, old: &VNode, node: &VNode) {
    let Some(elm) = node.realized() else { return };
    let none = BTreeMap::new();
    let old_props = old.data().map_or(&none, |d| &d.props);
    let props = node.data().map_or(&none, |d| &d.props);

    for name in old_props.keys() {
        if !props.get(name).is_some_and(|p| p.is_truthy()) {
            host.remove_property(elm, name);
        }
    }

    for (name, cur) in props {
        let changed = old_props.get(name) != Some(cur);
        if changed && (name != "value" || host.property(elm, name).as_ref() != Some(cur)) {
            host.set_property(elm, name, cur);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Host, MemoryHost};
    use crate::vnode::PropValue;

    #[test]
    fn test_props_set_and_removed() {
        let host = MemoryHost::new();
        let elm = host.create_element("input");

        let mut old = VNode::element("input").prop("checked", true).prop("tabIndex", 2);
        old.realized = Some(elm);
        PropsModule.create(&host, &VNode::empty(), &mut old);
        assert_eq!(host.property(elm, "checked"), Some(PropValue::Bool(true)));

        let mut next = VNode::element("input").prop("checked", true);
        next.realized = Some(elm);
        host.clear_mutations();
        PropsModule.update(&host, &old, &mut next);

        assert_eq!(host.property(elm, "tabIndex"), None);
        assert_eq!(host.take_mutations().len(), 1);
    }

    #[test]
    fn test_value_compared_against_live_host() {
        let host = MemoryHost::new();
        let elm = host.create_element("input");
        host.set_property(elm, "value", &PropValue::from("typed"));

        let mut old = VNode::element("input").prop("value", "x");
        old.realized = Some(elm);

        // The tree moved to the value the host already holds.
        let mut next = VNode::element("input").prop("value", "typed");
        next.realized = Some(elm);
        host.clear_mutations();
        PropsModule.update(&host, &old, &mut next);
        assert!(host.mutations().is_empty(), "host already holds the value");

        let mut again = VNode::element("input").prop("value", "reset");
        again.realized = Some(elm);
        PropsModule.update(&host, &next, &mut again);
        assert_eq!(host.property(elm, "value"), Some(PropValue::from("reset")));
    }
}
