//! Attributes module.

use std::collections::BTreeMap;

use super::Module;
use crate::host::ElementOps;
use crate::types::HookSet;
use crate::vnode::{AttrValue, VNode};

/// Attributes whose mere presence means "on".
const BOOLEAN_ATTRS: &[&str] = &[
    "allowfullscreen", "async", "autofocus", "autoplay", "checked", "compact", "controls",
    "declare", "default", "defaultchecked", "defaultmuted", "defaultselected", "defer",
    "disabled", "draggable", "enabled", "formnovalidate", "hidden", "indeterminate", "inert",
    "ismap", "itemscope", "loop", "multiple", "muted", "nohref", "noresize", "noshade",
    "novalidate", "nowrap", "open", "pauseonexit", "readonly", "required", "reversed",
    "scoped", "seamless", "selected", "sortable", "spellcheck", "translate", "truespeed",
    "typemustmatch", "visible",
];

pub fn is_boolean_attr(name: &str) -> bool {
    BOOLEAN_ATTRS.contains(&name)
}

/// Applies `data.attrs`.
///
/// Boolean attributes set to `false` are removed, `true` sets them empty.
/// Attributes dropped by the new node are removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttrsModule;

impl<H: ElementOps + ?Sized> Module<H> for AttrsModule {
    fn name(&self) -> &'static str {
        "attrs"
    }

    fn hooks(&self) -> HookSet {
        HookSet::CREATE | HookSet::UPDATE
    }

    fn create(&self, host: &H, empty: &VNode, node: &mut VNode) {
        update_attrs(host, empty, node);
    }

    fn update(&self, host: &H, old: &VNode, node: &mut VNode) {
        update_attrs(host, old, node);
    }
}

fn update_attrs<H: ElementOps + ?Sized>(host: &H, old: &VNode, node: &VNode) {
    let Some(elm) = node.realized() else { return };
    let none = BTreeMap::new();
    let old_attrs = old.data().map_or(&none, |d| &d.attrs);
    let attrs = node.data().map_or(&none, |d| &d.attrs);

    for (name, cur) in attrs {
        if old_attrs.get(name) == Some(cur) {
            continue;
        }
        match cur {
            AttrValue::Str(value) => host.set_attribute(elm, name, value),
            AttrValue::Bool(on) if is_boolean_attr(name) => {
                if *on {
                    host.set_attribute(elm, name, "");
                } else {
                    host.remove_attribute(elm, name);
                }
            }
            AttrValue::Bool(on) => host.set_attribute(elm, name, if *on { "true" } else { "false" }),
        }
    }

    for name in old_attrs.keys() {
        if !attrs.contains_key(name) {
            host.remove_attribute(elm, name);
        }
    }
}
