//! Class module.

use super::Module;
use crate::host::ElementOps;
use crate::types::HookSet;
use crate::vnode::{ClassValue, NodeData, VNode};

/// Applies `data.static_class` and `data.class` as one class string.
///
/// The string is written only when it differs from the previous render's.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassModule;

impl<H: ElementOps + ?Sized> Module<H> for ClassModule {
    fn name(&self) -> &'static str {
        "class"
    }

    fn hooks(&self) -> HookSet {
        HookSet::CREATE | HookSet::UPDATE
    }

    fn create(&self, host: &H, empty: &VNode, node: &mut VNode) {
        update_class(host, empty, node);
    }

    fn update(&self, host: &H, old: &VNode, node: &mut VNode) {
        update_class(host, old, node);
    }
}

/// Class string for a node, `None` when it declares no class at all.
pub(crate) fn render_class(data: Option<&NodeData>) -> Option<String> {
    let data = data?;
    if data.static_class.is_none() && data.class.is_none() {
        return None;
    }
    let dynamic = data.class.as_ref().map(ClassValue::render).unwrap_or_default();
    Some(match &data.static_class {
        Some(fixed) if !dynamic.is_empty() => format!("{fixed} {dynamic}"),
        Some(fixed) => fixed.clone(),
        None => dynamic,
    })
}

fn update_class<H: ElementOps + ?Sized>(host: &H, old: &VNode, node: &VNode) {
    let Some(elm) = node.realized() else { return };
    let before = render_class(old.data());
    match render_class(node.data()) {
        Some(cls) if before.as_deref() != Some(cls.as_str()) => host.set_class(elm, &cls),
        None if before.is_some() => host.set_class(elm, ""),
        _ => {}
    }
}
