//! Event listener module.
//!
//! # Pattern: Stable Registration
//!
//! A listener is registered on the host once, when its event name first
//! appears on the node. The host holds the [`Handler`] slot, not the
//! callback. Every later render only swaps the callback inside that slot and
//! carries the slot over to the new node, so re-rendering a closure never
//! adds or removes host listeners.

use super::Module;
use crate::host::ElementOps;
use crate::types::HookSet;
use crate::vnode::{Handler, VNode};

/// Applies `data.on`. A `!` prefix on the event name selects capture mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventsModule;

impl<H: ElementOps + ?Sized> Module<H> for EventsModule {
    fn name(&self) -> &'static str {
        "events"
    }

    fn hooks(&self) -> HookSet {
        HookSet::CREATE | HookSet::UPDATE
    }

    fn create(&self, host: &H, empty: &VNode, node: &mut VNode) {
        update_listeners(host, empty, node);
    }

    fn update(&self, host: &H, old: &VNode, node: &mut VNode) {
        update_listeners(host, old, node);
    }
}

/// Split `"!click"` into `("click", true)`.
fn parse_event(name: &str) -> (&str, bool) {
    match name.strip_prefix('!') {
        Some(event) => (event, true),
        None => (name, false),
    }
}

fn update_listeners<H: ElementOps + ?Sized>(host: &H, old: &VNode, node: &mut VNode) {
    let Some(elm) = node.realized() else { return };
    let Some(data) = node.data_mut() else { return };
    let old_on = old.data().map(|d| &d.on);

    for (name, cur) in data.on.iter_mut() {
        match old_on.and_then(|on| on.get(name)) {
            None => {
                let (event, capture) = parse_event(name);
                host.add_listener(elm, event, capture, cur.clone());
            }
            Some(prev) if !prev.same_slot(cur) => {
                prev.set(cur.listener());
                *cur = Handler::clone(prev);
            }
            Some(_) => {}
        }
    }

    if let Some(old_on) = old_on {
        for name in old_on.keys() {
            if !data.on.contains_key(name) {
                let (event, capture) = parse_event(name);
                host.remove_listener(elm, event, capture);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Host, MemoryHost};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_parse_capture_prefix() {
        assert_eq!(parse_event("!click"), ("click", true));
        assert_eq!(parse_event("click"), ("click", false));
    }

    #[test]
    fn test_listener_swapped_without_host_churn() {
        let host = MemoryHost::new();
        let elm = host.create_element("button");
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_first = seen.clone();
        let mut old = VNode::element("button").on("click", move |_| seen_first.borrow_mut().push("first"));
        old.realized = Some(elm);
        EventsModule.create(&host, &VNode::empty(), &mut old);
        assert_eq!(host.listener_count(elm), 1);

        let seen_second = seen.clone();
        let mut next = VNode::element("button").on("click", move |_| seen_second.borrow_mut().push("second"));
        next.realized = Some(elm);
        host.clear_mutations();
        EventsModule.update(&host, &old, &mut next);

        assert!(host.mutations().is_empty(), "no host listener churn");
        host.dispatch(elm, "click");
        assert_eq!(*seen.borrow(), vec!["second"]);

        // The slot moved to the new node.
        let slot = &next.data().unwrap().on["click"];
        assert!(slot.same_slot(&old.data().unwrap().on["click"]));
    }

    #[test]
    fn test_dropped_listener_removed() {
        let host = MemoryHost::new();
        let elm = host.create_element("div");

        let mut old = VNode::element("div").on("!focus", |_| {});
        old.realized = Some(elm);
        EventsModule.create(&host, &VNode::empty(), &mut old);

        let mut next = VNode::element("div");
        next.realized = Some(elm);
        EventsModule.update(&host, &old, &mut next);

        assert_eq!(host.listener_count(elm), 0);
    }
}
