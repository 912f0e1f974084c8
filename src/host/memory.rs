//! In-memory host - Arena-backed tree with a mutation log.
//!
//! Host nodes are indices into one arena, like components are indices into
//! parallel arrays elsewhere in the stack:
//!
//! ```text
//! #0: <div>        (parent=None, children=[#1, #2])
//! #1: "hello"      (parent=#0)
//! #2: <span>       (parent=#0, class="b")
//! ```
//!
//! Slots are never reused, so a stale handle still reads the node it was
//! issued for. Every mutating call is appended to a [`Mutation`] log that
//! tests drain with [`MemoryHost::take_mutations`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use super::{ElementOps, Host};
use crate::types::HostId;
use crate::vnode::{Event, Handler, PropValue};

// =============================================================================
// Mutation log
// =============================================================================

/// One recorded host mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateElement { node: HostId, tag: String },
    CreateText { node: HostId, text: String },
    /// `append_child` logs with `before: None`.
    Insert {
        parent: HostId,
        node: HostId,
        before: Option<HostId>,
    },
    Remove { parent: HostId, node: HostId },
    SetText { node: HostId, text: String },
    SetAttribute { node: HostId, name: String, value: String },
    RemoveAttribute { node: HostId, name: String },
    SetProperty { node: HostId, name: String, value: PropValue },
    RemoveProperty { node: HostId, name: String },
    SetClass { node: HostId, class: String },
    SetStyle { node: HostId, name: String, value: String },
    RemoveStyle { node: HostId, name: String },
    AddListener { node: HostId, event: String, capture: bool },
    RemoveListener { node: HostId, event: String, capture: bool },
}

impl Mutation {
    /// Whether this mutation creates a host node.
    pub fn is_create(&self) -> bool {
        matches!(self, Mutation::CreateElement { .. } | Mutation::CreateText { .. })
    }

    /// Whether this mutation inserts or moves a node.
    pub fn is_insert(&self) -> bool {
        matches!(self, Mutation::Insert { .. })
    }

    /// Node the mutation targets.
    pub fn node(&self) -> HostId {
        match self {
            Mutation::CreateElement { node, .. }
            | Mutation::CreateText { node, .. }
            | Mutation::Insert { node, .. }
            | Mutation::Remove { node, .. }
            | Mutation::SetText { node, .. }
            | Mutation::SetAttribute { node, .. }
            | Mutation::RemoveAttribute { node, .. }
            | Mutation::SetProperty { node, .. }
            | Mutation::RemoveProperty { node, .. }
            | Mutation::SetClass { node, .. }
            | Mutation::SetStyle { node, .. }
            | Mutation::RemoveStyle { node, .. }
            | Mutation::AddListener { node, .. }
            | Mutation::RemoveListener { node, .. } => *node,
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Debug, Clone)]
enum SlotKind {
    Element { tag: String, ns: Option<String> },
    Text(String),
}

#[derive(Debug)]
struct ListenerEntry {
    event: String,
    capture: bool,
    handler: Handler,
}

#[derive(Debug)]
struct Slot {
    kind: SlotKind,
    parent: Option<HostId>,
    children: Vec<HostId>,
    attrs: BTreeMap<String, String>,
    props: BTreeMap<String, PropValue>,
    class: String,
    style: BTreeMap<String, String>,
    listeners: Vec<ListenerEntry>,
}

impl Slot {
    fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attrs: BTreeMap::new(),
            props: BTreeMap::new(),
            class: String::new(),
            style: BTreeMap::new(),
            listeners: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Arena {
    slots: Vec<Slot>,
}

impl Arena {
    fn alloc(&mut self, kind: SlotKind) -> HostId {
        let id = HostId(self.slots.len());
        self.slots.push(Slot::new(kind));
        id
    }

    fn slot(&self, id: HostId) -> &Slot {
        &self.slots[id.0]
    }

    fn slot_mut(&mut self, id: HostId) -> &mut Slot {
        &mut self.slots[id.0]
    }

    fn detach(&mut self, node: HostId) {
        if let Some(parent) = self.slot_mut(node).parent.take() {
            self.slot_mut(parent).children.retain(|&c| c != node);
        }
    }
}

// =============================================================================
// MemoryHost
// =============================================================================

/// Default [`Host`] implementation backed by an in-memory arena.
///
/// # Panics
///
/// Every method panics when handed a [`HostId`] this host did not issue.
#[derive(Debug, Default)]
pub struct MemoryHost {
    arena: RefCell<Arena>,
    log: RefCell<Vec<Mutation>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element to mount into, without logging it.
    pub fn create_root(&self, tag: &str) -> HostId {
        self.arena.borrow_mut().alloc(SlotKind::Element {
            tag: tag.to_string(),
            ns: None,
        })
    }

    fn record(&self, mutation: Mutation) {
        tracing::trace!(?mutation, "host mutation");
        self.log.borrow_mut().push(mutation);
    }

    // -------------------------------------------------------------------------
    // Mutation log
    // -------------------------------------------------------------------------

    /// Copy of the mutation log.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.log.borrow().clone()
    }

    /// Drain the mutation log.
    pub fn take_mutations(&self) -> Vec<Mutation> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    pub fn clear_mutations(&self) {
        self.log.borrow_mut().clear();
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Number of host nodes ever created.
    pub fn node_count(&self) -> usize {
        self.arena.borrow().slots.len()
    }

    pub fn children(&self, node: HostId) -> Vec<HostId> {
        self.arena.borrow().slot(node).children.clone()
    }

    pub fn is_text(&self, node: HostId) -> bool {
        matches!(self.arena.borrow().slot(node).kind, SlotKind::Text(_))
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: HostId) -> String {
        let arena = self.arena.borrow();
        let mut out = String::new();
        collect_text(&arena, node, &mut out);
        out
    }

    pub fn attribute(&self, node: HostId, name: &str) -> Option<String> {
        self.arena.borrow().slot(node).attrs.get(name).cloned()
    }

    pub fn class_name(&self, node: HostId) -> String {
        self.arena.borrow().slot(node).class.clone()
    }

    pub fn style_value(&self, node: HostId, name: &str) -> Option<String> {
        self.arena.borrow().slot(node).style.get(name).cloned()
    }

    pub fn namespace(&self, node: HostId) -> Option<String> {
        match &self.arena.borrow().slot(node).kind {
            SlotKind::Element { ns, .. } => ns.clone(),
            SlotKind::Text(_) => None,
        }
    }

    pub fn listener_count(&self, node: HostId) -> usize {
        self.arena.borrow().slot(node).listeners.len()
    }

    /// Invoke every listener on `node` registered for `event`.
    ///
    /// Returns how many listeners ran. Events do not propagate.
    pub fn dispatch(&self, node: HostId, event: &str) -> usize {
        // Collect first: listeners may call back into the host.
        let handlers: Vec<Handler> = self
            .arena
            .borrow()
            .slot(node)
            .listeners
            .iter()
            .filter(|l| l.event == event)
            .map(|l| l.handler.clone())
            .collect();

        let ev = Event {
            kind: event.to_string(),
            target: node,
        };
        for handler in &handlers {
            handler.call(&ev);
        }
        handlers.len()
    }

    /// Serialize `node` as markup. Attributes, class and style only.
    pub fn outer_html(&self, node: HostId) -> String {
        let arena = self.arena.borrow();
        let mut out = String::new();
        write_html(&arena, node, &mut out);
        out
    }
}

fn collect_text(arena: &Arena, node: HostId, out: &mut String) {
    let slot = arena.slot(node);
    match &slot.kind {
        SlotKind::Text(text) => out.push_str(text),
        SlotKind::Element { .. } => {
            for &child in &slot.children {
                collect_text(arena, child, out);
            }
        }
    }
}

fn write_html(arena: &Arena, node: HostId, out: &mut String) {
    let slot = arena.slot(node);
    match &slot.kind {
        SlotKind::Text(text) => out.push_str(text),
        SlotKind::Element { tag, .. } => {
            out.push('<');
            out.push_str(tag);
            if !slot.class.is_empty() {
                let _ = write!(out, " class=\"{}\"", slot.class);
            }
            for (name, value) in &slot.attrs {
                let _ = write!(out, " {name}=\"{value}\"");
            }
            if !slot.style.is_empty() {
                let decls: Vec<String> = slot
                    .style
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect();
                let _ = write!(out, " style=\"{}\"", decls.join("; "));
            }
            out.push('>');
            for &child in &slot.children {
                write_html(arena, child, out);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

// =============================================================================
// Host
// =============================================================================

impl Host for MemoryHost {
    fn create_element(&self, tag: &str) -> HostId {
        let node = self.arena.borrow_mut().alloc(SlotKind::Element {
            tag: tag.to_string(),
            ns: None,
        });
        self.record(Mutation::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_element_ns(&self, ns: &str, tag: &str) -> HostId {
        let node = self.arena.borrow_mut().alloc(SlotKind::Element {
            tag: tag.to_string(),
            ns: Some(ns.to_string()),
        });
        self.record(Mutation::CreateElement {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_text_node(&self, text: &str) -> HostId {
        let node = self.arena.borrow_mut().alloc(SlotKind::Text(text.to_string()));
        self.record(Mutation::CreateText {
            node,
            text: text.to_string(),
        });
        node
    }

    fn append_child(&self, parent: HostId, child: HostId) {
        self.insert_before(parent, child, None);
    }

    fn insert_before(&self, parent: HostId, node: HostId, reference: Option<HostId>) {
        if reference != Some(node) {
            let mut arena = self.arena.borrow_mut();
            arena.detach(node);
            let children = &mut arena.slot_mut(parent).children;
            let at = reference
                .and_then(|r| children.iter().position(|&c| c == r))
                .unwrap_or(children.len());
            children.insert(at, node);
            arena.slot_mut(node).parent = Some(parent);
        }
        self.record(Mutation::Insert {
            parent,
            node,
            before: reference,
        });
    }

    fn remove_child(&self, parent: HostId, child: HostId) {
        {
            let mut arena = self.arena.borrow_mut();
            if arena.slot(child).parent == Some(parent) {
                arena.detach(child);
            }
        }
        self.record(Mutation::Remove { parent, node: child });
    }

    fn parent_node(&self, node: HostId) -> Option<HostId> {
        self.arena.borrow().slot(node).parent
    }

    fn next_sibling(&self, node: HostId) -> Option<HostId> {
        let arena = self.arena.borrow();
        let parent = arena.slot(node).parent?;
        let siblings = &arena.slot(parent).children;
        let at = siblings.iter().position(|&c| c == node)?;
        siblings.get(at + 1).copied()
    }

    fn set_text_content(&self, node: HostId, text: &str) {
        {
            let mut arena = self.arena.borrow_mut();
            if let SlotKind::Text(existing) = &mut arena.slot_mut(node).kind {
                *existing = text.to_string();
            } else {
                let old = std::mem::take(&mut arena.slot_mut(node).children);
                for child in old {
                    arena.slot_mut(child).parent = None;
                }
                if !text.is_empty() {
                    let child = arena.alloc(SlotKind::Text(text.to_string()));
                    arena.slot_mut(child).parent = Some(node);
                    arena.slot_mut(node).children.push(child);
                }
            }
        }
        self.record(Mutation::SetText {
            node,
            text: text.to_string(),
        });
    }

    fn tag_name(&self, node: HostId) -> String {
        match &self.arena.borrow().slot(node).kind {
            SlotKind::Element { tag, .. } => tag.to_uppercase(),
            SlotKind::Text(_) => "#text".to_string(),
        }
    }
}

// =============================================================================
// ElementOps
// =============================================================================

impl ElementOps for MemoryHost {
    fn set_attribute(&self, node: HostId, name: &str, value: &str) {
        self.arena
            .borrow_mut()
            .slot_mut(node)
            .attrs
            .insert(name.to_string(), value.to_string());
        self.record(Mutation::SetAttribute {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_attribute(&self, node: HostId, name: &str) {
        self.arena.borrow_mut().slot_mut(node).attrs.remove(name);
        self.record(Mutation::RemoveAttribute {
            node,
            name: name.to_string(),
        });
    }

    fn set_property(&self, node: HostId, name: &str, value: &PropValue) {
        self.arena
            .borrow_mut()
            .slot_mut(node)
            .props
            .insert(name.to_string(), value.clone());
        self.record(Mutation::SetProperty {
            node,
            name: name.to_string(),
            value: value.clone(),
        });
    }

    fn property(&self, node: HostId, name: &str) -> Option<PropValue> {
        self.arena.borrow().slot(node).props.get(name).cloned()
    }

    fn remove_property(&self, node: HostId, name: &str) {
        self.arena.borrow_mut().slot_mut(node).props.remove(name);
        self.record(Mutation::RemoveProperty {
            node,
            name: name.to_string(),
        });
    }

    fn set_class(&self, node: HostId, class: &str) {
        self.arena.borrow_mut().slot_mut(node).class = class.to_string();
        self.record(Mutation::SetClass {
            node,
            class: class.to_string(),
        });
    }

    fn set_style(&self, node: HostId, name: &str, value: &str) {
        self.arena
            .borrow_mut()
            .slot_mut(node)
            .style
            .insert(name.to_string(), value.to_string());
        self.record(Mutation::SetStyle {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn remove_style(&self, node: HostId, name: &str) {
        self.arena.borrow_mut().slot_mut(node).style.remove(name);
        self.record(Mutation::RemoveStyle {
            node,
            name: name.to_string(),
        });
    }

    fn add_listener(&self, node: HostId, event: &str, capture: bool, handler: Handler) {
        self.arena.borrow_mut().slot_mut(node).listeners.push(ListenerEntry {
            event: event.to_string(),
            capture,
            handler,
        });
        self.record(Mutation::AddListener {
            node,
            event: event.to_string(),
            capture,
        });
    }

    fn remove_listener(&self, node: HostId, event: &str, capture: bool) {
        self.arena
            .borrow_mut()
            .slot_mut(node)
            .listeners
            .retain(|l| !(l.event == event && l.capture == capture));
        self.record(Mutation::RemoveListener {
            node,
            event: event.to_string(),
            capture,
        });
    }
}
