//! Virtual Node Model - What the UI should look like.
//!
//! A virtual tree is built fresh on every render and handed to the
//! [`Patcher`](crate::patch::Patcher), which compares it against the tree
//! from the previous render.
//!
//! # Node kinds
//!
//! ```text
//! Element    sel + data + (children | text)    -> host element
//! Text       string                            -> host text node
//! Component  sel + data + target node          -> whatever `target` realizes to
//! Empty      nothing                           -> comparand for create hooks
//! ```
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::VNode;
//!
//! let list = VNode::element("ul").children(
//!     ["a", "b", "c"]
//!         .into_iter()
//!         .map(|id| VNode::element("li").key(id).text_child(id)),
//! );
//! ```

mod data;
mod hooks;

pub use data::*;
pub use hooks::*;

use std::rc::Rc;

use crate::modules::RemoveDone;
use crate::types::{HostId, Key};

// =============================================================================
// Node types
// =============================================================================

/// One position in the virtual tree.
///
/// `realized` is the handle of the host node this virtual node owns once
/// mounted. Patching moves the handle from the old node to the new one.
#[derive(Clone, Debug)]
pub struct VNode {
    pub(crate) kind: NodeKind,
    pub(crate) realized: Option<HostId>,
}

/// Closed set of node variants.
#[derive(Clone, Debug)]
pub enum NodeKind {
    Element(ElementNode),
    Text(String),
    Component(ComponentNode),
    Empty,
}

/// Element node payload.
#[derive(Clone, Debug)]
pub struct ElementNode {
    /// Tag name.
    pub sel: String,
    pub data: NodeData,
    pub content: Content,
}

/// Content of an element: children or text, never both.
#[derive(Clone, Debug, Default)]
pub enum Content {
    #[default]
    Empty,
    Children(Vec<VNode>),
    Text(String),
}

/// Indirection node standing in for another node (component boundary).
///
/// Identity comes from the wrapper's own `sel` and key, the host node comes
/// from `target`.
#[derive(Clone, Debug)]
pub struct ComponentNode {
    pub sel: String,
    pub data: NodeData,
    pub target: Box<VNode>,
}

// =============================================================================
// Construction
// =============================================================================

impl VNode {
    /// Element node with the given tag.
    ///
    /// An empty tag yields an empty text node instead.
    pub fn element(sel: impl Into<String>) -> Self {
        let sel = sel.into();
        if sel.is_empty() {
            return Self::text("");
        }
        Self::from_kind(NodeKind::Element(ElementNode {
            sel,
            data: NodeData::default(),
            content: Content::Empty,
        }))
    }

    /// Text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_kind(NodeKind::Text(text.into()))
    }

    /// Component node delegating to `target`.
    pub fn component(sel: impl Into<String>, target: VNode) -> Self {
        Self::from_kind(NodeKind::Component(ComponentNode {
            sel: sel.into(),
            data: NodeData::default(),
            target: Box::new(target),
        }))
    }

    /// The "nothing" comparand passed to create hooks.
    pub fn empty() -> Self {
        Self::from_kind(NodeKind::Empty)
    }

    pub fn from_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            realized: None,
        }
    }

    /// Placeholder element bound to an existing host node.
    pub(crate) fn at(sel: String, host_node: HostId) -> Self {
        Self {
            kind: NodeKind::Element(ElementNode {
                sel,
                data: NodeData::default(),
                content: Content::Empty,
            }),
            realized: Some(host_node),
        }
    }

    /// Turn this element into a component node wrapping `target`.
    ///
    /// Keeps the selector and data, so identity is unchanged. Meant for
    /// `init` hooks that substitute rendered output for a placeholder.
    /// Has no effect on text or empty nodes.
    pub fn redirect(&mut self, target: VNode) {
        let kind = std::mem::replace(&mut self.kind, NodeKind::Empty);
        self.kind = match kind {
            NodeKind::Element(el) => NodeKind::Component(ComponentNode {
                sel: el.sel,
                data: el.data,
                target: Box::new(target),
            }),
            NodeKind::Component(mut c) => {
                c.target = Box::new(target);
                NodeKind::Component(c)
            }
            other => other,
        };
    }
}

/// Build an element from a tag, data and children.
pub fn h(sel: impl Into<String>, data: NodeData, children: impl IntoIterator<Item = VNode>) -> VNode {
    let mut node = VNode::element(sel);
    if let Some(slot) = node.data_mut() {
        *slot = data;
    }
    node.children(children)
}

// =============================================================================
// Accessors
// =============================================================================

impl VNode {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Selector (tag name). `None` for text and empty nodes.
    pub fn sel(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(el) => Some(&el.sel),
            NodeKind::Component(c) => Some(&c.sel),
            NodeKind::Text(_) | NodeKind::Empty => None,
        }
    }

    pub fn get_key(&self) -> Option<&Key> {
        self.data().and_then(|d| d.key.as_ref())
    }

    /// Aspect payload. `None` for text and empty nodes.
    pub fn data(&self) -> Option<&NodeData> {
        match &self.kind {
            NodeKind::Element(el) => Some(&el.data),
            NodeKind::Component(c) => Some(&c.data),
            NodeKind::Text(_) | NodeKind::Empty => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut NodeData> {
        match &mut self.kind {
            NodeKind::Element(el) => Some(&mut el.data),
            NodeKind::Component(c) => Some(&mut c.data),
            NodeKind::Text(_) | NodeKind::Empty => None,
        }
    }

    pub fn hooks(&self) -> Option<&Hooks> {
        self.data().map(|d| &d.hook)
    }

    /// Host node owned by this virtual node, once mounted.
    pub fn realized(&self) -> Option<HostId> {
        self.realized
    }

    /// Element children. `None` unless this is an element with children.
    pub fn child_nodes(&self) -> Option<&[VNode]> {
        match &self.kind {
            NodeKind::Element(ElementNode {
                content: Content::Children(children),
                ..
            }) => Some(children),
            _ => None,
        }
    }

    /// Text of a text node, or text content of an element.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(ElementNode {
                content: Content::Text(text),
                ..
            }) => Some(text),
            _ => None,
        }
    }

    /// Indirection target of a component node.
    pub fn target(&self) -> Option<&VNode> {
        match &self.kind {
            NodeKind::Component(c) => Some(&c.target),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    pub fn is_component(&self) -> bool {
        matches!(self.kind, NodeKind::Component(_))
    }
}

/// Whether two nodes may be patched in place.
///
/// Equal keys (both absent counts) and equal selectors.
#[inline]
pub fn same_vnode(a: &VNode, b: &VNode) -> bool {
    a.get_key() == b.get_key() && a.sel() == b.sel()
}

// =============================================================================
// Builder
// =============================================================================
//
// Data setters have no effect on text and empty nodes.

impl VNode {
    fn with_data(mut self, f: impl FnOnce(&mut NodeData)) -> Self {
        if let Some(data) = self.data_mut() {
            f(data);
        }
        self
    }

    pub fn key(self, key: impl Into<Key>) -> Self {
        let key = key.into();
        self.with_data(|d| d.key = Some(key))
    }

    pub fn ns(self, ns: impl Into<String>) -> Self {
        let ns = ns.into();
        self.with_data(|d| d.ns = Some(ns))
    }

    pub fn attr(self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.with_data(|d| {
            d.attrs.insert(name, value);
        })
    }

    pub fn prop(self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.with_data(|d| {
            d.props.insert(name, value);
        })
    }

    pub fn static_class(self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.with_data(|d| d.static_class = Some(class))
    }

    pub fn class(self, class: impl Into<ClassValue>) -> Self {
        let class = class.into();
        self.with_data(|d| d.class = Some(class))
    }

    pub fn style(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.with_data(|d| {
            d.style.insert(name, value);
        })
    }

    /// Attach a listener. Prefix the event name with `!` for capture mode.
    pub fn on(self, event: impl Into<String>, listener: impl Fn(&Event) + 'static) -> Self {
        self.on_handler(event, Handler::new(listener))
    }

    pub fn on_handler(self, event: impl Into<String>, handler: Handler) -> Self {
        let event = event.into();
        self.with_data(|d| {
            d.on.insert(event, handler);
        })
    }

    pub fn hooks_table(self, hooks: Hooks) -> Self {
        self.with_data(|d| d.hook = hooks)
    }

    pub fn hook_init(self, f: impl Fn(&mut VNode) + 'static) -> Self {
        self.with_data(|d| d.hook.init = Some(Rc::new(f)))
    }

    pub fn hook_create(self, f: impl Fn(&VNode, &VNode) + 'static) -> Self {
        self.with_data(|d| d.hook.create = Some(Rc::new(f)))
    }

    pub fn hook_insert(self, f: impl Fn(&VNode) + 'static) -> Self {
        self.with_data(|d| d.hook.insert = Some(Rc::new(f)))
    }

    pub fn hook_prepatch(self, f: impl Fn(&VNode, &mut VNode) + 'static) -> Self {
        self.with_data(|d| d.hook.prepatch = Some(Rc::new(f)))
    }

    pub fn hook_update(self, f: impl Fn(&VNode, &VNode) + 'static) -> Self {
        self.with_data(|d| d.hook.update = Some(Rc::new(f)))
    }

    pub fn hook_postpatch(self, f: impl Fn(&VNode, &VNode) + 'static) -> Self {
        self.with_data(|d| d.hook.postpatch = Some(Rc::new(f)))
    }

    pub fn hook_destroy(self, f: impl Fn(&VNode) + 'static) -> Self {
        self.with_data(|d| d.hook.destroy = Some(Rc::new(f)))
    }

    pub fn hook_remove(self, f: impl Fn(&VNode, RemoveDone) + 'static) -> Self {
        self.with_data(|d| d.hook.remove = Some(Rc::new(f)))
    }

    /// Append one child. Replaces any text content.
    pub fn child(mut self, child: VNode) -> Self {
        if let NodeKind::Element(el) = &mut self.kind {
            match &mut el.content {
                Content::Children(children) => children.push(child),
                content => *content = Content::Children(vec![child]),
            }
        }
        self
    }

    /// Append children. Replaces any text content.
    ///
    /// An empty iterator still leaves an (empty) children list in place.
    pub fn children(mut self, children: impl IntoIterator<Item = VNode>) -> Self {
        if let NodeKind::Element(el) = &mut self.kind {
            match &mut el.content {
                Content::Children(existing) => existing.extend(children),
                content => *content = Content::Children(children.into_iter().collect()),
            }
        }
        self
    }

    /// Set element text content. Replaces any children.
    pub fn text_child(mut self, text: impl Into<String>) -> Self {
        if let NodeKind::Element(el) = &mut self.kind {
            el.content = Content::Text(text.into());
        }
        self
    }
}
