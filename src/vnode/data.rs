//! Node data - the aspect payload carried by element and component nodes.
//!
//! Each field belongs to one aspect module:
//! - `attrs` -> [`AttrsModule`](crate::modules::AttrsModule)
//! - `static_class` / `class` -> [`ClassModule`](crate::modules::ClassModule)
//! - `props` -> [`PropsModule`](crate::modules::PropsModule)
//! - `style` -> [`StyleModule`](crate::modules::StyleModule)
//! - `on` -> [`EventsModule`](crate::modules::EventsModule)
//!
//! `key`, `ns` and `hook` are read by the patch engine itself.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::hooks::Hooks;
use crate::types::{HostId, Key};

// =============================================================================
// NodeData
// =============================================================================

/// Aspect payload of an element or component node.
#[derive(Clone, Debug, Default)]
pub struct NodeData {
    /// Sibling key for the children differ.
    pub key: Option<Key>,
    /// Namespace URI for namespaced element creation (e.g. SVG).
    pub ns: Option<String>,
    /// Host attributes.
    pub attrs: BTreeMap<String, AttrValue>,
    /// Host properties.
    pub props: BTreeMap<String, PropValue>,
    /// Class that never changes between renders.
    pub static_class: Option<String>,
    /// Class expression evaluated on every render.
    pub class: Option<ClassValue>,
    /// Inline style declarations.
    pub style: BTreeMap<String, String>,
    /// Event listeners by event name. A leading `!` selects capture mode.
    pub on: BTreeMap<String, Handler>,
    /// Per-node lifecycle hooks.
    pub hook: Hooks,
}

// =============================================================================
// Attribute values
// =============================================================================

/// Value of a host attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    /// Presence flag. Boolean attributes set to `false` are removed.
    Bool(bool),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

// =============================================================================
// Property values
// =============================================================================

/// Value of a host property.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
}

impl PropValue {
    /// Falsy values (`Null`, `false`, `0`, `NaN`, `""`) drop the property.
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Null => false,
            PropValue::Bool(b) => *b,
            PropValue::Num(n) => *n != 0.0 && !n.is_nan(),
            PropValue::Str(s) => !s.is_empty(),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Num(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Num(value as f64)
    }
}

// =============================================================================
// Class expressions
// =============================================================================

/// Dynamic class expression.
///
/// - `Str("a b")` is used verbatim
/// - `Map({a: true, b: false})` keeps the enabled names
/// - `List([..])` concatenates its non-empty members
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassValue {
    Str(String),
    Map(BTreeMap<String, bool>),
    List(Vec<ClassValue>),
}

impl ClassValue {
    /// Render to a space-separated class string.
    pub fn render(&self) -> String {
        match self {
            ClassValue::Str(s) => s.clone(),
            ClassValue::Map(map) => map
                .iter()
                .filter(|(_, on)| **on)
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            ClassValue::List(items) => items
                .iter()
                .map(ClassValue::render)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<&str> for ClassValue {
    fn from(value: &str) -> Self {
        ClassValue::Str(value.to_string())
    }
}

impl<const N: usize> From<[(&str, bool); N]> for ClassValue {
    fn from(value: [(&str, bool); N]) -> Self {
        ClassValue::Map(
            value
                .into_iter()
                .map(|(name, on)| (name.to_string(), on))
                .collect(),
        )
    }
}

// =============================================================================
// Events
// =============================================================================

/// Event delivered to a listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Event name without the capture prefix.
    pub kind: String,
    /// Host node the event was dispatched on.
    pub target: HostId,
}

/// Listener callback.
pub type Listener = Rc<dyn Fn(&Event)>;

/// Shared listener slot.
///
/// The host holds on to the slot registered on first mount. Later renders
/// only swap the callback inside it, so the host registration never churns.
#[derive(Clone)]
pub struct Handler(Rc<RefCell<Listener>>);

impl Handler {
    pub fn new(listener: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(RefCell::new(Rc::new(listener))))
    }

    /// Current callback.
    pub fn listener(&self) -> Listener {
        self.0.borrow().clone()
    }

    /// Replace the callback in place.
    pub fn set(&self, listener: Listener) {
        *self.0.borrow_mut() = listener;
    }

    /// Invoke the current callback.
    pub fn call(&self, event: &Event) {
        // Clone out first so the callback may swap itself.
        let listener = self.listener();
        listener(event);
    }

    /// Whether both handles share one slot.
    pub fn same_slot(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0))
    }
}
