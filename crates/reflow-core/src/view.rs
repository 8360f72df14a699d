use std::any::{Any, TypeId};
use std::rc::Rc;

use crate::context::ContextId;
use crate::hooks::Cx;
use crate::runtime::InstanceId;
use crate::Result;

pub type Callback = Rc<dyn Fn()>;

pub(crate) type RenderFn = dyn Fn(&mut Cx<'_>) -> Result<View>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextRole {
    #[default]
    Body,
    Heading,
    Error,
}

#[derive(Clone)]
pub enum ViewKind {
    /// Transparent grouping; flattened into the parent on commit.
    Fragment,
    Surface,
    Column,
    Row,
    Text {
        text: String,
        role: TextRole,
    },
    Button {
        text: String,
        on_click: Option<Callback>,
    },
    Component(ComponentNode),
    Provider(ProviderNode),
    /// Placeholder left in an instance's stored output where a child instance
    /// was mounted. Never appears in a committed frame.
    #[doc(hidden)]
    Mounted(InstanceId),
}

impl std::fmt::Debug for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Fragment => write!(f, "Fragment"),
            ViewKind::Surface => write!(f, "Surface"),
            ViewKind::Column => write!(f, "Column"),
            ViewKind::Row => write!(f, "Row"),
            ViewKind::Text { text, role } => f
                .debug_struct("Text")
                .field("text", text)
                .field("role", role)
                .finish(),
            ViewKind::Button { text, .. } => f
                .debug_struct("Button")
                .field("text", text)
                .field("on_click", &"<callback>")
                .finish(),
            ViewKind::Component(c) => f.debug_tuple("Component").field(&c.name).finish(),
            ViewKind::Provider(p) => f.debug_tuple("Provider").field(&p.name).finish(),
            ViewKind::Mounted(id) => f.debug_tuple("Mounted").field(id).finish(),
        }
    }
}

/// A component occurrence in a description tree. Props and children live in
/// the captured render closure.
#[derive(Clone)]
pub struct ComponentNode {
    pub name: &'static str,
    pub(crate) type_id: TypeId,
    pub(crate) render: Rc<RenderFn>,
}

impl ComponentNode {
    pub(crate) fn new<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&mut Cx<'_>) -> Result<View> + 'static,
    {
        Self {
            name,
            type_id: TypeId::of::<F>(),
            render: Rc::new(render),
        }
    }
}

#[derive(Clone)]
pub struct ProviderNode {
    pub name: &'static str,
    pub(crate) context: ContextId,
    pub(crate) type_id: TypeId,
    pub(crate) value: Rc<dyn Any>,
    pub(crate) eq: fn(&dyn Any, &dyn Any) -> bool,
}

#[derive(Clone, Debug)]
pub struct View {
    pub kind: ViewKind,
    pub key: Option<String>,
    pub tag: Option<String>,
    pub children: Vec<View>,
}

impl View {
    pub fn new(kind: ViewKind) -> Self {
        View {
            kind,
            key: None,
            tag: None,
            children: vec![],
        }
    }

    pub fn fragment(children: Vec<View>) -> Self {
        View::new(ViewKind::Fragment).with_children(children)
    }

    pub fn with_children(mut self, kids: Vec<View>) -> Self {
        self.children = kids;
        self
    }

    /// Reconciliation key; keyed components keep their instance across
    /// reordering among siblings of the same type.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Label used by hosts and tests to find a node.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ViewKind::Text { text, .. } | ViewKind::Button { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Depth-first search over this node and its descendants.
    pub fn find(&self, pred: &dyn Fn(&View) -> bool) -> Option<&View> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(pred))
    }

    pub fn find_tagged(&self, tag: &str) -> Option<&View> {
        self.find(&|v| v.tag.as_deref() == Some(tag))
    }

    /// Every text and button label, in tree order.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts(&self, out: &mut Vec<String>) {
        if let Some(t) = self.text() {
            out.push(t.to_string());
        }
        for c in &self.children {
            c.collect_texts(out);
        }
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.find(&|v| v.text() == Some(text)).is_some()
    }

    pub(crate) fn is_instance(&self) -> bool {
        matches!(self.kind, ViewKind::Component(_) | ViewKind::Provider(_))
    }
}

/// Wraps a render function into a component node.
///
/// The closure's type is the component's identity: two calls of the same
/// constructor produce nodes that reconcile onto the same instance.
///
/// ```rust
/// use reflow_core::*;
///
/// #[allow(non_snake_case)]
/// fn Label(text: String) -> View {
///     component("Label", move |_cx| {
///         Ok(View::new(ViewKind::Text { text: text.clone(), role: TextRole::Body }))
///     })
/// }
/// ```
pub fn component<F>(name: &'static str, render: F) -> View
where
    F: Fn(&mut Cx<'_>) -> Result<View> + 'static,
{
    View::new(ViewKind::Component(ComponentNode::new(name, render)))
}

/// Committed host tree handed to a [`crate::HostSurface`].
#[derive(Clone, Debug)]
pub struct Frame {
    pub root: View,
    pub generation: u64,
}

impl Frame {
    /// First button whose tag, or failing that whose text, equals `label`.
    pub fn button(&self, label: &str) -> Option<&View> {
        self.root
            .find(&|v| is_button(v) && v.tag.as_deref() == Some(label))
            .or_else(|| self.root.find(&|v| is_button(v) && v.text() == Some(label)))
    }
}

fn is_button(v: &View) -> bool {
    matches!(v.kind, ViewKind::Button { .. })
}
