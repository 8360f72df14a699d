//! # Context channel
//!
//! A [`Context<T>`] is a typed channel from a provider node to descendants.
//! Providers are ordinary nodes in the description tree:
//!
//! ```rust
//! use std::sync::LazyLock;
//! use reflow_core::*;
//!
//! static DENSITY: LazyLock<Context<f32>> = LazyLock::new(|| Context::new("Density", || 1.0));
//!
//! let tree = DENSITY.provide(2.0, vec![component("Reader", |cx| {
//!     let d = cx.use_context(&DENSITY)?;
//!     Ok(View::new(ViewKind::Text { text: format!("{d}"), role: TextRole::Body }))
//! })]);
//! # let _ = tree;
//! ```
//!
//! Resolution walks the scope chain handed down by the render loop, so the
//! nearest enclosing provider for the same context wins. Nothing is stored in
//! ambient globals; each mounted provider owns a cell holding its current
//! value and subscribers, and the chain holds references to those cells.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::runtime::InstanceId;
use crate::view::{ProviderNode, View, ViewKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ContextId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub struct Context<T> {
    id: ContextId,
    name: &'static str,
    default: Option<fn() -> T>,
}

impl<T: Clone + PartialEq + 'static> Context<T> {
    /// Context whose reads outside a provider fall back to `default()`.
    pub fn new(name: &'static str, default: fn() -> T) -> Self {
        Self {
            id: ContextId::next(),
            name,
            default: Some(default),
        }
    }

    /// Context that must be provided; reading it bare is an error.
    pub fn required(name: &'static str) -> Self {
        Self {
            id: ContextId::next(),
            name,
            default: None,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn fallback(&self) -> Option<T> {
        self.default.map(|f| f())
    }

    /// Provider node broadcasting `value` to `children` and their subtrees.
    pub fn provide(&self, value: T, children: Vec<View>) -> View {
        View::new(ViewKind::Provider(ProviderNode {
            name: self.name,
            context: self.id,
            type_id: TypeId::of::<T>(),
            value: Rc::new(value),
            eq: eq_any::<T>,
        }))
        .with_children(children)
    }
}

fn eq_any<T: PartialEq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Live state of one mounted provider.
pub(crate) struct ProviderCell {
    pub(crate) context: ContextId,
    value: RefCell<Rc<dyn Any>>,
    subscribers: RefCell<SmallVec<[InstanceId; 4]>>,
}

impl ProviderCell {
    pub(crate) fn new(context: ContextId, value: Rc<dyn Any>) -> Self {
        Self {
            context,
            value: RefCell::new(value),
            subscribers: RefCell::new(SmallVec::new()),
        }
    }

    pub(crate) fn read<T: Clone + 'static>(&self) -> Option<T> {
        self.value.borrow().downcast_ref::<T>().cloned()
    }

    /// Swaps in `next` if it differs from the current value. Returns the
    /// subscribers to notify, or `None` when nothing changed.
    pub(crate) fn replace(&self, next: &ProviderNode) -> Option<SmallVec<[InstanceId; 4]>> {
        let changed = !(next.eq)(&**self.value.borrow(), &*next.value);
        if !changed {
            return None;
        }
        *self.value.borrow_mut() = next.value.clone();
        Some(self.subscribers.borrow().clone())
    }

    pub(crate) fn subscribe(&self, id: InstanceId) {
        let mut subs = self.subscribers.borrow_mut();
        if !subs.contains(&id) {
            subs.push(id);
        }
    }

    pub(crate) fn unsubscribe(&self, id: InstanceId) {
        self.subscribers.borrow_mut().retain(|s| *s != id);
    }
}

struct ScopeFrame {
    cell: Rc<ProviderCell>,
    parent: ContextScope,
}

/// Persistent chain of visible providers, innermost first.
#[derive(Clone, Default)]
pub(crate) struct ContextScope(Option<Rc<ScopeFrame>>);

impl ContextScope {
    pub(crate) fn with(&self, cell: Rc<ProviderCell>) -> Self {
        ContextScope(Some(Rc::new(ScopeFrame {
            cell,
            parent: self.clone(),
        })))
    }

    pub(crate) fn lookup(&self, id: ContextId) -> Option<Rc<ProviderCell>> {
        let mut cur = self.0.as_ref();
        while let Some(frame) = cur {
            if frame.cell.context == id {
                return Some(frame.cell.clone());
            }
            cur = frame.parent.0.as_ref();
        }
        None
    }
}
