use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::InstanceId;

#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Cleanup that does nothing.
    pub fn empty() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_spent(&self) -> bool {
        self.0.borrow().is_none()
    }
}

impl std::fmt::Debug for Dispose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispose")
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Helper to return a cleanup from an effect.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

/// Per-instance effect record: deps seen at the last commit and the cleanup
/// that run produced.
#[derive(Default)]
pub(crate) struct EffectSlot {
    pub(crate) deps: Option<Box<dyn Any>>,
    pub(crate) cleanup: Option<Dispose>,
}

impl EffectSlot {
    pub(crate) fn changed<D: PartialEq + 'static>(&self, next: &D) -> bool {
        match self.deps.as_ref().and_then(|d| d.downcast_ref::<D>()) {
            Some(prev) => prev != next,
            None => true,
        }
    }
}

/// Effect queued during render, run after the frame it belongs to commits.
pub(crate) struct PendingEffect {
    pub(crate) instance: InstanceId,
    pub(crate) slot: usize,
    pub(crate) deps: Box<dyn Any>,
    pub(crate) run: Box<dyn FnOnce() -> Dispose>,
}
