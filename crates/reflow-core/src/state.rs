use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::effects::EffectSlot;
use crate::runtime::{InstanceId, RuntimeInner};

/// Positional storage of one instance; the Nth hook call of a render always
/// lands on the Nth slot.
pub(crate) enum HookSlot {
    State(Rc<dyn Any>),
    Effect(EffectSlot),
}

impl HookSlot {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            HookSlot::State(_) => "state",
            HookSlot::Effect(_) => "effect",
        }
    }
}

/// State cell handle. Cloning shares the cell; setting schedules a re-render
/// of the owning instance on the next flush.
pub struct State<T: 'static> {
    cell: Rc<RefCell<T>>,
    owner: InstanceId,
    rt: Weak<RuntimeInner>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            owner: self.owner,
            rt: self.rt.clone(),
        }
    }
}

impl<T: 'static> State<T> {
    pub(crate) fn new(cell: Rc<RefCell<T>>, owner: InstanceId, rt: Weak<RuntimeInner>) -> Self {
        Self { cell, owner, rt }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.cell.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    pub fn set(&self, v: T) {
        self.update(move |slot| *slot = v);
    }

    /// Writes are dropped once the owner has been unmounted.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let scheduled = self
            .rt
            .upgrade()
            .is_some_and(|rt| rt.schedule(self.owner));
        if !scheduled {
            log::debug!("discarding state update for unmounted instance {:?}", self.owner);
            return;
        }
        f(&mut self.cell.borrow_mut());
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("value", &*self.cell.borrow())
            .field("owner", &self.owner)
            .finish()
    }
}
