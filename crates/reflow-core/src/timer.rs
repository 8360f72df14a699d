//! Single-threaded timer host on a simulated clock.
//!
//! Nothing here sleeps. The owner of the clock (normally [`crate::Root`])
//! calls [`Timers::pop_due`] while advancing time and runs each callback as
//! its own event.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};

use crate::{Error, Result};

new_key_type! { pub struct TimerId; }

enum Callback {
    Once(Box<dyn FnOnce()>),
    Repeat(Rc<dyn Fn()>),
}

struct Entry {
    due: Duration,
    period: Option<Duration>,
    seq: u64,
    callback: Option<Callback>,
}

#[derive(Default)]
struct Queue {
    now: Duration,
    next_seq: u64,
    entries: SlotMap<TimerId, Entry>,
}

impl Queue {
    fn insert(&mut self, delay: Duration, period: Option<Duration>, callback: Callback) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(Entry {
            due: self.now + delay,
            period,
            seq,
            callback: Some(callback),
        })
    }
}

/// Due callback taken off the queue; run it with no timer borrow held.
pub struct Fired(Callback);

impl Fired {
    pub fn run(self) {
        match self.0 {
            Callback::Once(f) => f(),
            Callback::Repeat(f) => f(),
        }
    }
}

#[derive(Clone, Default)]
pub struct Timers(Rc<RefCell<Queue>>);

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.0.borrow().now
    }

    /// Fires `f` every `period` until the handle is cancelled.
    pub fn set_interval(&self, period: Duration, f: impl Fn() + 'static) -> Result<TimerHandle> {
        if period.is_zero() {
            return Err(Error::InvalidTimer);
        }
        let id = self
            .0
            .borrow_mut()
            .insert(period, Some(period), Callback::Repeat(Rc::new(f)));
        log::debug!("interval {id:?} armed every {period:?}");
        Ok(self.handle(id))
    }

    /// Fires `f` once after `delay`.
    pub fn set_timeout(&self, delay: Duration, f: impl FnOnce() + 'static) -> TimerHandle {
        let id = self
            .0
            .borrow_mut()
            .insert(delay, None, Callback::Once(Box::new(f)));
        log::debug!("timeout {id:?} armed for {delay:?}");
        self.handle(id)
    }

    fn handle(&self, id: TimerId) -> TimerHandle {
        TimerHandle {
            id,
            queue: Rc::downgrade(&self.0),
        }
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().entries.len()
    }

    /// Earliest timer due at or before `limit` (ties by arming order). The
    /// clock moves to its due time; intervals are re-armed before returning.
    pub fn pop_due(&self, limit: Duration) -> Option<Fired> {
        let mut q = self.0.borrow_mut();
        let (id, due) = q
            .entries
            .iter()
            .filter(|(_, e)| e.due <= limit)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(id, e)| (id, e.due))?;
        q.now = q.now.max(due);

        let callback = match q.entries[id].period {
            Some(period) => {
                let seq = q.next_seq;
                q.next_seq += 1;
                let entry = &mut q.entries[id];
                entry.due = due + period;
                entry.seq = seq;
                match &entry.callback {
                    Some(Callback::Repeat(f)) => Callback::Repeat(f.clone()),
                    _ => return None,
                }
            }
            None => q.entries.remove(id)?.callback?,
        };
        log::debug!("timer {id:?} fired at {due:?}");
        Some(Fired(callback))
    }

    /// Moves the clock forward without firing anything.
    pub fn set_now(&self, now: Duration) {
        let mut q = self.0.borrow_mut();
        q.now = q.now.max(now);
    }

    pub(crate) fn clear(&self) {
        self.0.borrow_mut().entries.clear();
    }
}

/// Cancels its timer on [`TimerHandle::cancel`]. Dropping the handle leaves
/// the timer armed.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    id: TimerId,
    queue: Weak<RefCell<Queue>>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        if let Some(q) = self.queue.upgrade()
            && q.borrow_mut().entries.remove(self.id).is_some()
        {
            log::debug!("timer {:?} cancelled", self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.queue
            .upgrade()
            .is_some_and(|q| q.borrow().entries.contains_key(self.id))
    }

    pub fn id(&self) -> TimerId {
        self.id
    }
}
