use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::context::{Context, ContextScope, ProviderCell};
use crate::effects::{Dispose, EffectSlot, PendingEffect};
use crate::runtime::{InstanceId, RuntimeInner};
use crate::state::{HookSlot, State};
use crate::timer::Timers;
use crate::{Error, Result};

/// Render context of one component instance for one render pass.
///
/// Hooks are order-based: keep the sequence of `use_*` calls identical
/// between renders of the same instance.
pub struct Cx<'a> {
    rt: &'a Rc<RuntimeInner>,
    id: InstanceId,
    name: &'static str,
    hooks: &'a mut Vec<HookSlot>,
    cursor: usize,
    scope: &'a ContextScope,
    reads: SmallVec<[Rc<ProviderCell>; 2]>,
    effects: Vec<PendingEffect>,
}

impl<'a> Cx<'a> {
    pub(crate) fn new(
        rt: &'a Rc<RuntimeInner>,
        id: InstanceId,
        name: &'static str,
        hooks: &'a mut Vec<HookSlot>,
        scope: &'a ContextScope,
    ) -> Self {
        Self {
            rt,
            id,
            name,
            hooks,
            cursor: 0,
            scope,
            reads: SmallVec::new(),
            effects: Vec::new(),
        }
    }

    /// Timer host of the runtime this instance is mounted in.
    pub fn timers(&self) -> Timers {
        self.rt.timers.clone()
    }

    fn next_slot(&mut self) -> usize {
        let slot = self.cursor;
        self.cursor += 1;
        slot
    }

    /// State cell at this hook position; `init` runs on first mount only.
    pub fn use_state<T: 'static>(&mut self, init: impl FnOnce() -> T) -> State<T> {
        let slot = self.next_slot();
        let existing = match self.hooks.get(slot) {
            Some(HookSlot::State(any)) => any.clone().downcast::<RefCell<T>>().ok(),
            _ => None,
        };
        let cell = match existing {
            Some(cell) => cell,
            None => {
                let cell = Rc::new(RefCell::new(init()));
                self.install(slot, HookSlot::State(cell.clone()));
                cell
            }
        };
        State::new(cell, self.id, Rc::downgrade(self.rt))
    }

    /// Runs `effect` after commit when `deps` differs from the value seen at
    /// the previous commit (always on mount). The returned cleanup runs
    /// before the next run and on unmount. Pass `()` to run once on mount.
    pub fn use_effect<D, F>(&mut self, deps: D, effect: F)
    where
        D: PartialEq + Clone + 'static,
        F: FnOnce() -> Dispose + 'static,
    {
        let slot = self.next_slot();
        let changed = match self.hooks.get(slot) {
            Some(HookSlot::Effect(record)) => record.changed(&deps),
            _ => {
                self.install(slot, HookSlot::Effect(EffectSlot::default()));
                true
            }
        };
        if changed {
            self.effects.push(PendingEffect {
                instance: self.id,
                slot,
                deps: Box::new(deps),
                run: Box::new(effect),
            });
        }
    }

    /// Value of the nearest enclosing provider of `ctx`, subscribing this
    /// instance to it. Without a provider the context's default is returned,
    /// or [`Error::MissingProvider`] when it has none.
    pub fn use_context<T: Clone + PartialEq + 'static>(&mut self, ctx: &Context<T>) -> Result<T> {
        if let Some(cell) = self.scope.lookup(ctx.id())
            && let Some(v) = cell.read::<T>()
        {
            if !self.reads.iter().any(|c| Rc::ptr_eq(c, &cell)) {
                self.reads.push(cell);
            }
            return Ok(v);
        }
        ctx.fallback().ok_or(Error::MissingProvider {
            context: ctx.name(),
        })
    }

    pub(crate) fn finish(self) -> (SmallVec<[Rc<ProviderCell>; 2]>, Vec<PendingEffect>) {
        (self.reads, self.effects)
    }

    fn install(&mut self, slot: usize, hook: HookSlot) {
        if slot < self.hooks.len() {
            log::warn!(
                "{}: hook slot {} changed kind (was {}); reinitialising. \
                 Hooks must be called in the same order on every render.",
                self.name,
                slot,
                self.hooks[slot].kind()
            );
            self.hooks[slot] = hook;
        } else {
            self.hooks.push(hook);
        }
    }
}
