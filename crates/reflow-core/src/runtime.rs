use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::config::RuntimeConfig;
use crate::context::{ContextId, ContextScope, ProviderCell};
use crate::effects::{Dispose, EffectSlot, PendingEffect};
use crate::hooks::Cx;
use crate::state::HookSlot;
use crate::timer::Timers;
use crate::view::{ComponentNode, Frame, ProviderNode, RenderFn, View, ViewKind};
use crate::{Error, Result};

new_key_type! { pub struct InstanceId; }

/// Receives every committed frame. The display surface and its input
/// plumbing live behind this trait.
pub trait HostSurface {
    fn commit(&mut self, frame: &Frame);
}

impl<F: FnMut(&Frame)> HostSurface for F {
    fn commit(&mut self, frame: &Frame) {
        self(frame)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Slot {
    Keyed(String),
    Nth(usize),
}

/// How a child is recognised between two renders of its parent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MatchKey {
    type_id: TypeId,
    context: Option<ContextId>,
    slot: Slot,
}

enum Body {
    Component {
        render: Rc<RenderFn>,
        hooks: Vec<HookSlot>,
    },
    Provider {
        cell: Rc<ProviderCell>,
        children: Vec<View>,
    },
}

struct Instance {
    name: &'static str,
    match_key: MatchKey,
    depth: usize,
    /// Queued for re-render on the next drain.
    dirty: bool,
    body: Body,
    /// Providers visible to this instance.
    scope: ContextScope,
    /// Last render output; child instances appear as `ViewKind::Mounted`.
    output: Option<View>,
    children: Vec<InstanceId>,
    subscriptions: SmallVec<[Rc<ProviderCell>; 2]>,
}

impl Instance {
    fn effect_slot(&mut self, slot: usize) -> Option<&mut EffectSlot> {
        match &mut self.body {
            Body::Component { hooks, .. } => match hooks.get_mut(slot) {
                Some(HookSlot::Effect(rec)) => Some(rec),
                _ => None,
            },
            Body::Provider { .. } => None,
        }
    }
}

enum InstanceNode {
    Component(ComponentNode),
    Provider(ProviderNode, Vec<View>),
}

enum Work {
    Component(Rc<RenderFn>, Vec<HookSlot>),
    Provider(Rc<ProviderCell>, Vec<View>),
}

/// Everything one drain changed, so a failed drain can be rolled back and a
/// successful one settled.
#[derive(Default)]
struct Pass {
    /// Instances that rendered successfully, in render order.
    rendered: Vec<InstanceId>,
    created: Vec<InstanceId>,
    /// Children dropped by a successful render; still in the arena.
    dropped: Vec<InstanceId>,
    /// Dirty instances under `dropped` whose flag was cleared.
    parked: Vec<InstanceId>,
    effects: Vec<PendingEffect>,
    /// Output and children of each rendered instance before its first render
    /// in this drain.
    undo: Vec<(InstanceId, Option<View>, Vec<InstanceId>)>,
}

pub(crate) struct RuntimeInner {
    config: RuntimeConfig,
    instances: RefCell<SlotMap<InstanceId, Instance>>,
    queue: RefCell<Vec<InstanceId>>,
    effects: RefCell<Vec<PendingEffect>>,
    /// Cleanups of instances unmounted since the last commit.
    detached: RefCell<Vec<Dispose>>,
    pass: RefCell<Pass>,
    pub(crate) timers: Timers,
    renders: Cell<u64>,
}

impl RuntimeInner {
    fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            instances: RefCell::new(SlotMap::with_key()),
            queue: RefCell::new(Vec::new()),
            effects: RefCell::new(Vec::new()),
            detached: RefCell::new(Vec::new()),
            pass: RefCell::new(Pass::default()),
            timers: Timers::new(),
            renders: Cell::new(0),
        }
    }

    /// Marks `id` dirty. Returns false when the instance no longer exists.
    pub(crate) fn schedule(&self, id: InstanceId) -> bool {
        let mut instances = self.instances.borrow_mut();
        let Some(inst) = instances.get_mut(id) else {
            return false;
        };
        if !inst.dirty {
            inst.dirty = true;
            self.queue.borrow_mut().push(id);
        }
        true
    }

    fn has_work(&self) -> bool {
        !self.queue.borrow().is_empty()
            || !self.effects.borrow().is_empty()
            || !self.detached.borrow().is_empty()
    }

    fn create(
        &self,
        node: InstanceNode,
        match_key: MatchKey,
        depth: usize,
        scope: ContextScope,
    ) -> InstanceId {
        let (name, body) = match node {
            InstanceNode::Component(c) => (
                c.name,
                Body::Component {
                    render: c.render,
                    hooks: Vec::new(),
                },
            ),
            InstanceNode::Provider(p, children) => (
                p.name,
                Body::Provider {
                    cell: Rc::new(ProviderCell::new(p.context, p.value)),
                    children,
                },
            ),
        };
        let id = self.instances.borrow_mut().insert(Instance {
            name,
            match_key,
            depth,
            dirty: true,
            body,
            scope,
            output: None,
            children: Vec::new(),
            subscriptions: SmallVec::new(),
        });
        self.pass.borrow_mut().created.push(id);
        log::debug!("mounted {id:?} at depth {depth}");
        id
    }

    /// Applies a parent's fresh description to an existing instance. Returns
    /// whether the instance has to render.
    fn update(&self, id: InstanceId, node: InstanceNode) -> bool {
        match node {
            InstanceNode::Component(c) => {
                let mut instances = self.instances.borrow_mut();
                let Some(inst) = instances.get_mut(id) else {
                    return false;
                };
                let dirty = inst.dirty;
                match &mut inst.body {
                    Body::Component { render, .. } if Rc::ptr_eq(render, &c.render) => dirty,
                    Body::Component { render, .. } => {
                        *render = c.render;
                        true
                    }
                    Body::Provider { .. } => dirty,
                }
            }
            InstanceNode::Provider(p, next_children) => {
                let cell = {
                    let mut instances = self.instances.borrow_mut();
                    let Some(inst) = instances.get_mut(id) else {
                        return false;
                    };
                    match &mut inst.body {
                        Body::Provider { cell, children } => {
                            *children = next_children;
                            cell.clone()
                        }
                        Body::Component { .. } => return false,
                    }
                };
                if let Some(subscribers) = cell.replace(&p) {
                    log::debug!(
                        "context `{}` changed; notifying {} consumer(s)",
                        p.name,
                        subscribers.len()
                    );
                    for s in subscribers {
                        self.schedule(s);
                    }
                }
                true
            }
        }
    }

    fn render_instance(self: &Rc<Self>, id: InstanceId) -> Result<()> {
        let (name, depth, scope, work) = {
            let mut instances = self.instances.borrow_mut();
            let Some(inst) = instances.get_mut(id) else {
                return Ok(());
            };
            inst.dirty = false;
            let work = match &mut inst.body {
                Body::Component { render, hooks } => {
                    Work::Component(render.clone(), std::mem::take(hooks))
                }
                Body::Provider { cell, children } => Work::Provider(cell.clone(), children.clone()),
            };
            (inst.name, inst.depth, inst.scope.clone(), work)
        };

        let (mut output, child_scope) = match work {
            Work::Component(render, mut hooks) => {
                let mut cx = Cx::new(self, id, name, &mut hooks, &scope);
                let result = render(&mut cx);
                let (reads, effects) = cx.finish();
                self.renders.set(self.renders.get() + 1);

                if let Some(inst) = self.instances.borrow_mut().get_mut(id)
                    && let Body::Component { hooks: slot, .. } = &mut inst.body
                {
                    *slot = hooks;
                }

                let view = match result {
                    Ok(view) => view,
                    Err(err) => {
                        log::debug!("{name} ({id:?}) failed to render: {err}");
                        self.schedule(id);
                        return Err(err);
                    }
                };
                self.resubscribe(id, reads);
                self.pass.borrow_mut().effects.extend(effects);
                (view, scope)
            }
            Work::Provider(cell, children) => (View::fragment(children), scope.with(cell)),
        };

        let old_children = self
            .instances
            .borrow()
            .get(id)
            .map(|i| i.children.clone())
            .unwrap_or_default();
        let mut reconcile = Reconcile::new(self, depth + 1, child_scope, &old_children);
        if let Err(err) = reconcile.visit(&mut output) {
            self.schedule(id);
            return Err(err);
        }
        let kept = reconcile.kept;

        for old in &old_children {
            if !kept.contains(old) {
                self.park(*old);
                self.pass.borrow_mut().dropped.push(*old);
            }
        }

        let previous = self.instances.borrow_mut().get_mut(id).map(|inst| {
            (
                inst.output.replace(output),
                std::mem::replace(&mut inst.children, kept),
            )
        });
        let mut tx = self.pass.borrow_mut();
        if let Some((output, children)) = previous
            && !tx.rendered.contains(&id)
        {
            tx.undo.push((id, output, children));
        }
        tx.rendered.push(id);
        Ok(())
    }

    /// Clears the dirty flags under a dropped child so the rest of the drain
    /// does not render it.
    fn park(&self, id: InstanceId) {
        let children = {
            let mut instances = self.instances.borrow_mut();
            let Some(inst) = instances.get_mut(id) else {
                return;
            };
            if inst.dirty {
                inst.dirty = false;
                self.pass.borrow_mut().parked.push(id);
            }
            inst.children.clone()
        };
        for child in children {
            self.park(child);
        }
    }

    /// Applies a successful drain: dropped children unmount and the effects
    /// of the pass are queued for after the commit.
    fn settle(&self) {
        let pass = std::mem::take(&mut *self.pass.borrow_mut());
        for id in pass.dropped {
            self.detach(id);
        }
        self.effects.borrow_mut().extend(pass.effects);
    }

    /// Rolls back a failed drain. Outputs and children revert to what the
    /// committed frame shows, instances mounted by the pass go away, its
    /// effects are dropped and everything that rendered is dirty again.
    fn abort(&self) {
        let pass = std::mem::take(&mut *self.pass.borrow_mut());
        {
            let mut instances = self.instances.borrow_mut();
            for (id, output, children) in pass.undo.into_iter().rev() {
                if let Some(inst) = instances.get_mut(id) {
                    inst.output = output;
                    inst.children = children;
                }
            }
        }
        for id in pass.created.into_iter().rev() {
            self.detach(id);
        }
        if !pass.effects.is_empty() {
            log::debug!("dropping {} effect(s) of the failed pass", pass.effects.len());
        }
        for id in pass.rendered.into_iter().chain(pass.parked) {
            self.schedule(id);
        }
    }

    fn resubscribe(&self, id: InstanceId, reads: SmallVec<[Rc<ProviderCell>; 2]>) {
        let old = {
            let mut instances = self.instances.borrow_mut();
            let Some(inst) = instances.get_mut(id) else {
                return;
            };
            std::mem::replace(&mut inst.subscriptions, reads.clone())
        };
        for cell in &old {
            if !reads.iter().any(|r| Rc::ptr_eq(r, cell)) {
                cell.unsubscribe(id);
            }
        }
        for cell in &reads {
            cell.subscribe(id);
        }
    }

    /// Removes `id` and its subtree, queueing their cleanups (children
    /// before parents, each instance's effects in reverse order).
    fn detach(&self, id: InstanceId) {
        let Some(inst) = self.instances.borrow_mut().remove(id) else {
            return;
        };
        for child in &inst.children {
            self.detach(*child);
        }
        for cell in &inst.subscriptions {
            cell.unsubscribe(id);
        }
        if let Body::Component { hooks, .. } = inst.body {
            let mut detached = self.detached.borrow_mut();
            for hook in hooks.into_iter().rev() {
                if let HookSlot::Effect(EffectSlot {
                    cleanup: Some(d), ..
                }) = hook
                {
                    detached.push(d);
                }
            }
        }
        log::debug!("unmounted {} ({id:?})", inst.name);
    }

    fn run_detached(&self) {
        let cleanups = std::mem::take(&mut *self.detached.borrow_mut());
        for d in cleanups {
            d.run();
        }
    }

    /// Renders dirty instances, shallowest first, until none are left. A
    /// failure rolls the whole drain back.
    fn drain(self: &Rc<Self>) -> Result<bool> {
        *self.pass.borrow_mut() = Pass::default();
        match self.render_dirty() {
            Ok(rendered) => {
                self.settle();
                Ok(rendered)
            }
            Err(err) => {
                self.abort();
                Err(err)
            }
        }
    }

    fn render_dirty(self: &Rc<Self>) -> Result<bool> {
        let mut rendered = false;
        let mut counts: HashMap<InstanceId, usize> = HashMap::new();
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                let instances = self.instances.borrow();
                queue.retain(|id| {
                    instances
                        .get(*id)
                        .is_some_and(|i| i.dirty)
                });
                let pick = queue
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, id)| instances[**id].depth)
                    .map(|(i, _)| i);
                pick.map(|i| queue.remove(i))
            };
            let Some(id) = next else {
                break;
            };

            let count = counts.entry(id).or_default();
            *count += 1;
            if *count > self.config.max_render_passes {
                return Err(Error::RenderLoop {
                    passes: self.config.max_render_passes,
                });
            }

            self.render_instance(id)?;
            rendered = true;
        }
        Ok(rendered)
    }

    fn run_effects(&self) {
        let pending = std::mem::take(&mut *self.effects.borrow_mut());
        for effect in pending {
            let previous = {
                let mut instances = self.instances.borrow_mut();
                let Some(rec) = instances
                    .get_mut(effect.instance)
                    .and_then(|i| i.effect_slot(effect.slot))
                else {
                    continue;
                };
                rec.cleanup.take()
            };
            if let Some(d) = previous {
                d.run();
            }

            let cleanup = (effect.run)();

            let orphaned = {
                let mut instances = self.instances.borrow_mut();
                match instances
                    .get_mut(effect.instance)
                    .and_then(|i| i.effect_slot(effect.slot))
                {
                    Some(rec) => {
                        rec.deps = Some(effect.deps);
                        rec.cleanup = Some(cleanup);
                        None
                    }
                    None => Some(cleanup),
                }
            };
            // Unmounted by its own effect.
            if let Some(cleanup) = orphaned {
                cleanup.run();
            }
        }
    }

    fn resolve(&self, id: InstanceId, out: &mut Vec<View>) {
        let output = self.instances.borrow().get(id).and_then(|i| i.output.clone());
        if let Some(view) = output {
            self.expand(view, out);
        }
    }

    fn expand(&self, view: View, out: &mut Vec<View>) {
        match view.kind {
            ViewKind::Mounted(child) => self.resolve(child, out),
            ViewKind::Fragment => {
                for c in view.children {
                    self.expand(c, out);
                }
            }
            _ => {
                let View {
                    kind,
                    key,
                    tag,
                    children,
                } = view;
                let mut kids = Vec::with_capacity(children.len());
                for c in children {
                    self.expand(c, &mut kids);
                }
                out.push(View {
                    kind,
                    key,
                    tag,
                    children: kids,
                });
            }
        }
    }
}

/// Matches one render output against the previous children of an instance.
struct Reconcile<'r> {
    rt: &'r Rc<RuntimeInner>,
    depth: usize,
    scope: ContextScope,
    old: HashMap<MatchKey, InstanceId>,
    ordinals: HashMap<(TypeId, Option<ContextId>), usize>,
    kept: Vec<InstanceId>,
}

impl<'r> Reconcile<'r> {
    fn new(
        rt: &'r Rc<RuntimeInner>,
        depth: usize,
        scope: ContextScope,
        old_children: &[InstanceId],
    ) -> Self {
        let instances = rt.instances.borrow();
        let old = old_children
            .iter()
            .filter_map(|id| instances.get(*id).map(|i| (i.match_key.clone(), *id)))
            .collect();
        Self {
            rt,
            depth,
            scope,
            old,
            ordinals: HashMap::new(),
            kept: Vec::new(),
        }
    }

    fn visit(&mut self, view: &mut View) -> Result<()> {
        if !view.is_instance() {
            for c in view.children.iter_mut() {
                self.visit(c)?;
            }
            return Ok(());
        }
        let View {
            kind,
            key,
            children,
            ..
        } = std::mem::replace(view, View::new(ViewKind::Fragment));
        let node = match kind {
            ViewKind::Component(c) => InstanceNode::Component(c),
            ViewKind::Provider(p) => InstanceNode::Provider(p, children),
            _ => return Ok(()),
        };
        let child = self.place(node, key)?;
        *view = View::new(ViewKind::Mounted(child));
        Ok(())
    }

    fn place(&mut self, node: InstanceNode, key: Option<String>) -> Result<InstanceId> {
        let (type_id, context) = match &node {
            InstanceNode::Component(c) => (c.type_id, None),
            InstanceNode::Provider(p, _) => (p.type_id, Some(p.context)),
        };
        let slot = match key {
            Some(k) => Slot::Keyed(k),
            None => {
                let n = self.ordinals.entry((type_id, context)).or_default();
                *n += 1;
                Slot::Nth(*n - 1)
            }
        };
        let match_key = MatchKey {
            type_id,
            context,
            slot,
        };

        let id = match self.old.remove(&match_key) {
            Some(existing) => {
                self.kept.push(existing);
                if !self.rt.update(existing, node) {
                    return Ok(existing);
                }
                existing
            }
            None => {
                if self.kept.iter().any(|k| {
                    self.rt
                        .instances
                        .borrow()
                        .get(*k)
                        .is_some_and(|i| i.match_key == match_key)
                }) {
                    log::warn!("duplicate key {:?} among siblings; mounting a new instance", match_key.slot);
                }
                let id = self
                    .rt
                    .create(node, match_key, self.depth, self.scope.clone());
                self.kept.push(id);
                id
            }
        };
        self.rt.render_instance(id)?;
        Ok(id)
    }
}

/// A mounted component tree attached to a host surface.
///
/// ```rust
/// use reflow_core::*;
///
/// let counter = component("Counter", |cx| {
///     let n = cx.use_state(|| 0);
///     let bump = n.clone();
///     Ok(View::new(ViewKind::Button {
///         text: format!("n = {}", n.get()),
///         on_click: Some(std::rc::Rc::new(move || bump.update(|v| *v += 1))),
///     })
///     .tag("bump"))
/// });
///
/// let mut root = Root::mount(RuntimeConfig::default(), |_: &Frame| {}, counter).unwrap();
/// root.click("bump").unwrap();
/// assert!(root.frame().unwrap().root.contains_text("n = 1"));
/// ```
pub struct Root {
    rt: Rc<RuntimeInner>,
    root: Option<InstanceId>,
    surface: Box<dyn HostSurface>,
    frame: Option<Frame>,
    generation: u64,
}

impl Root {
    /// Renders `view`, commits the first frame to `surface` and runs mount
    /// effects.
    pub fn mount(
        config: RuntimeConfig,
        surface: impl HostSurface + 'static,
        view: View,
    ) -> Result<Self> {
        let rt = Rc::new(RuntimeInner::new(config));
        let root_node = ComponentNode::new("Root", move |_cx| Ok(view.clone()));
        let id = rt.create(
            InstanceNode::Component(root_node),
            MatchKey {
                type_id: TypeId::of::<Root>(),
                context: None,
                slot: Slot::Nth(0),
            },
            0,
            ContextScope::default(),
        );
        rt.queue.borrow_mut().push(id);

        let mut root = Root {
            rt,
            root: Some(id),
            surface: Box::new(surface),
            frame: None,
            generation: 0,
        };
        log::info!("mounting root");
        if let Err(err) = root.flush() {
            log::error!("initial render failed: {err}");
            root.unmount();
            return Err(err);
        }
        Ok(root)
    }

    /// Drains pending updates: render, commit, then effects, repeating while
    /// effects keep scheduling work. Returns whether a frame was committed.
    pub fn flush(&mut self) -> Result<bool> {
        let Some(root) = self.root else {
            return Err(Error::Unmounted);
        };
        let max = self.rt.config.max_render_passes;
        let mut passes = 0;
        let mut committed = false;
        while self.rt.has_work() {
            passes += 1;
            if passes > max {
                log::error!("giving up after {max} render passes");
                return Err(Error::RenderLoop { passes: max });
            }
            let rendered = match self.rt.drain() {
                Ok(rendered) => rendered,
                Err(err) => {
                    self.rt.run_detached();
                    log::error!("render pass failed: {err}");
                    return Err(err);
                }
            };
            if rendered {
                self.commit(root);
                committed = true;
            }
            self.rt.run_detached();
            self.rt.run_effects();
        }
        Ok(committed)
    }

    fn commit(&mut self, root: InstanceId) {
        let mut nodes = Vec::new();
        self.rt.resolve(root, &mut nodes);
        let view = if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            View::fragment(nodes)
        };
        self.generation += 1;
        let frame = Frame {
            root: view,
            generation: self.generation,
        };
        log::debug!("commit #{}", frame.generation);
        self.surface.commit(&frame);
        self.frame = Some(frame);
    }

    /// Runs one logical event, then flushes once. Updates made inside
    /// `event` render together.
    pub fn dispatch<R>(&mut self, event: impl FnOnce() -> R) -> Result<R> {
        if self.root.is_none() {
            return Err(Error::Unmounted);
        }
        let out = event();
        self.flush()?;
        Ok(out)
    }

    /// Presses the button tagged (or labelled) `label` in the current frame.
    pub fn click(&mut self, label: &str) -> Result<()> {
        let handler = {
            let frame = self.frame.as_ref().ok_or(Error::Unmounted)?;
            let button = frame.button(label).ok_or_else(|| Error::NoSuchTarget {
                label: label.to_string(),
            })?;
            match &button.kind {
                ViewKind::Button { on_click, .. } => on_click.clone(),
                _ => None,
            }
        };
        match handler {
            Some(h) => self.dispatch(|| h()),
            None => Ok(()),
        }
    }

    /// Advances the simulated clock, firing due timers one event at a time.
    /// Returns the number of callbacks fired.
    pub fn advance(&mut self, by: Duration) -> Result<usize> {
        if self.root.is_none() {
            return Err(Error::Unmounted);
        }
        let target = self.rt.timers.now() + by;
        let mut fired = 0;
        while let Some(callback) = self.rt.timers.pop_due(target) {
            callback.run();
            fired += 1;
            self.flush()?;
        }
        self.rt.timers.set_now(target);
        Ok(fired)
    }

    /// Tears the tree down, running every outstanding cleanup.
    pub fn unmount(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        log::info!("unmounting root");
        self.rt.detach(root);
        self.rt.run_detached();
        self.rt.effects.borrow_mut().clear();
        self.rt.queue.borrow_mut().clear();
        self.rt.timers.clear();
        self.generation += 1;
        let frame = Frame {
            root: View::fragment(vec![]),
            generation: self.generation,
        };
        self.surface.commit(&frame);
        self.frame = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn timers(&self) -> Timers {
        self.rt.timers.clone()
    }

    pub fn now(&self) -> Duration {
        self.rt.timers.now()
    }

    /// Total component renders since mount.
    pub fn render_count(&self) -> u64 {
        self.rt.renders.get()
    }

    pub fn instance_count(&self) -> usize {
        self.rt.instances.borrow().len()
    }
}

impl Drop for Root {
    fn drop(&mut self) {
        self.unmount();
    }
}
