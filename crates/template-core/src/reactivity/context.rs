//! The dependency graph engine: `targetMap`, the activation stack, the
//! `shouldTrack`/`LOCKED` gates, and `track`/`trigger`/effect scheduling.
//!
//! No teacher file does anything like this (`tag_processor.rs` has no
//! notion of observers); grounded in general idiomatic Rust ownership
//! patterns per the design notes — an `Rc<RefCell<_>>`-backed context
//! standing in for the source's two-way JS `Set`s (§9 "Cyclic references").

use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::rc::Rc;

pub type TargetId = usize;
pub type EffectId = usize;
pub type DepId = usize;

/// A dependency key: a named field, an array index, the array-like
/// `length`, or the iteration key used for `for..in`/`for..of`-shaped reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Named(String),
    Index(usize),
    Length,
    Iterate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Get,
    Has,
    Iterate,
    Set,
    Add,
    Delete,
    Clear,
}

#[derive(Default)]
struct Dep {
    /// Insertion-ordered membership, mirroring a JS `Set`'s iteration order;
    /// dep sets stay small in practice so linear scans are cheap.
    effects: Vec<EffectId>,
}

impl Dep {
    fn contains(&self, id: EffectId) -> bool {
        self.effects.contains(&id)
    }

    fn insert(&mut self, id: EffectId) {
        if !self.contains(id) {
            self.effects.push(id);
        }
    }

    fn remove(&mut self, id: EffectId) {
        self.effects.retain(|&e| e != id);
    }
}

pub(super) struct EffectSlot {
    pub(super) run: Option<Box<dyn FnMut()>>,
    pub(super) scheduler: Option<Box<dyn FnMut()>>,
    pub(super) on_stop: Option<Box<dyn FnMut()>>,
    pub(super) deps: Vec<DepId>,
    pub(super) active: bool,
    pub(super) is_computed: bool,
}

#[derive(Default)]
struct ContextInner {
    effects: Vec<Option<EffectSlot>>,
    deps: Vec<Option<Dep>>,
    target_map: FxHashMap<TargetId, FxHashMap<Key, DepId>>,
    activation_stack: Vec<EffectId>,
    should_track: bool,
    locked: bool,
    next_target_id: TargetId,
    non_reactive: FxHashSet<TargetId>,
}

impl ContextInner {
    fn new() -> Self {
        Self {
            should_track: true,
            ..Default::default()
        }
    }
}

/// A cheap-to-clone handle onto the reactivity graph. Every `Ref`/container/
/// effect holds one; cloning shares the same underlying graph, so tests can
/// build an independent context instead of using the process-wide default
/// (see [`ReactivityContext::global`]).
#[derive(Clone)]
pub struct ReactivityContext(Rc<RefCell<ContextInner>>);

impl Default for ReactivityContext {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(ContextInner::new())))
    }
}

thread_local! {
    static GLOBAL: ReactivityContext = ReactivityContext::default();
}

impl ReactivityContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single process-wide default context, per the design notes'
    /// "keep a single default context for ergonomics" guidance.
    pub fn global() -> Self {
        GLOBAL.with(|ctx| ctx.clone())
    }

    pub fn new_target_id(&self) -> TargetId {
        let mut inner = self.0.borrow_mut();
        let id = inner.next_target_id;
        inner.next_target_id += 1;
        id
    }

    pub fn lock(&self) {
        self.0.borrow_mut().locked = true;
    }

    pub fn unlock(&self) {
        self.0.borrow_mut().locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.0.borrow().locked
    }

    pub fn pause_tracking(&self) {
        self.0.borrow_mut().should_track = false;
    }

    pub fn resume_tracking(&self) {
        self.0.borrow_mut().should_track = true;
    }

    pub fn mark_non_reactive(&self, target: TargetId) {
        self.0.borrow_mut().non_reactive.insert(target);
    }

    pub fn is_marked_non_reactive(&self, target: TargetId) -> bool {
        self.0.borrow().non_reactive.contains(&target)
    }

    /// Registers a new effect and returns its id. Does not run it; callers
    /// (`effect()`) decide whether to invoke eagerly.
    pub(super) fn register_effect(&self, slot: EffectSlot) -> EffectId {
        let mut inner = self.0.borrow_mut();
        inner.effects.push(Some(slot));
        inner.effects.len() - 1
    }

    fn get_or_create_dep(&self, target: TargetId, key: &Key) -> DepId {
        let mut inner = self.0.borrow_mut();
        if let Some(&dep_id) = inner.target_map.get(&target).and_then(|m| m.get(key)) {
            return dep_id;
        }
        let dep_id = inner.deps.len();
        inner.deps.push(Some(Dep::default()));
        inner
            .target_map
            .entry(target)
            .or_default()
            .insert(key.clone(), dep_id);
        dep_id
    }

    /// Subscribes the currently active effect (if any) to `(target, key)`.
    /// No-op if tracking is paused or no effect is active.
    pub fn track(&self, target: TargetId, _op: OpType, key: Key) {
        let active_id = {
            let inner = self.0.borrow();
            if !inner.should_track {
                return;
            }
            match inner.activation_stack.last().copied() {
                Some(id) => id,
                None => return,
            }
        };
        let dep_id = self.get_or_create_dep(target, &key);
        let mut inner = self.0.borrow_mut();
        let already = inner.deps[dep_id].as_ref().unwrap().contains(active_id);
        if !already {
            inner.deps[dep_id].as_mut().unwrap().insert(active_id);
            if let Some(slot) = inner.effects.get_mut(active_id).and_then(|s| s.as_mut()) {
                slot.deps.push(dep_id);
            }
        }
    }

    /// Re-runs (or schedules) every effect depending on `(target, key)`,
    /// plus `length`/iterate-key subscribers on `Add`/`Delete`, or every
    /// dep of `target` on `Clear`. Computed effects run before normal ones.
    pub fn trigger(&self, target: TargetId, op: OpType, key: Key) {
        tracing::trace!(target_id = target, ?op, ?key, "trigger");
        let ordered = {
            let inner = self.0.borrow();
            let mut dep_ids = Vec::new();
            if op == OpType::Clear {
                if let Some(keys) = inner.target_map.get(&target) {
                    dep_ids.extend(keys.values().copied());
                }
            } else {
                if let Some(keys) = inner.target_map.get(&target) {
                    if let Some(&d) = keys.get(&key) {
                        dep_ids.push(d);
                    }
                    if matches!(op, OpType::Add | OpType::Delete) {
                        if let Some(&d) = keys.get(&Key::Length) {
                            dep_ids.push(d);
                        }
                        if let Some(&d) = keys.get(&Key::Iterate) {
                            dep_ids.push(d);
                        }
                    }
                }
            }
            let mut seen = FxHashSet::default();
            let mut ordered = Vec::new();
            for dep_id in dep_ids {
                if let Some(Some(dep)) = inner.deps.get(dep_id) {
                    for &effect_id in &dep.effects {
                        if seen.insert(effect_id) {
                            ordered.push(effect_id);
                        }
                    }
                }
            }
            ordered
        };

        let (computed, normal): (Vec<EffectId>, Vec<EffectId>) = {
            let inner = self.0.borrow();
            ordered.into_iter().partition(|id| {
                inner.effects[*id]
                    .as_ref()
                    .is_some_and(|slot| slot.is_computed)
            })
        };

        for id in computed.into_iter().chain(normal) {
            self.schedule_run(id);
        }
    }

    fn schedule_run(&self, id: EffectId) {
        let taken = {
            let mut inner = self.0.borrow_mut();
            inner
                .effects
                .get_mut(id)
                .and_then(|s| s.as_mut())
                .and_then(|slot| slot.scheduler.take())
        };
        match taken {
            Some(mut scheduler) => {
                tracing::trace!(effect_id = id, "running custom scheduler");
                scheduler();
                let mut inner = self.0.borrow_mut();
                if let Some(slot) = inner.effects.get_mut(id).and_then(|s| s.as_mut()) {
                    slot.scheduler = Some(scheduler);
                }
            }
            None => {
                tracing::trace!(effect_id = id, "re-running effect directly");
                self.run_effect(id);
            }
        }
    }

    /// Runs an effect's raw function under the activation-stack/cleanup
    /// machinery described in spec §4.6. Returns whether it actually ran
    /// (it's skipped if already on the activation stack).
    pub fn run_effect(&self, id: EffectId) -> bool {
        let raw_fn = {
            let mut inner = self.0.borrow_mut();
            let Some(slot) = inner.effects.get_mut(id).and_then(|s| s.as_mut()) else {
                return false;
            };
            if !slot.active {
                slot.run.take()
            } else if inner.activation_stack.contains(&id) {
                return false;
            } else {
                for dep_id in std::mem::take(&mut slot.deps) {
                    if let Some(dep) = inner.deps.get_mut(dep_id).and_then(|d| d.as_mut()) {
                        dep.remove(id);
                    }
                }
                inner.activation_stack.push(id);
                inner
                    .effects
                    .get_mut(id)
                    .and_then(|s| s.as_mut())
                    .and_then(|slot| slot.run.take())
            }
        };
        let Some(mut f) = raw_fn else { return false };
        f();
        let mut inner = self.0.borrow_mut();
        if let Some(slot) = inner.effects.get_mut(id).and_then(|s| s.as_mut()) {
            slot.run = Some(f);
        }
        if inner.activation_stack.last() == Some(&id) {
            inner.activation_stack.pop();
        }
        true
    }

    /// Removes the effect from every Dep it belongs to, calls `onStop`, and
    /// marks it inactive. Idempotent.
    pub fn stop_effect(&self, id: EffectId) {
        let on_stop = {
            let mut inner = self.0.borrow_mut();
            let Some(slot) = inner.effects.get_mut(id).and_then(|s| s.as_mut()) else {
                return;
            };
            if !slot.active {
                return;
            }
            for dep_id in std::mem::take(&mut slot.deps) {
                if let Some(dep) = inner.deps.get_mut(dep_id).and_then(|d| d.as_mut()) {
                    dep.remove(id);
                }
            }
            slot.active = false;
            slot.on_stop.take()
        };
        if let Some(mut cb) = on_stop {
            cb();
        }
    }

    pub fn is_effect_active(&self, id: EffectId) -> bool {
        self.0
            .borrow()
            .effects
            .get(id)
            .and_then(|s| s.as_ref())
            .is_some_and(|s| s.active)
    }

    pub fn set_scheduler(&self, id: EffectId, scheduler: Box<dyn FnMut()>) {
        let mut inner = self.0.borrow_mut();
        if let Some(slot) = inner.effects.get_mut(id).and_then(|s| s.as_mut()) {
            slot.scheduler = Some(scheduler);
        }
    }

    /// The Dep ids a given effect currently belongs to, used by `computed`
    /// to propagate its own dependencies onto whichever parent effect reads
    /// it (spec §4.7 "child-run tracking").
    pub(super) fn effect_deps(&self, id: EffectId) -> Vec<DepId> {
        self.0
            .borrow()
            .effects
            .get(id)
            .and_then(|s| s.as_ref())
            .map(|s| s.deps.clone())
            .unwrap_or_default()
    }

    /// Subscribes the currently active effect to each given Dep directly,
    /// without a `(target, key)` lookup. Used to make a parent effect
    /// transitively depend on everything a `computed` it reads depends on.
    pub(super) fn link_deps_to_active_effect(&self, dep_ids: &[DepId]) {
        let mut inner = self.0.borrow_mut();
        if !inner.should_track {
            return;
        }
        let Some(active_id) = inner.activation_stack.last().copied() else {
            return;
        };
        for &dep_id in dep_ids {
            let already = inner.deps[dep_id]
                .as_ref()
                .is_some_and(|d| d.contains(active_id));
            if !already {
                inner.deps[dep_id].as_mut().unwrap().insert(active_id);
                if let Some(slot) = inner.effects.get_mut(active_id).and_then(|s| s.as_mut()) {
                    slot.deps.push(dep_id);
                }
            }
        }
    }
}
