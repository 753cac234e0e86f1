//! Concrete reactive containers. The source observes arbitrary JS object
//! literals and arrays; Rust has no dynamic object literal, so a
//! string-keyed [`ReactiveMap`] stands in for "object" and [`ReactiveVec`]
//! for "array" (spec §9, "Dynamic dispatch over containers").
//!
//! `make_reactive`/`make_readonly` are idempotent here for free: a container
//! is always handed back wrapped in `Rc`, so re-wrapping an already-reactive
//! value is just `Rc::clone` rather than a raw/observed lookup table.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

use super::context::{Key, OpType, ReactivityContext, TargetId};

/// Facts a reactive container exposes about itself, standing in for the
/// source's `isReactive`/`isReadonly` runtime predicates — here they're
/// just facts about which wrapper type you're holding.
pub trait ReactiveContainer {
    fn target_id(&self) -> TargetId;

    fn is_reactive(&self) -> bool {
        true
    }

    fn is_readonly(&self) -> bool {
        false
    }
}

/// A string-keyed reactive map. Every read tracks its own `Key::Named`,
/// `contains_key` tracks via `Has`, and `len`/`keys` track `Length`/`Iterate`
/// so `for..in`-shaped consumers re-run on add/remove even when no existing
/// key's value changed.
pub struct ReactiveMap<V> {
    ctx: ReactivityContext,
    target: TargetId,
    data: RefCell<FxHashMap<String, V>>,
}

impl<V: Clone + 'static> ReactiveMap<V> {
    pub fn new(ctx: &ReactivityContext) -> Self {
        Self {
            ctx: ctx.clone(),
            target: ctx.new_target_id(),
            data: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.ctx
            .track(self.target, OpType::Get, Key::Named(key.to_string()));
        self.data.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.ctx
            .track(self.target, OpType::Has, Key::Named(key.to_string()));
        self.data.borrow().contains_key(key)
    }

    pub fn set(&self, key: String, value: V) {
        let existed = self.data.borrow().contains_key(&key);
        self.data.borrow_mut().insert(key.clone(), value);
        let op = if existed { OpType::Set } else { OpType::Add };
        self.ctx.trigger(self.target, op, Key::Named(key));
    }

    pub fn remove(&self, key: &str) -> bool {
        let removed = self.data.borrow_mut().remove(key).is_some();
        if removed {
            self.ctx
                .trigger(self.target, OpType::Delete, Key::Named(key.to_string()));
        }
        removed
    }

    pub fn clear(&self) {
        let had_entries = !self.data.borrow().is_empty();
        self.data.borrow_mut().clear();
        if had_entries {
            self.ctx.trigger(self.target, OpType::Clear, Key::Length);
        }
    }

    pub fn len(&self) -> usize {
        self.ctx.track(self.target, OpType::Iterate, Key::Length);
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        self.ctx.track(self.target, OpType::Iterate, Key::Iterate);
        self.data.borrow().keys().cloned().collect()
    }
}

impl<V> ReactiveContainer for ReactiveMap<V> {
    fn target_id(&self) -> TargetId {
        self.target
    }
}

/// An array-like reactive container, tracking `Key::Index` per element and
/// `Key::Length`/`Key::Iterate` the way the source's array instrumentation
/// does for `push`/`splice`/`for..of`.
pub struct ReactiveVec<T> {
    ctx: ReactivityContext,
    target: TargetId,
    data: RefCell<Vec<T>>,
}

impl<T: Clone + 'static> ReactiveVec<T> {
    pub fn new(ctx: &ReactivityContext) -> Self {
        Self {
            ctx: ctx.clone(),
            target: ctx.new_target_id(),
            data: RefCell::new(Vec::new()),
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.ctx.track(self.target, OpType::Get, Key::Index(index));
        self.data.borrow().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: T) {
        let in_bounds = index < self.data.borrow().len();
        if in_bounds {
            self.data.borrow_mut()[index] = value;
            self.ctx.trigger(self.target, OpType::Set, Key::Index(index));
        }
    }

    pub fn push(&self, value: T) {
        self.data.borrow_mut().push(value);
        let index = self.data.borrow().len() - 1;
        self.ctx.trigger(self.target, OpType::Add, Key::Index(index));
    }

    pub fn remove(&self, index: usize) -> Option<T> {
        let mut data = self.data.borrow_mut();
        if index >= data.len() {
            return None;
        }
        let removed = data.remove(index);
        drop(data);
        self.ctx.trigger(self.target, OpType::Delete, Key::Index(index));
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.ctx.track(self.target, OpType::Get, Key::Length);
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let had_entries = !self.data.borrow().is_empty();
        self.data.borrow_mut().clear();
        if had_entries {
            self.ctx.trigger(self.target, OpType::Clear, Key::Length);
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.ctx.track(self.target, OpType::Iterate, Key::Iterate);
        self.data.borrow().clone()
    }
}

impl<T> ReactiveContainer for ReactiveVec<T> {
    fn target_id(&self) -> TargetId {
        self.target
    }
}

/// A readonly view over a [`ReactiveMap`]. Reads delegate straight through
/// (and still track); mutation is allowed unless the context is
/// [`ReactivityContext::lock`]ed, matching the source's `LOCKED` gate, which
/// only ever rejects writes through a readonly proxy, never through the
/// original reactive handle.
pub struct ReadonlyMap<V> {
    ctx: ReactivityContext,
    inner: Rc<ReactiveMap<V>>,
}

impl<V: Clone + 'static> ReadonlyMap<V> {
    pub fn new(ctx: &ReactivityContext, inner: Rc<ReactiveMap<V>>) -> Self {
        Self {
            ctx: ctx.clone(),
            inner,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    pub fn set(&self, key: String, value: V) {
        if self.ctx.is_locked() {
            warn!(key = %key, "ignored write through a locked readonly view");
            return;
        }
        self.inner.set(key, value);
    }

    pub fn remove(&self, key: &str) -> bool {
        if self.ctx.is_locked() {
            warn!(key, "ignored write through a locked readonly view");
            return false;
        }
        self.inner.remove(key)
    }
}

impl<V> ReactiveContainer for ReadonlyMap<V> {
    fn target_id(&self) -> TargetId {
        self.inner.target_id()
    }

    fn is_readonly(&self) -> bool {
        true
    }
}

/// Builds a reactive map pre-populated from `entries`.
pub fn make_reactive<V, I>(ctx: &ReactivityContext, entries: I) -> Rc<ReactiveMap<V>>
where
    V: Clone + 'static,
    I: IntoIterator<Item = (String, V)>,
{
    let map = Rc::new(ReactiveMap::new(ctx));
    for (key, value) in entries {
        map.set(key, value);
    }
    map
}

/// Wraps an existing reactive map in a readonly view. Cheap: shares the
/// same underlying map and target id, it just gates writes.
pub fn make_readonly<V: Clone + 'static>(
    ctx: &ReactivityContext,
    source: &Rc<ReactiveMap<V>>,
) -> ReadonlyMap<V> {
    ReadonlyMap::new(ctx, Rc::clone(source))
}

/// A non-reactive snapshot of a map's current entries.
pub fn to_raw<V: Clone + 'static>(map: &ReactiveMap<V>) -> FxHashMap<String, V> {
    map.data.borrow().clone()
}

pub fn is_reactive<C: ReactiveContainer>(container: &C) -> bool {
    container.is_reactive()
}

pub fn is_readonly<C: ReactiveContainer>(container: &C) -> bool {
    container.is_readonly()
}

pub fn mark_non_reactive<C: ReactiveContainer>(ctx: &ReactivityContext, container: &C) {
    ctx.mark_non_reactive(container.target_id());
}

pub fn lock(ctx: &ReactivityContext) {
    ctx.lock();
}

pub fn unlock(ctx: &ReactivityContext) {
    ctx.unlock();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_set_triggers_subscribed_effect() {
        use crate::reactivity::effect::{effect, EffectOptions};
        use std::cell::Cell;

        let ctx = ReactivityContext::new();
        let map = make_reactive(&ctx, [("n".to_string(), 1_i64)]);
        let seen = Rc::new(Cell::new(0_i64));
        let seen_inner = Rc::clone(&seen);
        let map_for_effect = Rc::clone(&map);
        let _handle = effect(
            &ctx,
            move || seen_inner.set(map_for_effect.get("n").unwrap_or(0)),
            EffectOptions::default(),
        );
        assert_eq!(seen.get(), 1);
        map.set("n".to_string(), 2);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn readonly_view_rejects_writes_only_when_locked() {
        let ctx = ReactivityContext::new();
        let map = make_reactive(&ctx, [("n".to_string(), 1_i64)]);
        let view = make_readonly(&ctx, &map);

        view.set("n".to_string(), 2);
        assert_eq!(view.get("n"), Some(2));

        lock(&ctx);
        view.set("n".to_string(), 3);
        assert_eq!(view.get("n"), Some(2));

        map.set("n".to_string(), 4);
        assert_eq!(view.get("n"), Some(4));
        unlock(&ctx);
    }

    #[test]
    fn vec_add_triggers_length_subscriber() {
        use crate::reactivity::effect::{effect, EffectOptions};
        use std::cell::Cell;

        let ctx = ReactivityContext::new();
        let vec_ = Rc::new(ReactiveVec::<i64>::new(&ctx));
        let seen_len = Rc::new(Cell::new(0_usize));
        let seen_inner = Rc::clone(&seen_len);
        let vec_for_effect = Rc::clone(&vec_);
        let _handle = effect(
            &ctx,
            move || seen_inner.set(vec_for_effect.len()),
            EffectOptions::default(),
        );
        assert_eq!(seen_len.get(), 0);
        vec_.push(10);
        assert_eq!(seen_len.get(), 1);
    }
}
