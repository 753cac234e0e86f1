//! Single-value reactive cells (`ref(raw)`) and the `to_refs` bridge from a
//! [`ReactiveMap`] back out to per-field ref-shaped handles.

use std::cell::RefCell;
use std::rc::Rc;

use super::container::ReactiveMap;
use super::context::{Key, OpType, ReactivityContext, TargetId};

/// A marker for anything shaped like the source's ref: a single tracked
/// slot with `.value` get/set, as opposed to a multi-key container.
pub trait RefLike<T> {
    fn get(&self) -> T;
    fn set(&self, value: T);
}

/// A single reactive cell. Every `ref` gets its own target id so its one
/// dependency doesn't collide with any container's keyed deps.
pub struct Ref<T> {
    ctx: ReactivityContext,
    target: TargetId,
    value: RefCell<T>,
}

const VALUE_KEY: &str = "value";

impl<T: Clone + 'static> Ref<T> {
    pub fn new(ctx: &ReactivityContext, initial: T) -> Self {
        Self {
            ctx: ctx.clone(),
            target: ctx.new_target_id(),
            value: RefCell::new(initial),
        }
    }

    pub fn target_id(&self) -> TargetId {
        self.target
    }
}

impl<T: Clone + 'static> RefLike<T> for Ref<T> {
    fn get(&self) -> T {
        self.ctx
            .track(self.target, OpType::Get, Key::Named(VALUE_KEY.to_string()));
        self.value.borrow().clone()
    }

    fn set(&self, new_value: T) {
        *self.value.borrow_mut() = new_value;
        self.ctx
            .trigger(self.target, OpType::Set, Key::Named(VALUE_KEY.to_string()));
    }
}

pub fn is_ref<T, R: RefLike<T>>(_candidate: &R) -> bool {
    true
}

/// A ref-shaped view over one field of a [`ReactiveMap`], as produced by
/// [`to_refs`]. Reads/writes delegate to the backing map, so it stays in
/// sync with direct map access under the same key.
pub struct MapFieldRef<V> {
    map: Rc<ReactiveMap<V>>,
    key: String,
}

impl<V: Clone + 'static> RefLike<Option<V>> for MapFieldRef<V> {
    fn get(&self) -> Option<V> {
        self.map.get(&self.key)
    }

    fn set(&self, new_value: Option<V>) {
        match new_value {
            Some(value) => self.map.set(self.key.clone(), value),
            None => {
                self.map.remove(&self.key);
            }
        }
    }
}

/// Produces one [`MapFieldRef`] per key currently in `map`, matching the
/// source's destructuring-without-losing-reactivity idiom
/// (`const { a, b } = toRefs(state)`).
pub fn to_refs<V: Clone + 'static>(map: &Rc<ReactiveMap<V>>) -> Vec<(String, MapFieldRef<V>)> {
    map.keys()
        .into_iter()
        .map(|key| {
            (
                key.clone(),
                MapFieldRef {
                    map: Rc::clone(map),
                    key,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::container::make_reactive;
    use crate::reactivity::effect::{effect, EffectOptions};
    use std::cell::Cell;

    #[test]
    fn ref_tracks_and_triggers() {
        let ctx = ReactivityContext::new();
        let r = Rc::new(Ref::new(&ctx, 1_i64));
        let seen = Rc::new(Cell::new(0_i64));
        let seen_inner = Rc::clone(&seen);
        let r_for_effect = Rc::clone(&r);
        let _handle = effect(
            &ctx,
            move || seen_inner.set(r_for_effect.get()),
            EffectOptions::default(),
        );
        assert_eq!(seen.get(), 1);
        r.set(2);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn to_refs_stays_in_sync_with_source_map() {
        let ctx = ReactivityContext::new();
        let map = make_reactive(&ctx, [("a".to_string(), 1_i64), ("b".to_string(), 2_i64)]);
        let refs = to_refs(&map);
        let a_ref = refs.iter().find(|(k, _)| k == "a").unwrap();

        assert_eq!(a_ref.1.get(), Some(1));
        map.set("a".to_string(), 9);
        assert_eq!(a_ref.1.get(), Some(9));

        a_ref.1.set(Some(42));
        assert_eq!(map.get("a"), Some(42));
    }
}
