//! Lazy, memoized derived values (spec §4.7). A `Computed` is itself a
//! (lazy, `is_computed`) effect whose scheduler only flips a dirty bit —
//! the getter doesn't actually re-run until the next read, and reading it
//! while a parent effect is active makes the parent transitively depend on
//! everything the computed depends on ("child-run tracking").

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::context::ReactivityContext;
use super::effect::{effect, EffectHandle, EffectOptions};

/// A read-only derived value. Clone is cheap: it shares the underlying
/// effect and cache cell.
#[derive(Clone)]
pub struct Computed<T> {
    ctx: ReactivityContext,
    handle: EffectHandle,
    dirty: Rc<Cell<bool>>,
    value: Rc<RefCell<Option<T>>>,
}

impl<T: Clone + 'static> Computed<T> {
    /// Builds a read-only computed from a getter closure.
    pub fn new(ctx: &ReactivityContext, mut getter: impl FnMut() -> T + 'static) -> Self {
        let value: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
        let dirty = Rc::new(Cell::new(true));

        let value_for_run = Rc::clone(&value);
        let run = move || {
            *value_for_run.borrow_mut() = Some(getter());
        };

        let dirty_for_scheduler = Rc::clone(&dirty);
        let scheduler: Box<dyn FnMut()> = Box::new(move || {
            dirty_for_scheduler.set(true);
        });

        let handle = effect(
            ctx,
            run,
            EffectOptions {
                lazy: true,
                scheduler: Some(scheduler),
                on_stop: None,
                is_computed: true,
            },
        );

        Self {
            ctx: ctx.clone(),
            handle,
            dirty,
            value,
        }
    }

    /// Reads the current value, recomputing first if a dependency has
    /// changed since the last read. If an outer effect is active while this
    /// is called, that effect becomes dependent on every dep this computed
    /// reads, directly and transitively through any computed it reads.
    pub fn value(&self) -> T {
        if self.dirty.get() {
            self.handle.run();
            self.dirty.set(false);
        }
        let deps = self.ctx.effect_deps(self.handle.id());
        self.ctx.link_deps_to_active_effect(&deps);
        self.value
            .borrow()
            .clone()
            .expect("computed value populated by its first run")
    }

    pub fn stop(&self) {
        self.handle.stop();
    }
}

/// A computed with both a getter and a setter, matching the source's
/// `computed({get, set})` form (spec §6). The setter is a plain callback;
/// it is the caller's responsibility to mutate whatever reactive state the
/// getter reads so the next read recomputes.
pub struct WritableComputed<T> {
    read: Computed<T>,
    setter: RefCell<Box<dyn FnMut(T)>>,
}

impl<T: Clone + 'static> WritableComputed<T> {
    pub fn new(
        ctx: &ReactivityContext,
        getter: impl FnMut() -> T + 'static,
        setter: impl FnMut(T) + 'static,
    ) -> Self {
        Self {
            read: Computed::new(ctx, getter),
            setter: RefCell::new(Box::new(setter)),
        }
    }

    pub fn value(&self) -> T {
        self.read.value()
    }

    pub fn set(&self, new_value: T) {
        (self.setter.borrow_mut())(new_value);
    }

    pub fn stop(&self) {
        self.read.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::container::ReactiveMap;
    use crate::reactivity::effect::effect as raw_effect;

    #[test]
    fn computed_memoizes_between_reads() {
        let ctx = ReactivityContext::new();
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let c = Computed::new(&ctx, move || {
            calls_inner.set(calls_inner.get() + 1);
            42
        });
        assert_eq!(c.value(), 42);
        assert_eq!(c.value(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn computed_recomputes_after_dependency_changes() {
        let ctx = ReactivityContext::new();
        let map = Rc::new(ReactiveMap::<i64>::new(&ctx));
        map.set("n".to_string(), 1);

        let map_for_getter = Rc::clone(&map);
        let c = Computed::new(&ctx, move || map_for_getter.get("n").unwrap_or(0) + 1);
        assert_eq!(c.value(), 2);

        map.set("n".to_string(), 10);
        assert_eq!(c.value(), 11);
    }

    #[test]
    fn computed_chain_propagates_through_effect() {
        let ctx = ReactivityContext::new();
        let map = Rc::new(ReactiveMap::<i64>::new(&ctx));
        map.set("n".to_string(), 0);

        let map_for_c1 = Rc::clone(&map);
        let c1 = Rc::new(Computed::new(&ctx, move || map_for_c1.get("n").unwrap_or(0) + 1));

        let c1_for_c2 = Rc::clone(&c1);
        let c2 = Rc::new(Computed::new(&ctx, move || c1_for_c2.value() * 2));

        let sink = Rc::new(Cell::new(0_i64));
        let sink_for_effect = Rc::clone(&sink);
        let c2_for_effect = Rc::clone(&c2);
        let runs = Rc::new(Cell::new(0));
        let runs_inner = Rc::clone(&runs);
        let _handle = raw_effect(
            &ctx,
            move || {
                runs_inner.set(runs_inner.get() + 1);
                sink_for_effect.set(c2_for_effect.value());
            },
            EffectOptions::default(),
        );

        assert_eq!(sink.get(), 2);
        assert_eq!(runs.get(), 1);

        map.set("n".to_string(), 5);
        assert_eq!(sink.get(), 12);
        assert_eq!(runs.get(), 2);
    }
}
