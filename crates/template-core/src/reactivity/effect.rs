//! The `effect()`/`stop()` public surface over the raw scheduling machinery
//! in [`super::context`].

use super::context::{EffectId, EffectSlot, ReactivityContext};

/// Constructor options for [`effect`]. `lazy` and `scheduler` mirror the
/// two extension seams named in spec §4.6; `on_stop` and `is_computed` round
/// out the effect record.
#[derive(Default)]
pub struct EffectOptions {
    pub lazy: bool,
    pub scheduler: Option<Box<dyn FnMut()>>,
    pub on_stop: Option<Box<dyn FnMut()>>,
    pub(crate) is_computed: bool,
}

/// A handle onto a running effect. Dropping it does not stop the effect —
/// call [`EffectHandle::stop`] explicitly, matching the source's explicit
/// `stop(effect)` rather than scope-based cancellation.
#[derive(Clone)]
pub struct EffectHandle {
    ctx: ReactivityContext,
    id: EffectId,
}

impl EffectHandle {
    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Re-runs the effect through the same cleanup/activation-stack
    /// machinery as an automatic trigger-driven re-run.
    pub fn run(&self) -> bool {
        self.ctx.run_effect(self.id)
    }

    pub fn stop(&self) {
        self.ctx.stop_effect(self.id);
    }

    pub fn is_active(&self) -> bool {
        self.ctx.is_effect_active(self.id)
    }
}

/// Registers `f` as an effect, running it immediately unless
/// `options.lazy`. The initial run is what performs the first round of
/// `track` calls.
pub fn effect(ctx: &ReactivityContext, f: impl FnMut() + 'static, options: EffectOptions) -> EffectHandle {
    let lazy = options.lazy;
    let id = ctx.register_effect(EffectSlot {
        run: Some(Box::new(f)),
        scheduler: options.scheduler,
        on_stop: options.on_stop,
        deps: Vec::new(),
        active: true,
        is_computed: options.is_computed,
    });
    let handle = EffectHandle {
        ctx: ctx.clone(),
        id,
    };
    if !lazy {
        handle.run();
    }
    handle
}

pub fn pause_tracking(ctx: &ReactivityContext) {
    ctx.pause_tracking();
}

pub fn resume_tracking(ctx: &ReactivityContext) {
    ctx.resume_tracking();
}

pub fn stop(handle: &EffectHandle) {
    handle.stop();
}
