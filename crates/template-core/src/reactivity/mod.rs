//! A single-threaded dependency-tracking graph: cells, effects, computed
//! values, and a `targetMap`-style dependency index that links them. See
//! each submodule's doc comment for the specific piece it covers.

mod computed;
mod container;
mod context;
mod effect;
mod refs;

pub use computed::{Computed, WritableComputed};
pub use container::{
    is_reactive, is_readonly, lock, make_reactive, make_readonly, mark_non_reactive, to_raw,
    unlock, ReactiveContainer, ReactiveMap, ReactiveVec, ReadonlyMap,
};
pub use context::{EffectId, Key, OpType, ReactivityContext, TargetId};
pub use effect::{effect, pause_tracking, resume_tracking, stop, EffectHandle, EffectOptions};
pub use refs::{is_ref, to_refs, MapFieldRef, Ref, RefLike};
