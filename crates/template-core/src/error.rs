//! Crate-level hard-failure error type.
//!
//! Grounded on the teacher's `HtmlProcessorError`/`std::error::Error` +
//! `Display` pattern (`html_processor/errors.rs`), implemented with
//! `thiserror` instead of a hand-written `impl Display` since nothing here
//! needs the teacher's `&str`-conversion trick. Per spec §7 the parser
//! itself never returns `Err` — this type exists for the reactivity
//! context's infrequent hard failures (e.g. exceeding configured limits)
//! and for future fallible entry points at the crate boundary.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("attempted to read or write a stopped effect's dependencies")]
    EffectStopped,
    #[error("attempted to mutate a readonly reactive value while locked")]
    LockedReadonlyMutation,
}
