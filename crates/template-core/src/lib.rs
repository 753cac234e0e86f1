//! Parses an HTML-superset template language into an annotated AST with
//! codepoint-based source locations, and a single-threaded
//! dependency-tracking reactivity graph for the expressions and directives
//! that tree carries.
//!
//! See [`parser`] for the parser's entry points and [`reactivity`] for the
//! dependency-tracking engine.

mod cursor;
mod diagnostics;

pub mod ast;
pub mod error;
pub mod parser;
pub mod reactivity;

pub(crate) mod macros;

pub use cursor::{SourceLocation, SourcePosition};
pub use diagnostics::{Diagnostic, ErrorKind};
pub use error::CoreError;

/// The small set of types most callers need: parse entry points, the AST,
/// diagnostics, and the reactivity primitives, re-exported so a consumer
/// can `use template_core::prelude::*` instead of reaching into submodules.
pub mod prelude {
    pub use crate::ast::{
        Attribute, Comment, Directive, Element, Interpolation, Namespace, Node, Prop, Root,
        SimpleExpression, TagType, Text, TextMode,
    };
    pub use crate::diagnostics::{Diagnostic, ErrorKind};
    pub use crate::parser::{parse, parse_with_sink, ParseOptions};
    pub use crate::reactivity::{
        effect, is_reactive, is_readonly, make_reactive, make_readonly, to_refs, Computed,
        EffectHandle, EffectOptions, ReactiveMap, ReactiveVec, ReactivityContext, ReadonlyMap,
        Ref, WritableComputed,
    };
    pub use crate::{CoreError, SourceLocation, SourcePosition};
}
