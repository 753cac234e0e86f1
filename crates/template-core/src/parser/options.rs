//! Caller-supplied parsing configuration.
//!
//! Grounded on the teacher's `HTML_Processor`/`WP_HTML_Tag_Processor`
//! constructor options (bookmark limits, supported-feature flags), recast as
//! a plain options struct of hooks since this parser has no notion of an
//! HTML5 insertion-mode stack to configure.

use crate::ast::{Namespace, TextMode};
use entities::NamedReferenceTable;

fn default_namespace(_tag: &str, parent: Namespace) -> Namespace {
    parent
}

fn default_text_mode(_tag: &str, _namespace: Namespace) -> TextMode {
    TextMode::Data
}

fn default_is_void_tag(_tag: &str) -> bool {
    false
}

/// Tuning knobs for [`crate::parser::parse`]. All hooks are plain `fn`
/// pointers (not `Box<dyn Fn>`) since no caller observed so far needs to
/// close over state; `Default` gives every hook the HTML-namespace,
/// DATA-mode, no-void-tags baseline described in the parser's design notes.
#[derive(Clone)]
pub struct ParseOptions {
    /// Open/close interpolation delimiters, default `("{{", "}}")`.
    pub delimiters: (String, String),
    /// Whether whitespace-only text nodes are dropped from the tree.
    pub ignore_spaces: bool,
    /// Given a tag name and its parent's namespace, returns the element's
    /// own namespace.
    pub get_namespace: fn(&str, Namespace) -> Namespace,
    /// Given a tag name and its own namespace, returns the text mode its
    /// children are parsed in.
    pub get_text_mode: fn(&str, Namespace) -> TextMode,
    /// Whether a start tag for this name has no end tag and no children.
    pub is_void_tag: fn(&str) -> bool,
    /// Named character references recognized by the entity decoder.
    pub named_character_references: NamedReferenceTable,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiters: ("{{".to_string(), "}}".to_string()),
            ignore_spaces: true,
            get_namespace: default_namespace,
            get_text_mode: default_text_mode,
            is_void_tag: default_is_void_tag,
            named_character_references: NamedReferenceTable::default_table(),
        }
    }
}
