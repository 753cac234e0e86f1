//! Parser diagnostics: an enumerated error set with source locations,
//! routed through a caller-supplied sink.
//!
//! Grounded on the shape of `html_processor/errors.rs` (enum + `Display`
//! via a `&str` conversion), adapted from the teacher's tree-construction
//! error vocabulary to the HTML tokenizer's parse-error vocabulary plus the
//! template language's own `X_`-prefixed extensions.

use crate::cursor::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EofBeforeTagName,
    EofInTag,
    EofInComment,
    EofInCdata,
    EofInScriptHtmlCommentLikeText,
    AbruptClosingOfEmptyComment,
    IncorrectlyClosedComment,
    NestedComment,
    IncorrectlyOpenedComment,
    CdataInHtmlContent,
    InvalidFirstCharacterOfTagName,
    MissingEndTagName,
    XInvalidEndTag,
    XMissingEndTag,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    MissingWhitespaceBetweenAttributes,
    DuplicateAttribute,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedCharacterInAttributeName,
    MissingAttributeValue,
    UnexpectedCharacterInUnquotedAttributeValue,
    XMissingInterpolationEnd,
    XMissingDynamicDirectiveArgumentEnd,
    MissingSemicolonAfterCharacterReference,
    UnknownNamedCharacterReference,
    AbsenceOfDigitsInNumericCharacterReference,
    NullCharacterReference,
    CharacterReferenceOutsideUnicodeRange,
    SurrogateCharacterReference,
    NonCharacterCharacterReference,
    ControlCharacterReference,
}

impl From<ErrorKind> for &'static str {
    fn from(val: ErrorKind) -> Self {
        use ErrorKind::*;
        match val {
            EofBeforeTagName => "eof-before-tag-name",
            EofInTag => "eof-in-tag",
            EofInComment => "eof-in-comment",
            EofInCdata => "eof-in-cdata",
            EofInScriptHtmlCommentLikeText => "eof-in-script-html-comment-like-text",
            AbruptClosingOfEmptyComment => "abrupt-closing-of-empty-comment",
            IncorrectlyClosedComment => "incorrectly-closed-comment",
            NestedComment => "nested-comment",
            IncorrectlyOpenedComment => "incorrectly-opened-comment",
            CdataInHtmlContent => "cdata-in-html-content",
            InvalidFirstCharacterOfTagName => "invalid-first-character-of-tag-name",
            MissingEndTagName => "missing-end-tag-name",
            XInvalidEndTag => "x-invalid-end-tag",
            XMissingEndTag => "x-missing-end-tag",
            UnexpectedQuestionMarkInsteadOfTagName => "unexpected-question-mark-instead-of-tag-name",
            UnexpectedSolidusInTag => "unexpected-solidus-in-tag",
            EndTagWithAttributes => "end-tag-with-attributes",
            EndTagWithTrailingSolidus => "end-tag-with-trailing-solidus",
            MissingWhitespaceBetweenAttributes => "missing-whitespace-between-attributes",
            DuplicateAttribute => "duplicate-attribute",
            UnexpectedEqualsSignBeforeAttributeName => "unexpected-equals-sign-before-attribute-name",
            UnexpectedCharacterInAttributeName => "unexpected-character-in-attribute-name",
            MissingAttributeValue => "missing-attribute-value",
            UnexpectedCharacterInUnquotedAttributeValue => {
                "unexpected-character-in-unquoted-attribute-value"
            }
            XMissingInterpolationEnd => "x-missing-interpolation-end",
            XMissingDynamicDirectiveArgumentEnd => "x-missing-dynamic-directive-argument-end",
            MissingSemicolonAfterCharacterReference => "missing-semicolon-after-character-reference",
            UnknownNamedCharacterReference => "unknown-named-character-reference",
            AbsenceOfDigitsInNumericCharacterReference => {
                "absence-of-digits-in-numeric-character-reference"
            }
            NullCharacterReference => "null-character-reference",
            CharacterReferenceOutsideUnicodeRange => "character-reference-outside-unicode-range",
            SurrogateCharacterReference => "surrogate-character-reference",
            NonCharacterCharacterReference => "noncharacter-character-reference",
            ControlCharacterReference => "control-character-reference",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).into())
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub location: SourceLocation,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.kind, self.location.start.line, self.location.start.column
        )
    }
}
impl std::error::Error for Diagnostic {}

/// Maps an entity-crate error onto the parser's diagnostic vocabulary; the
/// two enums name the same conditions but live in separate crates so the
/// entity decoder has no dependency on the parser's `SourceLocation`.
impl From<entities::EntityError> for ErrorKind {
    fn from(err: entities::EntityError) -> Self {
        use entities::EntityError as E;
        match err {
            E::MissingSemicolonAfterCharacterReference => {
                ErrorKind::MissingSemicolonAfterCharacterReference
            }
            E::UnknownNamedCharacterReference => ErrorKind::UnknownNamedCharacterReference,
            E::AbsenceOfDigitsInNumericCharacterReference => {
                ErrorKind::AbsenceOfDigitsInNumericCharacterReference
            }
            E::NullCharacterReference => ErrorKind::NullCharacterReference,
            E::CharacterReferenceOutsideUnicodeRange => {
                ErrorKind::CharacterReferenceOutsideUnicodeRange
            }
            E::SurrogateCharacterReference => ErrorKind::SurrogateCharacterReference,
            E::NonCharacterCharacterReference => ErrorKind::NonCharacterCharacterReference,
            E::ControlCharacterReference => ErrorKind::ControlCharacterReference,
        }
    }
}

/// Diagnostic sink; the default writes to `tracing` at `warn` level, mirroring
/// the teacher's pattern of never hard-failing a parse.
pub type ErrorSink<'a> = dyn FnMut(Diagnostic) + 'a;

pub fn default_sink(diagnostic: Diagnostic) {
    tracing::warn!(kind = %diagnostic.kind, line = diagnostic.location.start.line, column = diagnostic.location.start.column, "parse diagnostic");
}
