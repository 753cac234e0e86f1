//! The annotated syntax tree produced by [`crate::parser::parse`].
//!
//! Grounded on the teacher's split between a lightweight per-token value
//! (`HTMLToken`) and an enum of node names (`NodeName`); here the whole
//! tagged-variant tree is the public surface since, unlike the teacher's
//! streaming tag processor, this parser buffers the entire template and
//! returns a complete tree in one call (§9 "Streaming vs buffered parse").

use crate::cursor::SourceLocation;

/// The namespace a subtree is parsed in, supplied by the caller's
/// `getNamespace` hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathML,
}

/// The lexing mode governing whether tags, entities, or CDATA terminators
/// are recognized within an element's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    #[default]
    Data,
    Rcdata,
    Rawtext,
    Cdata,
    AttributeValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    Element,
    Component,
    Slot,
    Template,
}

/// A simple (non-interpolated) expression, e.g. a `v-if` condition or a
/// directive argument.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleExpression {
    pub content: String,
    pub is_static: bool,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<Text>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub argument: Option<SimpleExpression>,
    pub expression: Option<SimpleExpression>,
    pub modifiers: Vec<String>,
    pub location: SourceLocation,
}

/// An attribute-list entry: plain attributes and directives share a prop
/// list per spec §3 ("Every Attribute's name is unique... " / directive
/// recognition happens while parsing attributes).
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    Attribute(Attribute),
    Directive(Directive),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
    pub is_empty: bool,
    pub location: SourceLocation,
}

impl Text {
    pub fn new(content: String, location: SourceLocation) -> Self {
        let is_empty = content.trim().is_empty();
        Self {
            content,
            is_empty,
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    pub inner: SimpleExpression,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub content: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub namespace: Namespace,
    pub tag: String,
    pub tag_type: TagType,
    pub props: Vec<Prop>,
    pub is_self_closing: bool,
    pub children: Vec<Node>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(Text),
    Interpolation(Interpolation),
    Comment(Comment),
}

impl Node {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Node::Element(e) => &e.location,
            Node::Text(t) => &t.location,
            Node::Interpolation(i) => &i.location,
            Node::Comment(c) => &c.location,
        }
    }

    pub fn is_empty_text(&self) -> bool {
        matches!(self, Node::Text(t) if t.is_empty)
    }
}

/// The root of a parsed template. `imports`/`statements`/`hoists` and a
/// codegen slot are named in spec §3's Root row as fields an AST-to-code
/// transform pipeline would populate; that pipeline is explicitly out of
/// scope here (§1 Out of scope), so they are carried as empty/`None`
/// placeholders a downstream compiler can fill in without changing this
/// type's shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    pub children: Vec<Node>,
    pub imports: Vec<String>,
    pub statements: Vec<String>,
    pub hoists: Vec<String>,
    pub location: Option<SourceLocation>,
}
