//! High-level view types: declarations, attributes and usages.

use std::fmt;
use std::ops::Range;

use super::parser::{NodeId, Scalar};

/// Type names that are always defined.
pub const BUILTIN_TYPES: &[&str] = &[
    "any",
    "array",
    "boolean",
    "date-only",
    "datetime",
    "datetime-only",
    "file",
    "integer",
    "nil",
    "null",
    "number",
    "object",
    "string",
    "time-only",
];

/// The namespace a declaration lives in, given by its root section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationKind {
    Type,
    Trait,
    ResourceType,
    AnnotationType,
    SecurityScheme,
}

impl DeclarationKind {
    /// Map a root section key to the kind of declarations it holds.
    pub fn from_section(key: &str) -> Option<Self> {
        match key {
            "types" | "schemas" => Some(DeclarationKind::Type),
            "traits" => Some(DeclarationKind::Trait),
            "resourceTypes" => Some(DeclarationKind::ResourceType),
            "annotationTypes" => Some(DeclarationKind::AnnotationType),
            "securitySchemes" => Some(DeclarationKind::SecurityScheme),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeclarationKind::Type => "type",
            DeclarationKind::Trait => "trait",
            DeclarationKind::ResourceType => "resource type",
            DeclarationKind::AnnotationType => "annotation type",
            DeclarationKind::SecurityScheme => "security scheme",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named entry under a declaration section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub key_range: Range<usize>,
    pub node: NodeId,
}

/// A value that is itself a sub-tree, named by its leading key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredValue {
    /// Text naming the value: the first key of the sub-tree, or the
    /// annotation key for annotation values.
    pub value_name: String,
    pub name_range: Range<usize>,
    /// Span of the whole value.
    pub range: Range<usize>,
    /// Node whose key is `value_name`.
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Scalar(Scalar),
    Structured(StructuredValue),
}

impl AttrValue {
    /// Scalar text, or the structured value's name.
    pub fn text(&self) -> &str {
        match self {
            AttrValue::Scalar(scalar) => &scalar.text,
            AttrValue::Structured(structured) => &structured.value_name,
        }
    }

    pub fn range(&self) -> Range<usize> {
        match self {
            AttrValue::Scalar(scalar) => scalar.range.clone(),
            AttrValue::Structured(structured) => structured.range.clone(),
        }
    }
}

/// A key-value pair on a high-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Property name (the key text).
    pub name: String,
    pub name_range: Range<usize>,
    /// Low-level range of the attribute.
    pub range: Range<usize>,
    pub value: Option<AttrValue>,
    /// Where the value is, or where one would be inserted when it is absent.
    pub value_span: Range<usize>,
    /// The property names its owner rather than describing it.
    pub is_key: bool,
    /// The high-level node the attribute belongs to.
    pub owner: NodeId,
}

/// Converted view of a structured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredNode {
    /// The declaration the value resolves to.
    pub definition: Declaration,
    /// Range of the key that carries the value's name.
    pub name_range: Range<usize>,
    pub attributes: Vec<Attribute>,
}

impl StructuredNode {
    pub fn is_annotation_type(&self) -> bool {
        self.definition.kind == DeclarationKind::AnnotationType
    }
}

/// A declaration and every attribute that references it, in document order.
#[derive(Debug, Clone)]
pub struct Usages {
    pub declaration: Declaration,
    pub usages: Vec<Attribute>,
}

/// Strip the parentheses of an annotation key, e.g. `(deprecated)`.
pub fn annotation_name(key: &str) -> Option<&str> {
    key.strip_prefix('(')?.strip_suffix(')')
}
