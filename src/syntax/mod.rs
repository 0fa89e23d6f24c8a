//! Parsing and querying of RAML documents.
//!
//! This module provides:
//! - `Tree`, the low-level indentation tree with byte ranges
//! - `Unit`, the high-level view: declarations, attributes and usages
//! - `determine_completion_kind` for classifying a cursor offset

mod location;
mod model;
mod parser;
mod unit;

pub use location::{determine_completion_kind, LocationKind};
pub use model::{
    annotation_name, AttrValue, Attribute, Declaration, DeclarationKind, StructuredNode,
    StructuredValue, Usages, BUILTIN_TYPES,
};
pub use parser::{Node, NodeId, Scalar, Tree, Value};
pub use unit::Unit;
