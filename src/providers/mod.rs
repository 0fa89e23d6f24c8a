//! Analysis listeners and the built-in providers backed by [`crate::syntax`].
//!
//! The dispatcher only talks to the traits in this module. Every listener
//! works in byte offsets; conversion to editor positions happens in the
//! dispatcher.

use std::collections::BTreeMap;
use std::ops::Range;

use tower_lsp::lsp_types::Url;

use crate::document::Document;
use crate::rename::{ChangedDocument, RenameEngine, RenameError};

mod completion;
mod navigation;
mod structure;
mod validation;

pub use completion::CompletionProvider;
pub use navigation::{DefinitionProvider, HighlightProvider, ReferencesProvider};
pub use structure::StructureProvider;
pub use validation::ValidationProvider;

/// Outline categories, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StructureCategory {
    Resources,
    ResourceTypesAndTraits,
    SchemasAndTypes,
    Other,
}

impl StructureCategory {
    pub fn label(self) -> &'static str {
        match self {
            StructureCategory::Resources => "Resources",
            StructureCategory::ResourceTypesAndTraits => "Resource Types & Traits",
            StructureCategory::SchemasAndTypes => "Schemas & Types",
            StructureCategory::Other => "Other",
        }
    }
}

/// A labeled outline node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureNode {
    pub text: String,
    pub range: Range<usize>,
    pub children: Vec<StructureNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestion {
    pub text: Option<String>,
    pub display_text: Option<String>,
}

/// A span in some document. The document is the query document unless a
/// listener says otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub uri: Url,
    pub range: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub text: String,
    pub range: Range<usize>,
    pub issue_type: IssueType,
    /// Document the range belongs to; the point-of-view document when `None`.
    pub file_path: Option<Url>,
}

/// Issues found while validating `point_of_view`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub point_of_view: Url,
    pub issues: Vec<ValidationIssue>,
}

pub trait StructureListener: Send + Sync {
    fn structure(&self, document: &Document) -> BTreeMap<StructureCategory, StructureNode>;
}

pub trait CompletionListener: Send + Sync {
    fn suggestions(&self, document: &Document, offset: usize) -> Vec<Suggestion>;
}

/// Definition and references listeners.
pub trait LocationListener: Send + Sync {
    fn locations(&self, document: &Document, offset: usize) -> Vec<Location>;
}

pub trait HighlightListener: Send + Sync {
    fn highlights(&self, document: &Document, offset: usize) -> Vec<Range<usize>>;
}

pub trait RenameListener: Send + Sync {
    fn rename(
        &self,
        document: &Document,
        offset: usize,
        new_name: &str,
    ) -> Result<Vec<ChangedDocument>, RenameError>;

    /// Range of the token a rename at `offset` would change.
    fn prepare(&self, document: &Document, offset: usize) -> Option<Range<usize>> {
        let _ = (document, offset);
        None
    }
}

pub trait ValidationListener: Send + Sync {
    fn validate(&self, document: &Document) -> ValidationReport;
}

impl RenameListener for RenameEngine {
    fn rename(
        &self,
        document: &Document,
        offset: usize,
        new_name: &str,
    ) -> Result<Vec<ChangedDocument>, RenameError> {
        RenameEngine::rename(self, document, offset, new_name)
    }

    fn prepare(&self, document: &Document, offset: usize) -> Option<Range<usize>> {
        RenameEngine::prepare(self, document, offset)
    }
}
