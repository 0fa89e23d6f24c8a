//! Routing of editor queries to registered listeners.
//!
//! Every query resolves the document, converts the editor position to a byte
//! offset, calls each listener of the capability in registration order, and
//! converts the results back to editor positions. Results of several
//! listeners are concatenated. An unknown document yields an empty result.

use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, Diagnostic, DocumentHighlight, DocumentHighlightKind,
    Location, Position, Range, SymbolInformation, Url, WorkspaceEdit,
};
use tracing::{debug, trace};

use crate::document::{Document, DocumentStore};
use crate::providers::{
    self, CompletionListener, CompletionProvider, DefinitionProvider, HighlightListener,
    HighlightProvider, LocationListener, ReferencesProvider, RenameListener, StructureListener,
    StructureProvider, ValidationListener, ValidationProvider,
};
use crate::rename::{RenameEngine, RenameError};
use crate::settings::{Feature, Settings};

use super::diagnostics::report_to_diagnostics;
use super::symbols::to_symbols;
use super::workspace_edit::EditAggregator;

#[derive(Default)]
pub struct Dispatcher {
    structure: Vec<Box<dyn StructureListener>>,
    completion: Vec<Box<dyn CompletionListener>>,
    definition: Vec<Box<dyn LocationListener>>,
    references: Vec<Box<dyn LocationListener>>,
    highlight: Vec<Box<dyn HighlightListener>>,
    rename: Vec<Box<dyn RenameListener>>,
    validation: Vec<Box<dyn ValidationListener>>,
}

impl Dispatcher {
    /// A dispatcher with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// A dispatcher with the built-in providers for every enabled feature.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut dispatcher = Self::new();

        if settings.feature_enabled(Feature::Symbols) {
            dispatcher.register_structure(StructureProvider);
        }
        if settings.feature_enabled(Feature::Completion) {
            dispatcher.register_completion(CompletionProvider::new(settings.extra_types()));
        }
        if settings.feature_enabled(Feature::Definition) {
            dispatcher.register_definition(DefinitionProvider);
        }
        if settings.feature_enabled(Feature::References) {
            dispatcher.register_references(ReferencesProvider);
        }
        if settings.feature_enabled(Feature::Highlight) {
            dispatcher.register_highlight(HighlightProvider);
        }
        if settings.feature_enabled(Feature::Rename) {
            dispatcher.register_rename(RenameEngine::new());
        }
        if settings.feature_enabled(Feature::Validation) {
            dispatcher.register_validation(ValidationProvider::new(
                settings.unresolved_severity(),
                settings.extra_types(),
            ));
        }

        dispatcher
    }

    pub fn register_structure(&mut self, listener: impl StructureListener + 'static) {
        self.structure.push(Box::new(listener));
    }

    pub fn register_completion(&mut self, listener: impl CompletionListener + 'static) {
        self.completion.push(Box::new(listener));
    }

    pub fn register_definition(&mut self, listener: impl LocationListener + 'static) {
        self.definition.push(Box::new(listener));
    }

    pub fn register_references(&mut self, listener: impl LocationListener + 'static) {
        self.references.push(Box::new(listener));
    }

    pub fn register_highlight(&mut self, listener: impl HighlightListener + 'static) {
        self.highlight.push(Box::new(listener));
    }

    pub fn register_rename(&mut self, listener: impl RenameListener + 'static) {
        self.rename.push(Box::new(listener));
    }

    pub fn register_validation(&mut self, listener: impl ValidationListener + 'static) {
        self.validation.push(Box::new(listener));
    }

    pub fn has_rename(&self) -> bool {
        !self.rename.is_empty()
    }

    fn document(&self, documents: &DocumentStore, uri: &Url, capability: &str) -> Option<std::sync::Arc<Document>> {
        let document = documents.get(uri);
        if document.is_none() {
            debug!(component = "dispatcher", capability, %uri, "unknown document");
        }
        document
    }

    pub fn symbols(&self, documents: &DocumentStore, uri: &Url) -> Vec<SymbolInformation> {
        let Some(document) = self.document(documents, uri, "symbols") else {
            return Vec::new();
        };

        self.structure
            .iter()
            .flat_map(|listener| to_symbols(&listener.structure(&document), &document))
            .collect()
    }

    pub fn completion(
        &self,
        documents: &DocumentStore,
        uri: &Url,
        position: Position,
    ) -> Vec<CompletionItem> {
        let Some(document) = self.document(documents, uri, "completion") else {
            return Vec::new();
        };
        let offset = document.line_index.position_to_offset(position);

        let mut items = Vec::new();
        for listener in &self.completion {
            let suggestions = listener.suggestions(&document, offset);
            trace!(component = "dispatcher", count = suggestions.len(), "completion listener returned");
            for suggestion in suggestions {
                let Some(label) = suggestion.text.or(suggestion.display_text) else {
                    continue;
                };
                items.push(CompletionItem {
                    label,
                    kind: Some(CompletionItemKind::TEXT),
                    ..Default::default()
                });
            }
        }
        items
    }

    pub fn definition(&self, documents: &DocumentStore, uri: &Url, position: Position) -> Vec<Location> {
        self.locations(&self.definition, documents, uri, position, "definition")
    }

    pub fn references(&self, documents: &DocumentStore, uri: &Url, position: Position) -> Vec<Location> {
        self.locations(&self.references, documents, uri, position, "references")
    }

    fn locations(
        &self,
        listeners: &[Box<dyn LocationListener>],
        documents: &DocumentStore,
        uri: &Url,
        position: Position,
        capability: &str,
    ) -> Vec<Location> {
        let Some(document) = self.document(documents, uri, capability) else {
            return Vec::new();
        };
        let offset = document.line_index.position_to_offset(position);

        let mut result = Vec::new();
        for listener in listeners {
            for location in listener.locations(&document, offset) {
                result.push(to_location(&location, &document, documents));
            }
        }
        result
    }

    pub fn highlight(
        &self,
        documents: &DocumentStore,
        uri: &Url,
        position: Position,
    ) -> Vec<DocumentHighlight> {
        let Some(document) = self.document(documents, uri, "highlight") else {
            return Vec::new();
        };
        let offset = document.line_index.position_to_offset(position);

        self.highlight
            .iter()
            .flat_map(|listener| listener.highlights(&document, offset))
            .map(|range| DocumentHighlight {
                range: document.line_index.span_to_range(&range),
                kind: Some(DocumentHighlightKind::TEXT),
            })
            .collect()
    }

    /// Run every rename listener and merge their edits.
    pub fn rename(
        &self,
        documents: &DocumentStore,
        uri: &Url,
        position: Position,
        new_name: &str,
    ) -> Result<WorkspaceEdit, RenameError> {
        let mut aggregator = EditAggregator::new();
        let Some(document) = self.document(documents, uri, "rename") else {
            return Ok(aggregator.into_workspace_edit(documents));
        };
        let offset = document.line_index.position_to_offset(position);
        aggregator.pin(document.clone());

        for listener in &self.rename {
            let changed = listener.rename(&document, offset, new_name)?;
            trace!(component = "dispatcher", count = changed.len(), "rename listener returned");
            aggregator.extend(changed);
        }

        Ok(aggregator.into_workspace_edit(documents))
    }

    /// Range of the token the first willing rename listener would change.
    pub fn prepare_rename(&self, documents: &DocumentStore, uri: &Url, position: Position) -> Option<Range> {
        let document = self.document(documents, uri, "prepare rename")?;
        let offset = document.line_index.position_to_offset(position);

        self.rename
            .iter()
            .find_map(|listener| listener.prepare(&document, offset))
            .map(|range| document.line_index.span_to_range(&range))
    }

    /// Validate a document and group the diagnostics by point-of-view URI.
    pub fn validate(&self, documents: &DocumentStore, uri: &Url) -> Vec<(Url, Vec<Diagnostic>)> {
        let Some(document) = self.document(documents, uri, "validation") else {
            return Vec::new();
        };

        let mut order: Vec<Url> = Vec::new();
        let mut grouped: HashMap<Url, Vec<Diagnostic>> = HashMap::new();
        for listener in &self.validation {
            let report = listener.validate(&document);
            debug!(
                component = "dispatcher",
                uri = %report.point_of_view,
                issues = report.issues.len(),
                "validation report"
            );
            let diagnostics = report_to_diagnostics(&report, documents);
            let entry = grouped.entry(report.point_of_view.clone()).or_insert_with(|| {
                order.push(report.point_of_view.clone());
                Vec::new()
            });
            entry.extend(diagnostics);
        }

        order
            .into_iter()
            .filter_map(|uri| grouped.remove(&uri).map(|diagnostics| (uri, diagnostics)))
            .collect()
    }
}

/// Convert with the location's own document when it is open, otherwise with
/// the query document.
fn to_location(location: &providers::Location, query: &Document, documents: &DocumentStore) -> Location {
    let range = match documents.get(&location.uri) {
        Some(target) => target.line_index.span_to_range(&location.range),
        None => query.line_index.span_to_range(&location.range),
    };
    Location {
        uri: location.uri.clone(),
        range,
    }
}
