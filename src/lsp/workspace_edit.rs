//! Merging rename results from several listeners into one workspace edit.

use std::collections::HashMap;
use std::sync::Arc;

use tower_lsp::lsp_types::{TextEdit, Url, WorkspaceEdit};
use tracing::warn;

use crate::document::{Document, DocumentStore};
use crate::rename::{self, ChangedDocument};

/// Per-document edit lists, concatenated in the order they arrive.
#[derive(Debug, Default)]
pub struct EditAggregator {
    order: Vec<Url>,
    edits: HashMap<Url, Vec<rename::TextEdit>>,
    /// Snapshots the edits were computed against.
    snapshots: HashMap<Url, Arc<Document>>,
}

impl EditAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert edits for `document.uri` with this snapshot instead of the
    /// store's current text.
    pub fn pin(&mut self, document: Arc<Document>) {
        self.snapshots.insert(document.uri.clone(), document);
    }

    pub fn push(&mut self, changed: ChangedDocument) {
        if changed.edits.is_empty() {
            return;
        }
        let edits = self.edits.entry(changed.uri.clone()).or_insert_with(|| {
            self.order.push(changed.uri.clone());
            Vec::new()
        });
        edits.extend(changed.edits);
    }

    pub fn extend(&mut self, changes: impl IntoIterator<Item = ChangedDocument>) {
        for changed in changes {
            self.push(changed);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Convert every edit to positions using the pinned snapshot of its
    /// document, or the store's text for documents that were not pinned.
    pub fn into_workspace_edit(mut self, documents: &DocumentStore) -> WorkspaceEdit {
        let mut changes = HashMap::new();

        for uri in self.order {
            let Some(edits) = self.edits.remove(&uri) else {
                continue;
            };
            let document = self.snapshots.remove(&uri).or_else(|| documents.get(&uri));
            let Some(document) = document else {
                warn!(component = "rename", %uri, "edits for a document that is not open");
                continue;
            };

            let converted: Vec<TextEdit> = edits
                .into_iter()
                .map(|edit| TextEdit {
                    range: document.line_index.span_to_range(&edit.range),
                    new_text: edit.new_text,
                })
                .collect();
            changes.insert(uri, converted);
        }

        WorkspaceEdit {
            changes: Some(changes),
            document_changes: None,
            change_annotations: None,
        }
    }
}
