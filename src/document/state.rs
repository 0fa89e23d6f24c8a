//! Document state management for the RAML LSP.

use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::text::LineIndex;

/// Snapshot of a single open document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Document URI.
    pub uri: Url,
    /// Document version from the client.
    pub version: i32,
    /// Pre-computed line index for position conversion; owns the text.
    pub line_index: LineIndex,
}

impl Document {
    pub fn new(uri: Url, text: String, version: i32) -> Self {
        Self {
            uri,
            version,
            line_index: LineIndex::new(text),
        }
    }

    /// The full document text.
    pub fn text(&self) -> &str {
        self.line_index.source()
    }
}

/// Thread-safe storage for open documents.
///
/// Entries are replaced wholesale on change. Readers hold an `Arc` snapshot,
/// so a replacement never races with a query that is reading the old text.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<Document>>,
}

impl DocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open or replace a document with the given text.
    pub fn open(&self, uri: Url, text: String, version: i32) -> Arc<Document> {
        let state = Arc::new(Document::new(uri.clone(), text, version));
        self.documents.insert(uri, Arc::clone(&state));
        state
    }

    /// Close a document.
    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    /// Get a document's current snapshot.
    pub fn get(&self, uri: &Url) -> Option<Arc<Document>> {
        self.documents.get(uri).map(|r| Arc::clone(&r))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
