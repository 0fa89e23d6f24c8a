//! Document state management and text utilities.
//!
//! This module provides:
//! - `LineIndex` for byte offset <-> LSP position conversion
//! - `Document` and `DocumentStore` for document lifecycle management

mod state;
mod text;

pub use state::{Document, DocumentStore};
pub use text::LineIndex;
