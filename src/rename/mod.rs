//! Rename refactoring.
//!
//! The engine resolves the symbol under the cursor, rewrites each usage as a
//! list of offset edits and applies them to the document text from the
//! highest offset to the lowest, so no edit shifts another.

mod edit;
mod engine;
mod error;
mod rewrite;

pub use edit::{EditList, TextEdit};
pub use engine::{ChangedDocument, RenameEngine};
pub use error::RenameError;
pub use rewrite::rename_in_attribute;
