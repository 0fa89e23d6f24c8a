//! LSP protocol feature implementations.
//!
//! This module provides:
//! - The capability dispatcher routing queries to analysis listeners
//! - Diagnostics conversion from validation reports
//! - Symbol flattening for document outlines
//! - Aggregation of rename edits into a workspace edit

mod diagnostics;
mod dispatcher;
mod symbols;
mod workspace_edit;

pub use diagnostics::report_to_diagnostics;
pub use dispatcher::Dispatcher;
pub use symbols::{symbol_kind, to_symbols};
pub use workspace_edit::EditAggregator;
