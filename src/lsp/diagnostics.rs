//! Diagnostics conversion from validation reports to LSP diagnostics.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity};
use tracing::trace;

use crate::document::DocumentStore;
use crate::providers::{IssueType, ValidationReport};

/// Source tag attached to every published diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "ex";

/// Convert a report to diagnostics for its point-of-view document.
///
/// Each issue's range is converted with the document it belongs to. Issues
/// whose document is not open are skipped.
pub fn report_to_diagnostics(report: &ValidationReport, documents: &DocumentStore) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::with_capacity(report.issues.len());

    for issue in &report.issues {
        let origin = issue.file_path.as_ref().unwrap_or(&report.point_of_view);
        let Some(document) = documents.get(origin) else {
            trace!(component = "diagnostics", %origin, issue = %issue.text, "origin document not open");
            continue;
        };

        let severity = match issue.issue_type {
            IssueType::Error => DiagnosticSeverity::ERROR,
            IssueType::Warning => DiagnosticSeverity::WARNING,
        };

        diagnostics.push(Diagnostic {
            range: document.line_index.span_to_range(&issue.range),
            severity: Some(severity),
            code: None,
            code_description: None,
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: issue.text.clone(),
            related_information: None,
            tags: None,
            data: None,
        });
    }

    diagnostics
}
