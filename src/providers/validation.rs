use std::collections::HashSet;

use crate::document::Document;
use crate::syntax::{DeclarationKind, Unit, BUILTIN_TYPES};

use super::{IssueType, ValidationIssue, ValidationListener, ValidationReport};

/// Reports references to undeclared names and duplicate declarations.
#[derive(Debug, Clone)]
pub struct ValidationProvider {
    unresolved: IssueType,
    extra_types: Vec<String>,
}

impl Default for ValidationProvider {
    fn default() -> Self {
        Self {
            unresolved: IssueType::Error,
            extra_types: Vec::new(),
        }
    }
}

impl ValidationProvider {
    pub fn new(unresolved: IssueType, extra_types: Vec<String>) -> Self {
        Self {
            unresolved,
            extra_types,
        }
    }

    fn is_known_type(&self, name: &str) -> bool {
        BUILTIN_TYPES.contains(&name) || self.extra_types.iter().any(|t| t == name)
    }
}

impl ValidationListener for ValidationProvider {
    fn validate(&self, document: &Document) -> ValidationReport {
        let unit = Unit::parse(document.text());
        let mut issues = Vec::new();

        for (attr, kind) in unit.references() {
            for (name, range) in unit.referenced_names(&attr) {
                // Library-qualified names (`lib.Type`) are resolved elsewhere.
                if name.contains('.') || unit.declaration(kind, &name).is_some() {
                    continue;
                }
                if kind == DeclarationKind::Type && self.is_known_type(&name) {
                    continue;
                }
                issues.push(ValidationIssue {
                    text: format!("Reference to undeclared {kind} '{name}'"),
                    range,
                    issue_type: self.unresolved,
                    file_path: None,
                });
            }
        }

        let mut seen = HashSet::new();
        for declaration in unit.declarations() {
            if !seen.insert((declaration.kind, declaration.name.as_str())) {
                issues.push(ValidationIssue {
                    text: format!("Duplicate {} '{}'", declaration.kind, declaration.name),
                    range: declaration.key_range.clone(),
                    issue_type: IssueType::Warning,
                    file_path: None,
                });
            }
        }

        issues.sort_by_key(|issue| issue.range.start);
        ValidationReport {
            point_of_view: document.uri.clone(),
            issues,
        }
    }
}
