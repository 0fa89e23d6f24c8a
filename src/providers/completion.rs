use crate::document::Document;
use crate::syntax::{DeclarationKind, LocationKind, NodeId, Unit, BUILTIN_TYPES};

use super::{CompletionListener, Suggestion};

/// Keys allowed at the root of a document.
const ROOT_KEYS: &[&str] = &[
    "title",
    "description",
    "version",
    "baseUri",
    "baseUriParameters",
    "protocols",
    "mediaType",
    "documentation",
    "schemas",
    "types",
    "traits",
    "resourceTypes",
    "annotationTypes",
    "securitySchemes",
    "securedBy",
    "uses",
];

/// Declaration names in value positions, root keys in key positions.
#[derive(Debug, Default, Clone)]
pub struct CompletionProvider {
    extra_types: Vec<String>,
}

impl CompletionProvider {
    pub fn new(extra_types: Vec<String>) -> Self {
        Self { extra_types }
    }

    /// The entry whose value is being edited on the cursor's line.
    fn entry_on_line(unit: &Unit, offset: usize) -> Option<NodeId> {
        let text = unit.text();
        let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let tree = unit.tree();

        let last = tree
            .ids()
            .filter(|&id| {
                let start = tree.node(id).range.start;
                id != tree.root() && line_start <= start && start <= offset
            })
            .last()?;

        let node = tree.node(last);
        if node.key.is_some() {
            Some(last)
        } else if node.seq_item {
            tree.parent(last)
        } else {
            None
        }
    }

    fn value_suggestions(&self, unit: &Unit, offset: usize) -> Vec<Suggestion> {
        let tree = unit.tree();
        let Some(entry) = Self::entry_on_line(unit, offset) else {
            return Vec::new();
        };
        let (Some(owner), Some(name)) = (tree.parent(entry), tree.key_text(entry)) else {
            return Vec::new();
        };
        let Some(kind) = unit.property_kind(owner, name, true) else {
            return Vec::new();
        };

        let mut names: Vec<String> = unit
            .declarations()
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.name.clone())
            .collect();
        if kind == DeclarationKind::Type {
            names.extend(BUILTIN_TYPES.iter().map(|t| t.to_string()));
            names.extend(self.extra_types.iter().cloned());
        }

        names
            .into_iter()
            .map(|name| Suggestion {
                text: Some(name),
                display_text: None,
            })
            .collect()
    }

    fn root_key_suggestions(unit: &Unit, offset: usize) -> Vec<Suggestion> {
        let text = unit.text();
        let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        if text[line_start..offset].starts_with([' ', '\t']) {
            return Vec::new();
        }

        let tree = unit.tree();
        let present: Vec<&str> = tree
            .children(tree.root())
            .iter()
            .filter(|&&id| {
                let range = &tree.node(id).range;
                // The key being typed does not count as present.
                !(range.start <= offset && offset <= range.end)
            })
            .filter_map(|&id| tree.key_text(id))
            .collect();

        ROOT_KEYS
            .iter()
            .filter(|key| !present.contains(key))
            .map(|key| Suggestion {
                text: Some(key.to_string()),
                display_text: None,
            })
            .collect()
    }

    fn annotation_suggestions(unit: &Unit) -> Vec<Suggestion> {
        unit.declarations()
            .iter()
            .filter(|d| d.kind == DeclarationKind::AnnotationType)
            .map(|d| Suggestion {
                text: Some(d.name.clone()),
                display_text: Some(format!("({})", d.name)),
            })
            .collect()
    }
}

impl CompletionListener for CompletionProvider {
    fn suggestions(&self, document: &Document, offset: usize) -> Vec<Suggestion> {
        let unit = Unit::parse(document.text());
        let text = unit.text();
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        match unit.completion_kind(offset) {
            LocationKind::Value => self.value_suggestions(&unit, offset),
            LocationKind::Key => Self::root_key_suggestions(&unit, offset),
            LocationKind::Annotation => Self::annotation_suggestions(&unit),
            _ => Vec::new(),
        }
    }
}
