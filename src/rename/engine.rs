//! Rename resolution: classify the cursor, collect usages, emit edits.

use std::ops::Range;

use tower_lsp::lsp_types::Url;
use tracing::debug;

use crate::document::Document;
use crate::syntax::{annotation_name, Attribute, Declaration, LocationKind, NodeId, Unit};

use super::edit::{EditList, TextEdit};
use super::error::RenameError;
use super::rewrite::rename_in_attribute;

/// New text for one document after a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedDocument {
    pub uri: Url,
    /// The full document text after every edit.
    pub text: String,
    /// The applied edits, in original offsets, highest first.
    pub edits: Vec<TextEdit>,
}

/// What a rename at some offset would change.
#[derive(Debug)]
struct RenameTarget {
    declaration: Declaration,
    /// The name currently written in the document.
    old_name: String,
    usages: Vec<Attribute>,
    /// The token under the cursor.
    token: Range<usize>,
}

/// Computes rename edits for a single document. Holds no state between
/// requests: every call parses the current text.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenameEngine;

impl RenameEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rename the symbol at `offset` to `new_name`.
    ///
    /// Returns an empty vector when the cursor is not on something renamable.
    pub fn rename(
        &self,
        document: &Document,
        offset: usize,
        new_name: &str,
    ) -> Result<Vec<ChangedDocument>, RenameError> {
        if new_name.trim().is_empty() {
            return Err(RenameError::EmptyName);
        }

        let unit = Unit::parse(document.text());
        let Some(target) = resolve(&unit, offset) else {
            debug!(component = "rename", uri = %document.uri, offset, "nothing to rename");
            return Ok(Vec::new());
        };

        let declaration = &target.declaration;
        let collides = unit.declarations().iter().any(|d| {
            d.kind == declaration.kind && d.name == new_name && d.key_range != declaration.key_range
        });
        if collides {
            return Err(RenameError::NameCollision {
                name: new_name.to_string(),
                kind: declaration.kind,
            });
        }

        // Usages go from the end of the document toward the start, then the
        // declaring key.
        let mut edits = EditList::new();
        for usage in target.usages.iter().rev() {
            rename_in_attribute(&unit, usage, &target.old_name, new_name, &mut edits);
        }
        edits.push(TextEdit::replace(declaration.key_range.clone(), new_name));

        debug!(
            component = "rename",
            uri = %document.uri,
            from = %target.old_name,
            to = new_name,
            usages = target.usages.len(),
            "renaming"
        );

        let (text, edits) = edits.apply(unit.text());
        Ok(vec![ChangedDocument {
            uri: document.uri.clone(),
            text,
            edits,
        }])
    }

    /// The range of the renamable token at `offset`, if any.
    pub fn prepare(&self, document: &Document, offset: usize) -> Option<Range<usize>> {
        let unit = Unit::parse(document.text());
        resolve(&unit, offset).map(|target| target.token)
    }
}

fn resolve(unit: &Unit, offset: usize) -> Option<RenameTarget> {
    let text = unit.text();
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let adjusted = adjust_offset(text, offset);
    let node = context_node(unit, adjusted);

    match unit.completion_kind(offset) {
        // Keys inside a flow mapping sit in value position on their line.
        LocationKind::Value => value_target(unit, node, adjusted)
            .or_else(|| flow_key_target(unit, node, adjusted)),
        LocationKind::Key | LocationKind::SequenceKey => key_target(unit, node, offset),
        _ => None,
    }
}

/// Move left over spaces and tabs that follow a token on the same line, so a
/// cursor placed just after a name still resolves to it.
fn adjust_offset(text: &str, offset: usize) -> usize {
    let before = text[..offset].trim_end_matches([' ', '\t']);
    if before.len() == offset || before.is_empty() || before.ends_with('\n') {
        return offset;
    }
    before
        .char_indices()
        .next_back()
        .map_or(offset, |(index, _)| index)
}

fn context_node(unit: &Unit, offset: usize) -> NodeId {
    let tree = unit.tree();
    let node = unit.node_at_offset(offset).unwrap_or(tree.root());

    // Right at the end of an example, the cursor belongs to the enclosing node.
    if unit.is_example_node(node) {
        let end = tree.node(node).range.end;
        if end == offset && unit.text()[end..].starts_with('\n') {
            return tree.parent(node).unwrap_or(node);
        }
    }
    node
}

fn value_target(unit: &Unit, node: NodeId, offset: usize) -> Option<RenameTarget> {
    let attr = unit
        .attributes(node)
        .into_iter()
        .find(|a| a.range.start < offset && offset <= a.range.end && !a.is_key)?;
    let value = attr.value.as_ref()?;
    let name = annotation_name(value.text()).unwrap_or(value.text());

    let declaration = unit
        .reference_targets(&attr)
        .into_iter()
        .find(|d| d.name == name)?
        .clone();
    let usages = unit.usages_of(&declaration);

    Some(RenameTarget {
        old_name: declaration.name.clone(),
        token: attr.value_span.clone(),
        declaration,
        usages,
    })
}

fn key_target(unit: &Unit, node: NodeId, offset: usize) -> Option<RenameTarget> {
    let key = unit.tree().node(node).key.as_ref()?;
    let found = unit.find_usages(offset)?;
    if found.declaration.name != key.text {
        return None;
    }

    Some(RenameTarget {
        old_name: key.text.clone(),
        token: key.range.clone(),
        declaration: found.declaration,
        usages: found.usages,
    })
}

fn flow_key_target(unit: &Unit, node: NodeId, offset: usize) -> Option<RenameTarget> {
    let key = unit.tree().node(node).key.as_ref()?;
    if offset < key.range.start || offset > key.range.end {
        return None;
    }
    key_target(unit, node, offset)
}
