//! Go to definition, find references and document highlight.

use std::ops::Range;

use crate::document::Document;
use crate::syntax::{Unit, Usages};

use super::{HighlightListener, Location, LocationListener};

/// Declaration key followed by every referencing name, in document order.
fn occurrences(unit: &Unit, found: &Usages) -> Vec<Range<usize>> {
    let declaration = &found.declaration;
    let mut ranges = vec![declaration.key_range.clone()];

    for usage in &found.usages {
        ranges.extend(
            unit.referenced_names(usage)
                .into_iter()
                .filter(|(name, _)| *name == declaration.name)
                .map(|(_, range)| range),
        );
    }

    ranges
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefinitionProvider;

impl LocationListener for DefinitionProvider {
    fn locations(&self, document: &Document, offset: usize) -> Vec<Location> {
        let unit = Unit::parse(document.text());
        let declaration = match unit.reference_at(offset) {
            Some((declaration, _)) => declaration,
            None => match unit.declaration_at(offset) {
                Some(declaration) => declaration,
                None => return Vec::new(),
            },
        };

        vec![Location {
            uri: document.uri.clone(),
            range: declaration.key_range.clone(),
        }]
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReferencesProvider;

impl LocationListener for ReferencesProvider {
    fn locations(&self, document: &Document, offset: usize) -> Vec<Location> {
        let unit = Unit::parse(document.text());
        let Some(found) = unit.find_usages(offset) else {
            return Vec::new();
        };

        occurrences(&unit, &found)
            .into_iter()
            .map(|range| Location {
                uri: document.uri.clone(),
                range,
            })
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HighlightProvider;

impl HighlightListener for HighlightProvider {
    fn highlights(&self, document: &Document, offset: usize) -> Vec<Range<usize>> {
        let unit = Unit::parse(document.text());
        unit.find_usages(offset)
            .map(|found| occurrences(&unit, &found))
            .unwrap_or_default()
    }
}
