//! Outline conversion from structure categories to flat symbol lists.

use std::collections::BTreeMap;

use tower_lsp::lsp_types::{Location, SymbolInformation, SymbolKind};

use crate::document::Document;
use crate::providers::{StructureCategory, StructureNode};

/// Symbol kind reported for every item of a category.
pub fn symbol_kind(category: StructureCategory) -> SymbolKind {
    match category {
        StructureCategory::Resources => SymbolKind::FUNCTION,
        StructureCategory::ResourceTypesAndTraits => SymbolKind::INTERFACE,
        StructureCategory::SchemasAndTypes => SymbolKind::CLASS,
        StructureCategory::Other => SymbolKind::CONSTANT,
    }
}

/// Flatten the direct children of each category root into symbols.
pub fn to_symbols(
    structure: &BTreeMap<StructureCategory, StructureNode>,
    document: &Document,
) -> Vec<SymbolInformation> {
    let mut symbols = Vec::new();

    for (&category, root) in structure {
        let kind = symbol_kind(category);
        for item in &root.children {
            #[allow(deprecated)]
            let symbol = SymbolInformation {
                name: item.text.clone(),
                kind,
                tags: None,
                deprecated: None,
                location: Location {
                    uri: document.uri.clone(),
                    range: document.line_index.span_to_range(&item.range),
                },
                container_name: Some(root.text.clone()),
            };
            symbols.push(symbol);
        }
    }

    symbols
}
