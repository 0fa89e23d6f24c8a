use std::collections::BTreeMap;

use crate::document::Document;
use crate::syntax::{DeclarationKind, NodeId, Unit};

use super::{StructureCategory, StructureListener, StructureNode};

/// Outline of resources and declarations.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructureProvider;

impl StructureProvider {
    fn category(kind: DeclarationKind) -> StructureCategory {
        match kind {
            DeclarationKind::Type => StructureCategory::SchemasAndTypes,
            DeclarationKind::Trait | DeclarationKind::ResourceType => {
                StructureCategory::ResourceTypesAndTraits
            }
            DeclarationKind::AnnotationType | DeclarationKind::SecurityScheme => {
                StructureCategory::Other
            }
        }
    }

    /// Full path of a resource, e.g. `/users/{id}` for a nested `/{id}`.
    fn resource_path(unit: &Unit, id: NodeId) -> String {
        let tree = unit.tree();
        let mut segments: Vec<&str> = std::iter::once(id)
            .chain(tree.ancestors(id))
            .filter_map(|n| tree.key_text(n))
            .filter(|k| k.starts_with('/'))
            .collect();
        segments.reverse();
        segments.concat()
    }
}

impl StructureListener for StructureProvider {
    fn structure(&self, document: &Document) -> BTreeMap<StructureCategory, StructureNode> {
        let unit = Unit::parse(document.text());
        let whole = 0..unit.text().len();

        let mut categories: BTreeMap<StructureCategory, StructureNode> = [
            StructureCategory::Resources,
            StructureCategory::ResourceTypesAndTraits,
            StructureCategory::SchemasAndTypes,
            StructureCategory::Other,
        ]
        .into_iter()
        .map(|category| {
            let root = StructureNode {
                text: category.label().to_string(),
                range: whole.clone(),
                children: Vec::new(),
            };
            (category, root)
        })
        .collect();

        for id in unit.resources() {
            let node = unit.tree().node(id);
            if let Some(root) = categories.get_mut(&StructureCategory::Resources) {
                root.children.push(StructureNode {
                    text: Self::resource_path(&unit, id),
                    range: node.range.clone(),
                    children: Vec::new(),
                });
            }
        }

        for declaration in unit.declarations() {
            let node = unit.tree().node(declaration.node);
            if let Some(root) = categories.get_mut(&Self::category(declaration.kind)) {
                root.children.push(StructureNode {
                    text: declaration.name.clone(),
                    range: node.range.clone(),
                    children: Vec::new(),
                });
            }
        }

        categories
    }
}
