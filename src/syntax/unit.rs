//! A parsed document and the queries the language features run against it.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::location::{determine_completion_kind, LocationKind};
use super::model::{
    annotation_name, AttrValue, Attribute, Declaration, DeclarationKind, StructuredNode,
    StructuredValue, Usages,
};
use super::parser::{NodeId, Tree, Value};

/// A name inside a type expression such as `User[] | Admin`.
static NAME_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\s\[\]|(),?!<>{}]+").unwrap());

/// Property names whose values name other declarations.
fn is_reference_property(name: &str) -> bool {
    annotation_name(name).is_some()
        || matches!(name, "type" | "is" | "securedBy" | "schema" | "items")
}

/// One document's tree plus its declarations. Rebuilt for every query.
#[derive(Debug, Clone)]
pub struct Unit {
    text: String,
    tree: Tree,
    declarations: Vec<Declaration>,
}

impl Unit {
    pub fn parse(text: &str) -> Self {
        let tree = Tree::parse(text);
        let declarations = collect_declarations(&tree);
        Self {
            text: text.to_string(),
            tree,
            declarations,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn declaration(&self, kind: DeclarationKind, name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.kind == kind && d.name == name)
    }

    pub fn declaration_for_node(&self, id: NodeId) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.node == id)
    }

    /// Declaration whose key contains `offset` (end inclusive).
    pub fn declaration_at(&self, offset: usize) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.key_range.start <= offset && offset <= d.key_range.end)
    }

    pub fn completion_kind(&self, offset: usize) -> LocationKind {
        determine_completion_kind(&self.text, offset)
    }

    /// `example` entries and the children of `examples`.
    pub fn is_example_node(&self, id: NodeId) -> bool {
        if self.tree.key_text(id) == Some("example") {
            return true;
        }
        self.tree
            .parent(id)
            .is_some_and(|p| self.tree.key_text(p) == Some("examples"))
    }

    fn is_high_level(&self, id: NodeId) -> bool {
        if self.declaration_for_node(id).is_some() || self.is_example_node(id) {
            return true;
        }
        let node = self.tree.node(id);
        match node.value {
            Value::Mapping(_) => true,
            Value::Sequence(_) => false,
            Value::Scalar(_) | Value::Empty { .. } => {
                node.key.is_some()
                    && node
                        .parent
                        .is_some_and(|p| self.tree.node(p).seq_item)
            }
        }
    }

    /// Deepest high-level node whose range contains `offset`.
    pub fn node_at_offset(&self, offset: usize) -> Option<NodeId> {
        if offset > self.text.len() {
            return None;
        }

        let mut best = self.tree.root();
        let mut current = self.tree.root();
        'descend: loop {
            for &child in self.tree.children(current) {
                let range = &self.tree.node(child).range;
                if range.start <= offset && offset <= range.end {
                    if self.is_high_level(child) {
                        best = child;
                    }
                    current = child;
                    continue 'descend;
                }
            }
            break;
        }

        Some(best)
    }

    /// Attributes of a high-level node in declaration order. The node's own
    /// key comes first as a key-role attribute.
    pub fn attributes(&self, id: NodeId) -> Vec<Attribute> {
        let node = self.tree.node(id);
        let mut attrs = Vec::new();

        if let Some(key) = &node.key {
            attrs.push(Attribute {
                name: "name".to_string(),
                name_range: key.range.clone(),
                range: key.range.clone(),
                value: Some(AttrValue::Scalar(key.clone())),
                value_span: key.range.clone(),
                is_key: true,
                owner: id,
            });
        }

        match &node.value {
            Value::Mapping(children) => {
                for &child in children {
                    self.push_child_attributes(id, child, &mut attrs);
                }
            }
            // `Name: Base` and `Name: [A, B]` declare the type inline.
            Value::Scalar(_) | Value::Sequence(_) if self.declaration_for_node(id).is_some() => {
                self.push_child_attributes(node.parent.unwrap_or(id), id, &mut attrs);
                for attr in &mut attrs[1..] {
                    attr.name = "type".to_string();
                    attr.owner = id;
                }
            }
            _ => {}
        }

        attrs
    }

    fn push_child_attributes(&self, owner: NodeId, child: NodeId, attrs: &mut Vec<Attribute>) {
        let node = self.tree.node(child);
        let Some(key) = &node.key else {
            return;
        };

        let attribute = |range: Range<usize>, value: Option<AttrValue>, value_span: Range<usize>| {
            Attribute {
                name: key.text.clone(),
                name_range: key.range.clone(),
                range,
                value,
                value_span,
                is_key: false,
                owner,
            }
        };

        match &node.value {
            Value::Scalar(scalar) => attrs.push(attribute(
                node.range.clone(),
                Some(AttrValue::Scalar(scalar.clone())),
                scalar.range.clone(),
            )),
            // An annotation applied without a value is still named by its key.
            Value::Empty { at } if annotation_name(&key.text).is_some() => {
                let structured = StructuredValue {
                    value_name: key.text.clone(),
                    name_range: key.range.clone(),
                    range: *at..*at,
                    node: child,
                };
                attrs.push(attribute(
                    node.range.clone(),
                    Some(AttrValue::Structured(structured)),
                    *at..*at,
                ));
            }
            Value::Empty { at } => attrs.push(attribute(node.range.clone(), None, *at..*at)),
            Value::Sequence(items) => {
                for &item in items {
                    let item_node = self.tree.node(item);
                    match &item_node.value {
                        Value::Scalar(scalar) => attrs.push(attribute(
                            item_node.range.clone(),
                            Some(AttrValue::Scalar(scalar.clone())),
                            scalar.range.clone(),
                        )),
                        Value::Mapping(entries) => {
                            if let Some(structured) = self.leading_structured(entries) {
                                let span = structured.range.clone();
                                attrs.push(attribute(
                                    item_node.range.clone(),
                                    Some(AttrValue::Structured(structured)),
                                    span,
                                ));
                            }
                        }
                        _ => {}
                    }
                }
            }
            Value::Mapping(entries) if is_reference_property(&key.text) => {
                let structured = if annotation_name(&key.text).is_some() {
                    Some(StructuredValue {
                        value_name: key.text.clone(),
                        name_range: key.range.clone(),
                        range: self.span_of(entries).unwrap_or(node.range.clone()),
                        node: child,
                    })
                } else {
                    self.leading_structured(entries)
                };
                if let Some(structured) = structured {
                    let span = structured.range.clone();
                    attrs.push(attribute(
                        node.range.clone(),
                        Some(AttrValue::Structured(structured)),
                        span,
                    ));
                }
            }
            Value::Mapping(_) => {}
        }
    }

    /// A mapping value named by its first key, e.g. `paged: { size: 10 }`.
    fn leading_structured(&self, entries: &[NodeId]) -> Option<StructuredValue> {
        let &first = entries.first()?;
        let key = self.tree.node(first).key.as_ref()?;
        Some(StructuredValue {
            value_name: key.text.clone(),
            name_range: key.range.clone(),
            range: self.span_of(entries)?,
            node: first,
        })
    }

    fn span_of(&self, entries: &[NodeId]) -> Option<Range<usize>> {
        let first = self.tree.node(*entries.first()?);
        let last = self.tree.node(*entries.last()?);
        Some(first.range.start..last.range.end)
    }

    fn in_resource_context(&self, owner: NodeId) -> bool {
        self.tree.key_text(owner).is_some_and(|k| k.starts_with('/'))
            || self
                .declaration_for_node(owner)
                .is_some_and(|d| d.kind == DeclarationKind::ResourceType)
    }

    /// The kind of declaration a property of `owner` refers to, if any.
    pub fn property_kind(&self, owner: NodeId, name: &str, scalar: bool) -> Option<DeclarationKind> {
        if annotation_name(name).is_some() {
            return Some(DeclarationKind::AnnotationType);
        }
        let owner_kind = self.declaration_for_node(owner).map(|d| d.kind);
        match name {
            // `type: OAuth 2.0` names a scheme type, not a declaration.
            "type" if owner_kind == Some(DeclarationKind::SecurityScheme) => None,
            "is" => Some(DeclarationKind::Trait),
            "securedBy" => Some(DeclarationKind::SecurityScheme),
            "type" if self.in_resource_context(owner) => Some(DeclarationKind::ResourceType),
            "type" | "schema" | "items" => Some(DeclarationKind::Type),
            _ if scalar && self.tree.key_text(owner) == Some("properties") => {
                Some(DeclarationKind::Type)
            }
            _ => None,
        }
    }

    /// The kind of declaration an attribute refers to, if any.
    pub fn reference_kind(&self, attr: &Attribute) -> Option<DeclarationKind> {
        if attr.is_key {
            return None;
        }
        let scalar = matches!(attr.value, Some(AttrValue::Scalar(_)));
        self.property_kind(attr.owner, &attr.name, scalar)
    }

    /// Names an attribute refers to, with the byte range of each name.
    pub fn referenced_names(&self, attr: &Attribute) -> Vec<(String, Range<usize>)> {
        let Some(kind) = self.reference_kind(attr) else {
            return Vec::new();
        };

        if kind == DeclarationKind::AnnotationType {
            return match annotation_name(&attr.name) {
                Some(name) => vec![(
                    name.to_string(),
                    attr.name_range.start + 1..attr.name_range.end - 1,
                )],
                None => Vec::new(),
            };
        }

        match &attr.value {
            Some(AttrValue::Scalar(scalar)) => {
                // Multi-line flow mappings stay scalars and name nothing.
                let inline_schema = scalar.text.starts_with('!')
                    || scalar.text.contains('{')
                    || (kind == DeclarationKind::Type && scalar.text.contains(['<', '\n']));
                if inline_schema {
                    return Vec::new();
                }
                NAME_TOKEN
                    .find_iter(&scalar.text)
                    .map(|m| {
                        (
                            m.as_str().to_string(),
                            scalar.range.start + m.start()..scalar.range.start + m.end(),
                        )
                    })
                    .collect()
            }
            // Structured `type` values are inline type declarations.
            Some(AttrValue::Structured(structured)) if kind != DeclarationKind::Type => {
                vec![(structured.value_name.clone(), structured.name_range.clone())]
            }
            _ => Vec::new(),
        }
    }

    /// Declarations the attribute's property can refer to.
    pub fn reference_targets(&self, attr: &Attribute) -> Vec<&Declaration> {
        let Some(kind) = self.reference_kind(attr) else {
            return Vec::new();
        };
        self.declarations.iter().filter(|d| d.kind == kind).collect()
    }

    /// Every referencing attribute in the unit, in document order.
    pub fn references(&self) -> Vec<(Attribute, DeclarationKind)> {
        let mut references = Vec::new();

        for id in self.tree.ids() {
            let owns_attributes = matches!(self.tree.node(id).value, Value::Mapping(_))
                || self.declaration_for_node(id).is_some();
            if !owns_attributes {
                continue;
            }
            for attr in self.attributes(id) {
                if let Some(kind) = self.reference_kind(&attr) {
                    references.push((attr, kind));
                }
            }
        }

        references.sort_by_key(|(attr, _)| attr.range.start);
        references
    }

    /// The declaration referenced by the name under `offset`, with the name's range.
    pub fn reference_at(&self, offset: usize) -> Option<(&Declaration, Range<usize>)> {
        for (attr, kind) in self.references() {
            for (name, range) in self.referenced_names(&attr) {
                if range.start <= offset && offset <= range.end {
                    if let Some(declaration) = self.declaration(kind, &name) {
                        return Some((declaration, range));
                    }
                }
            }
        }
        None
    }

    /// Attributes referencing `declaration`, in document order.
    pub fn usages_of(&self, declaration: &Declaration) -> Vec<Attribute> {
        self.references()
            .into_iter()
            .filter(|(attr, kind)| {
                *kind == declaration.kind
                    && self
                        .referenced_names(attr)
                        .iter()
                        .any(|(name, _)| *name == declaration.name)
            })
            .map(|(attr, _)| attr)
            .collect()
    }

    /// Resolve the symbol at `offset` (a declaration key or a reference to
    /// one) and collect its usages.
    pub fn find_usages(&self, offset: usize) -> Option<Usages> {
        let declaration = match self.declaration_at(offset) {
            Some(declaration) => declaration.clone(),
            None => self.reference_at(offset)?.0.clone(),
        };
        let usages = self.usages_of(&declaration);
        Some(Usages {
            declaration,
            usages,
        })
    }

    /// Convert a structured value to the high-level node of the declaration
    /// it names. `None` when the name does not resolve.
    pub fn structured_to_high_level(
        &self,
        attr: &Attribute,
        structured: &StructuredValue,
    ) -> Option<StructuredNode> {
        let kind = self.reference_kind(attr)?;
        let name = if kind == DeclarationKind::AnnotationType {
            annotation_name(&structured.value_name)?
        } else {
            structured.value_name.as_str()
        };
        let definition = self.declaration(kind, name)?.clone();

        Some(StructuredNode {
            definition,
            name_range: structured.name_range.clone(),
            attributes: self.attributes(structured.node),
        })
    }

    /// Resource nodes (keys starting with `/`), in document order.
    pub fn resources(&self) -> Vec<NodeId> {
        self.tree
            .ids()
            .filter(|&id| self.tree.key_text(id).is_some_and(|k| k.starts_with('/')))
            .collect()
    }
}

fn collect_declarations(tree: &Tree) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    for &section in tree.children(tree.root()) {
        let Some(kind) = tree.key_text(section).and_then(DeclarationKind::from_section) else {
            continue;
        };
        for &entry in tree.children(section) {
            let node = tree.node(entry);
            // `- Name: ...` lists are accepted as well as mappings.
            let named: Vec<NodeId> = if node.seq_item {
                node.children().to_vec()
            } else {
                vec![entry]
            };
            for id in named {
                if let Some(key) = &tree.node(id).key {
                    declarations.push(Declaration {
                        name: key.text.clone(),
                        kind,
                        key_range: key.range.clone(),
                        node: id,
                    });
                }
            }
        }
    }

    declarations
}
