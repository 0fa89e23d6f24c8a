//! Indentation-based parser for RAML documents.
//!
//! Produces the low-level tree: an arena of nodes carrying keys, values and
//! byte ranges. The parser never fails. Lines it cannot interpret become
//! keyless scalar nodes so every piece of text stays covered by the tree.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// `key:` at the start of a line's content, with an optional quoted key.
pub(crate) static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<plain>[^\s#'"\[\]{},:][^#]*?))[ \t]*:(?:[ \t]|$)"#)
        .unwrap()
});

/// Block scalar indicators: `|`, `>`, with optional chomping and indentation hints.
static BLOCK_SCALAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[|>][-+]?\d*$").unwrap());

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A scalar with the byte range of its text (quotes excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub text: String,
    pub range: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `key:` with nothing after it. `at` is the offset right after the colon.
    Empty { at: usize },
    Scalar(Scalar),
    Mapping(Vec<NodeId>),
    Sequence(Vec<NodeId>),
}

impl Value {
    pub fn children(&self) -> &[NodeId] {
        match self {
            Value::Mapping(children) | Value::Sequence(children) => children,
            Value::Empty { .. } | Value::Scalar(_) => &[],
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub key: Option<Scalar>,
    pub value: Value,
    /// From the key (or the `-` of a sequence item) to the end of the value.
    pub range: Range<usize>,
    /// Introduced by `- ` or an element of a flow sequence.
    pub seq_item: bool,
}

impl Node {
    pub fn key_text(&self) -> Option<&str> {
        self.key.as_ref().map(|k| k.text.as_str())
    }

    pub fn children(&self) -> &[NodeId] {
        self.value.children()
    }
}

/// The low-level tree of a document. Nodes are stored in document order.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn parse(text: &str) -> Self {
        let mut parser = Parser::new(text);
        parser.parse_root();
        Self {
            nodes: parser.nodes,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn key_text(&self, id: NodeId) -> Option<&str> {
        self.node(id).key_text()
    }

    /// Every node id, in document order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

/// Byte offset of a trailing `#` comment within a line, ignoring `#` inside
/// quoted scalars.
pub(crate) fn comment_start(line: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    for (i, c) in line.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                let at_token_start = prev
                    .map_or(true, |p| p.is_whitespace() || matches!(p, '[' | '{' | ',' | ':'));
                if (c == '"' || c == '\'') && at_token_start {
                    quote = Some(c);
                } else if c == '#' && prev.map_or(true, char::is_whitespace) {
                    return Some(i);
                }
            }
        }
        prev = Some(c);
    }

    None
}

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    /// Leading whitespace width in bytes.
    indent: usize,
    /// End of the content with trailing comment and whitespace removed.
    content_end: usize,
    /// End of the line with trailing whitespace removed (comments kept).
    trimmed_end: usize,
    blank: bool,
    comment: bool,
}

impl Line {
    fn skippable(&self) -> bool {
        self.blank || self.comment
    }
}

fn scan_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut start = 0;

    loop {
        let next = text[start..].find('\n').map(|i| start + i);
        let mut end = next.unwrap_or(text.len());
        if text[start..end].ends_with('\r') {
            end -= 1;
        }

        let raw = &text[start..end];
        let indent = raw.len() - raw.trim_start_matches([' ', '\t']).len();
        let rest = &raw[indent..];
        let blank = rest.trim().is_empty();
        let comment = rest.starts_with('#');
        let content_end = match comment_start(raw) {
            Some(c) => start + raw[..c].trim_end().len(),
            None => start + raw.trim_end().len(),
        };

        lines.push(Line {
            start,
            indent,
            content_end: content_end.max(start + indent),
            trimmed_end: start + raw.trim_end().len(),
            blank,
            comment,
        });

        match next {
            Some(n) => start = n + 1,
            None => break,
        }
    }

    lines
}

fn skip_inline_whitespace(text: &str, mut pos: usize, end: usize) -> usize {
    let bytes = text.as_bytes();
    while pos < end && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    pos
}

/// Strip matching quotes from a scalar spanning `start..end`.
fn unquote(text: &str, start: usize, end: usize) -> Scalar {
    let raw = &text[start..end];
    let quoted = raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')));

    if quoted {
        Scalar {
            text: raw[1..raw.len() - 1].to_string(),
            range: start + 1..end - 1,
        }
    } else {
        Scalar {
            text: raw.to_string(),
            range: start..end,
        }
    }
}

/// The key of a [`KEY_PATTERN`] match found at `start`, and the offset right
/// after its colon.
fn captured_key(caps: &regex::Captures<'_>, start: usize) -> (Scalar, usize) {
    let key_match = caps
        .name("dq")
        .or_else(|| caps.name("sq"))
        .or_else(|| caps.name("plain"));
    let key = match key_match {
        Some(m) => Scalar {
            text: m.as_str().to_string(),
            range: start + m.start()..start + m.end(),
        },
        None => Scalar {
            text: String::new(),
            range: start..start,
        },
    };

    let whole = caps.get(0).map_or("", |m| m.as_str());
    (key, start + whole.trim_end_matches([' ', '\t']).len())
}

fn is_flow_collection(raw: &str) -> bool {
    (raw.starts_with('[') && raw.ends_with(']')) || (raw.starts_with('{') && raw.ends_with('}'))
}

struct Parser<'a> {
    text: &'a str,
    lines: Vec<Line>,
    pos: usize,
    nodes: Vec<Node>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: scan_lines(text),
            pos: 0,
            nodes: vec![Node {
                parent: None,
                key: None,
                value: Value::Empty { at: 0 },
                range: 0..text.len(),
                seq_item: false,
            }],
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn next_content(&self) -> Option<usize> {
        (self.pos..self.lines.len()).find(|&i| !self.lines[i].skippable())
    }

    fn is_dash(&self, idx: usize, col: usize) -> bool {
        let line = &self.lines[idx];
        let start = line.start + col;
        if start >= line.content_end {
            return false;
        }
        let s = &self.text[start..line.content_end];
        s == "-" || s.starts_with("- ") || s.starts_with("-\t")
    }

    fn parse_root(&mut self) {
        let root = NodeId::ROOT;
        let mut children = Vec::new();
        let mut sequence = None;

        while let Some(idx) = self.next_content() {
            let indent = self.lines[idx].indent;
            if self.is_dash(idx, indent) {
                children.extend(self.parse_sequence(root, indent));
                sequence.get_or_insert(true);
            } else {
                children.extend(self.parse_mapping(root, indent));
                sequence.get_or_insert(false);
            }
        }

        self.nodes[root.0].value = match sequence {
            None => Value::Empty { at: 0 },
            Some(true) => Value::Sequence(children),
            Some(false) => Value::Mapping(children),
        };
    }

    /// Parse the block nested under a key or a bare `-`.
    fn parse_nested(
        &mut self,
        parent: NodeId,
        indent: usize,
        allow_same_indent_sequence: bool,
        empty_at: usize,
    ) -> Value {
        let Some(idx) = self.next_content() else {
            return Value::Empty { at: empty_at };
        };
        let line = self.lines[idx];
        let dash = self.is_dash(idx, line.indent);

        if line.indent > indent || (allow_same_indent_sequence && line.indent == indent && dash) {
            if dash {
                Value::Sequence(self.parse_sequence(parent, line.indent))
            } else {
                Value::Mapping(self.parse_mapping(parent, line.indent))
            }
        } else {
            Value::Empty { at: empty_at }
        }
    }

    fn parse_mapping(&mut self, parent: NodeId, indent: usize) -> Vec<NodeId> {
        let mut entries = Vec::new();

        while let Some(idx) = self.next_content() {
            let line = self.lines[idx];
            if line.indent < indent || (line.indent == indent && self.is_dash(idx, indent)) {
                break;
            }
            // Over-indented lines are kept as entries of this mapping.
            entries.push(self.parse_entry(parent, idx, line.start + line.indent));
        }

        entries
    }

    fn parse_sequence(&mut self, parent: NodeId, indent: usize) -> Vec<NodeId> {
        let mut items = Vec::new();

        while let Some(idx) = self.next_content() {
            let line = self.lines[idx];
            if line.indent != indent || !self.is_dash(idx, indent) {
                break;
            }

            let dash_at = line.start + indent;
            let item = self.alloc(Node {
                parent: Some(parent),
                key: None,
                value: Value::Empty { at: dash_at + 1 },
                range: dash_at..dash_at + 1,
                seq_item: true,
            });

            let content_start = skip_inline_whitespace(self.text, dash_at + 1, line.content_end);
            let (value, end) = if content_start >= line.content_end {
                self.pos = idx + 1;
                let value = self.parse_nested(item, indent, false, dash_at + 1);
                let end = self.value_end(&value).unwrap_or(dash_at + 1);
                (value, end)
            } else if KEY_PATTERN.is_match(&self.text[content_start..line.content_end]) {
                let first = self.parse_entry(item, idx, content_start);
                let mut entries = vec![first];
                entries.extend(self.parse_mapping(item, content_start - line.start));
                let value = Value::Mapping(entries);
                let end = self.value_end(&value).unwrap_or(dash_at + 1);
                (value, end)
            } else {
                self.pos = idx + 1;
                self.parse_inline_value(item, content_start, line.content_end, indent)
            };

            let node = &mut self.nodes[item.0];
            node.value = value;
            node.range = dash_at..end;
            items.push(item);
        }

        items
    }

    /// Parse a `key: value` entry whose key starts at byte offset `key_start` on line `idx`.
    fn parse_entry(&mut self, parent: NodeId, idx: usize, key_start: usize) -> NodeId {
        let line = self.lines[idx];
        let key_col = key_start - line.start;
        let id = self.alloc(Node {
            parent: Some(parent),
            key: None,
            value: Value::Empty {
                at: line.content_end,
            },
            range: key_start..line.content_end,
            seq_item: false,
        });
        self.pos = idx + 1;

        let text = self.text;
        let content = &text[key_start..line.content_end];
        let Some(caps) = KEY_PATTERN.captures(content) else {
            let (scalar, end) = self.plain_scalar(key_start, line.content_end, key_col);
            let node = &mut self.nodes[id.0];
            node.value = Value::Scalar(scalar);
            node.range = key_start..end;
            return id;
        };

        let (key, colon_end) = captured_key(&caps, key_start);
        let value_start = skip_inline_whitespace(text, colon_end, line.content_end);

        let (value, end) = if value_start >= line.content_end {
            let value = self.parse_nested(id, key_col, true, colon_end);
            let end = self.value_end(&value).unwrap_or(colon_end);
            (value, end)
        } else {
            self.parse_inline_value(id, value_start, line.content_end, key_col)
        };

        let node = &mut self.nodes[id.0];
        node.key = Some(key);
        node.value = value;
        node.range = key_start..end;
        id
    }

    /// Parse a value that starts on the same line as its key.
    fn parse_inline_value(
        &mut self,
        parent: NodeId,
        start: usize,
        end: usize,
        indent: usize,
    ) -> (Value, usize) {
        let text = self.text;
        let raw = &text[start..end];

        if BLOCK_SCALAR.is_match(raw) {
            let scalar = self.block_scalar(end, indent);
            let value_end = scalar.range.end.max(end);
            return (Value::Scalar(scalar), value_end);
        }

        if is_flow_collection(raw) {
            return (self.flow_value(parent, start, end), end);
        }

        let (scalar, value_end) = self.plain_scalar(start, end, indent);
        (Value::Scalar(scalar), value_end)
    }

    /// A plain or quoted scalar, extended over more-indented continuation lines.
    fn plain_scalar(&mut self, start: usize, end: usize, indent: usize) -> (Scalar, usize) {
        let mut end = end;

        while let Some(idx) = self.next_content() {
            let line = self.lines[idx];
            if line.indent <= indent {
                break;
            }
            end = line.content_end;
            self.pos = idx + 1;
        }

        (unquote(self.text, start, end), end)
    }

    /// Lines of a `|` or `>` block scalar: everything more indented than the key.
    fn block_scalar(&mut self, indicator_end: usize, indent: usize) -> Scalar {
        let mut first = None;
        let mut last = None;

        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if !line.blank && line.indent <= indent {
                break;
            }
            if !line.blank {
                first.get_or_insert(line.start + line.indent);
                last = Some(line.trimmed_end);
            }
            self.pos += 1;
        }

        match (first, last) {
            (Some(first), Some(last)) => Scalar {
                text: self.text[first..last].to_string(),
                range: first..last,
            },
            _ => Scalar {
                text: String::new(),
                range: indicator_end..indicator_end,
            },
        }
    }

    /// A single-line value that may be a flow collection.
    fn flow_value(&mut self, parent: NodeId, start: usize, end: usize) -> Value {
        let text = self.text;
        let raw = &text[start..end];
        if raw.starts_with('{') && raw.ends_with('}') {
            Value::Mapping(self.flow_mapping(parent, start, end))
        } else if raw.starts_with('[') && raw.ends_with(']') {
            Value::Sequence(self.flow_sequence(parent, start, end))
        } else {
            Value::Scalar(unquote(text, start, end))
        }
    }

    /// Top-level elements of the flow collection spanning `start..end`, as
    /// `(delimiter, start, end)` with surrounding whitespace trimmed.
    fn flow_segments(&self, start: usize, end: usize) -> Vec<(usize, usize, usize)> {
        let text = self.text;
        let bytes = text.as_bytes();
        let inner_start = start + 1;
        let inner_end = end - 1;

        let mut bounds = Vec::new();
        let mut depth = 0i32;
        let mut quote: Option<u8> = None;
        let mut delimiter = start;
        let mut seg_start = inner_start;
        for i in inner_start..inner_end {
            let b = bytes[i];
            if let Some(q) = quote {
                if b == q {
                    quote = None;
                }
                continue;
            }
            match b {
                b'"' | b'\'' => {
                    let opens = text[..i]
                        .trim_end()
                        .ends_with(['[', '{', ',', ':']);
                    if opens {
                        quote = Some(b);
                    }
                }
                b'[' | b'{' => depth += 1,
                b']' | b'}' => depth -= 1,
                b',' if depth == 0 => {
                    bounds.push((delimiter, seg_start, i));
                    delimiter = i;
                    seg_start = i + 1;
                }
                _ => {}
            }
        }
        bounds.push((delimiter, seg_start, inner_end));

        bounds
            .into_iter()
            .filter_map(|(delimiter, seg_start, seg_end)| {
                let item_start = skip_inline_whitespace(text, seg_start, seg_end);
                let item_end = item_start + text[item_start..seg_end].trim_end().len();
                (item_start < item_end).then_some((delimiter, item_start, item_end))
            })
            .collect()
    }

    /// Items of a single-line `[a, b]` sequence. Each item's range starts at
    /// the delimiter (`[` or `,`) preceding it.
    fn flow_sequence(&mut self, parent: NodeId, start: usize, end: usize) -> Vec<NodeId> {
        let mut items = Vec::new();

        for (delimiter, item_start, item_end) in self.flow_segments(start, end) {
            let item = self.alloc(Node {
                parent: Some(parent),
                key: None,
                value: Value::Empty { at: item_start },
                range: delimiter..item_end,
                seq_item: true,
            });
            // `[ paged: { size: 10 } ]` holds a single-pair mapping.
            let value = if KEY_PATTERN.is_match(&self.text[item_start..item_end]) {
                Value::Mapping(vec![self.flow_entry(item, item_start, item_end)])
            } else {
                self.flow_value(item, item_start, item_end)
            };
            self.nodes[item.0].value = value;
            items.push(item);
        }

        items
    }

    /// Entries of a single-line `{ a: b, c: d }` mapping.
    fn flow_mapping(&mut self, parent: NodeId, start: usize, end: usize) -> Vec<NodeId> {
        self.flow_segments(start, end)
            .into_iter()
            .map(|(_, entry_start, entry_end)| self.flow_entry(parent, entry_start, entry_end))
            .collect()
    }

    /// A `key: value` pair inside a flow collection. Elements without a key
    /// become keyless nodes.
    fn flow_entry(&mut self, parent: NodeId, start: usize, end: usize) -> NodeId {
        let text = self.text;
        let id = self.alloc(Node {
            parent: Some(parent),
            key: None,
            value: Value::Empty { at: end },
            range: start..end,
            seq_item: false,
        });

        let Some(caps) = KEY_PATTERN.captures(&text[start..end]) else {
            let value = self.flow_value(id, start, end);
            self.nodes[id.0].value = value;
            return id;
        };

        let (key, colon_end) = captured_key(&caps, start);
        let value_start = skip_inline_whitespace(text, colon_end, end);
        let value = if value_start >= end {
            Value::Empty { at: colon_end }
        } else {
            self.flow_value(id, value_start, end)
        };

        let node = &mut self.nodes[id.0];
        node.key = Some(key);
        node.value = value;
        id
    }

    fn value_end(&self, value: &Value) -> Option<usize> {
        match value {
            Value::Empty { .. } => None,
            Value::Scalar(scalar) => Some(scalar.range.end),
            Value::Mapping(children) | Value::Sequence(children) => children
                .last()
                .map(|&last| self.nodes[last.0].range.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn child_keys(tree: &Tree, id: NodeId) -> Vec<String> {
        tree.children(id)
            .iter()
            .map(|&c| tree.key_text(c).unwrap_or("-").to_string())
            .collect()
    }

    fn child(tree: &Tree, id: NodeId, key: &str) -> NodeId {
        *tree
            .children(id)
            .iter()
            .find(|&&c| tree.key_text(c) == Some(key))
            .unwrap()
    }

    #[test]
    fn parses_nested_mappings() {
        let text = indoc! {"
            #%RAML 1.0
            title: Example API
            types:
              User:
                type: object
              Id: string
        "};
        let tree = Tree::parse(text);
        let root = tree.root();

        assert_eq!(child_keys(&tree, root), vec!["title", "types"]);
        let types = child(&tree, root, "types");
        assert_eq!(child_keys(&tree, types), vec!["User", "Id"]);

        let id = child(&tree, types, "Id");
        let scalar = tree.node(id).value.as_scalar().unwrap();
        assert_eq!(scalar.text, "string");
        assert_eq!(&text[scalar.range.clone()], "string");
        assert_eq!(&text[tree.node(id).range.clone()], "Id: string");
    }

    #[test]
    fn key_ranges_cover_key_text() {
        let text = "types:\n  \"Quoted\": string\n";
        let tree = Tree::parse(text);
        let types = child(&tree, tree.root(), "types");
        let quoted = child(&tree, types, "Quoted");
        let key = tree.node(quoted).key.as_ref().unwrap();
        assert_eq!(&text[key.range.clone()], "Quoted");
    }

    #[test]
    fn parses_block_and_flow_sequences() {
        let text = indoc! {"
            /users:
              get:
                is: [secured, paged]
                securedBy:
                  - oauth
                  - basic: { scopes: [read] }
        "};
        let tree = Tree::parse(text);
        let users = child(&tree, tree.root(), "/users");
        let get = child(&tree, users, "get");

        let is = child(&tree, get, "is");
        let items: Vec<_> = tree
            .children(is)
            .iter()
            .map(|&i| tree.node(i).value.as_scalar().unwrap().text.clone())
            .collect();
        assert_eq!(items, vec!["secured", "paged"]);
        // flow items start at their delimiter
        let second = tree.children(is)[1];
        assert_eq!(&text[tree.node(second).range.clone()], ", paged");

        let secured_by = child(&tree, get, "securedBy");
        let block_items = tree.children(secured_by);
        assert_eq!(block_items.len(), 2);
        assert_eq!(&text[tree.node(block_items[0]).range.clone()], "- oauth");
        assert_eq!(child_keys(&tree, block_items[1]), vec!["basic"]);
    }

    #[test]
    fn flow_mappings_have_keyed_children() {
        let text = indoc! {r#"
            /users:
              type: { collection: { item: User, note: "a, b" } }
              is: [ paged: { size: 10 }, secured ]
              securedBy:
                - { oauth: { scopes: [read] } }
        "#};
        let tree = Tree::parse(text);
        let users = child(&tree, tree.root(), "/users");

        let type_ = child(&tree, users, "type");
        assert_eq!(child_keys(&tree, type_), vec!["collection"]);
        let collection = child(&tree, type_, "collection");
        assert_eq!(
            &text[tree.node(collection).range.clone()],
            r#"collection: { item: User, note: "a, b" }"#
        );
        assert_eq!(child_keys(&tree, collection), vec!["item", "note"]);
        let item = child(&tree, collection, "item");
        let scalar = tree.node(item).value.as_scalar().unwrap();
        assert_eq!(&text[scalar.range.clone()], "User");
        let note = child(&tree, collection, "note");
        assert_eq!(tree.node(note).value.as_scalar().unwrap().text, "a, b");

        let is = child(&tree, users, "is");
        let items = tree.children(is);
        assert_eq!(items.len(), 2);
        assert_eq!(child_keys(&tree, items[0]), vec!["paged"]);
        let paged = child(&tree, items[0], "paged");
        assert_eq!(child_keys(&tree, paged), vec!["size"]);
        assert_eq!(tree.node(items[1]).value.as_scalar().unwrap().text, "secured");

        let secured_by = child(&tree, users, "securedBy");
        let block_item = tree.children(secured_by)[0];
        assert_eq!(child_keys(&tree, block_item), vec!["oauth"]);
    }

    #[test]
    fn empty_flow_mapping_has_no_entries() {
        let tree = Tree::parse("traits:
  secured: {}
");
        let traits = child(&tree, tree.root(), "traits");
        let secured = child(&tree, traits, "secured");
        assert_eq!(tree.node(secured).value, Value::Mapping(Vec::new()));
    }

    #[test]
    fn sequence_item_mappings_continue_on_following_lines() {
        let text = indoc! {"
            traits:
              - paged:
                  pageSize: 10
                secured: {}
        "};
        let tree = Tree::parse(text);
        let traits = child(&tree, tree.root(), "traits");
        let item = tree.children(traits)[0];
        assert!(tree.node(item).seq_item);
        assert_eq!(child_keys(&tree, item), vec!["paged", "secured"]);
        let paged = child(&tree, item, "paged");
        assert_eq!(child_keys(&tree, paged), vec!["pageSize"]);
    }

    #[test]
    fn same_indent_sequence_belongs_to_key() {
        let text = "is:\n- a\n- b\ntitle: x\n";
        let tree = Tree::parse(text);
        let is = child(&tree, tree.root(), "is");
        assert_eq!(tree.children(is).len(), 2);
        assert_eq!(child_keys(&tree, tree.root()), vec!["is", "title"]);
    }

    #[test]
    fn block_scalars_swallow_key_like_lines() {
        let text = indoc! {"
            description: |
              not: a key
              # not a comment
            title: API
        "};
        let tree = Tree::parse(text);
        assert_eq!(child_keys(&tree, tree.root()), vec!["description", "title"]);
        let description = child(&tree, tree.root(), "description");
        let scalar = tree.node(description).value.as_scalar().unwrap();
        assert_eq!(scalar.text, "not: a key\n  # not a comment");
    }

    #[test]
    fn trailing_comments_and_quotes() {
        let text = "title: \"A # B\" # comment\nversion: v1 # note\n";
        let tree = Tree::parse(text);
        let title = child(&tree, tree.root(), "title");
        assert_eq!(tree.node(title).value.as_scalar().unwrap().text, "A # B");
        let version = child(&tree, tree.root(), "version");
        assert_eq!(tree.node(version).value.as_scalar().unwrap().text, "v1");
    }

    #[test]
    fn empty_values_record_insert_point() {
        let text = "types:\n  Empty:\n";
        let tree = Tree::parse(text);
        let types = child(&tree, tree.root(), "types");
        let empty = child(&tree, types, "Empty");
        assert_eq!(tree.node(empty).value, Value::Empty { at: 15 });
        assert_eq!(&text[tree.node(empty).range.clone()], "Empty:");
    }

    #[test]
    fn malformed_lines_become_keyless_scalars() {
        let text = "title: A\n  just text\nversion: 1\n";
        let tree = Tree::parse(text);
        // the over-indented line continues the title scalar
        let title = child(&tree, tree.root(), "title");
        assert_eq!(tree.node(title).value.as_scalar().unwrap().text, "A\n  just text");

        let tree = Tree::parse("no colon here\n");
        let first = tree.children(tree.root())[0];
        assert!(tree.node(first).key.is_none());
    }

    #[test]
    fn ancestors_walk_to_root() {
        let text = "a:\n  b:\n    c: 1\n";
        let tree = Tree::parse(text);
        let a = child(&tree, tree.root(), "a");
        let b = child(&tree, a, "b");
        let c = child(&tree, b, "c");
        assert_eq!(tree.ancestors(c).collect::<Vec<_>>(), vec![b, a, NodeId::ROOT]);
    }

    #[test]
    fn comment_start_ignores_quoted_hash() {
        assert_eq!(comment_start("a: 1 # c"), Some(5));
        assert_eq!(comment_start("a: 'x # y'"), None);
        assert_eq!(comment_start("a: b#c"), None);
        assert_eq!(comment_start("# full"), Some(0));
    }
}
