//! Classification of a cursor offset from the live document text.
//!
//! Works on the raw text of the current line so it stays usable while the
//! document is being edited and does not parse cleanly.

use std::sync::LazyLock;

use regex::Regex;

use super::parser::{comment_start, KEY_PATTERN};

static INCLUDE_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!include\s+\S*$").unwrap());
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|\s)!\w*$").unwrap());

/// What the cursor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// A value position: after `key: ` or inside a scalar sequence item.
    Value,
    /// A mapping key.
    Key,
    /// The key of a mapping that starts a sequence item (`- key:`).
    SequenceKey,
    /// The path argument of `!include`.
    Path,
    /// A `!tag`.
    Directive,
    /// The `#%RAML` header line.
    Version,
    /// An annotation key such as `(deprecated)`.
    Annotation,
    InComment,
}

/// Classify `offset` within `text`.
pub fn determine_completion_kind(text: &str, offset: usize) -> LocationKind {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }

    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
    let line = text[line_start..line_end].trim_end_matches('\r');
    let prefix = &text[line_start..offset.min(line_start + line.len())];

    if line.starts_with("#%") {
        return LocationKind::Version;
    }
    if comment_start(line).is_some_and(|c| c < prefix.len()) {
        return LocationKind::InComment;
    }
    if INCLUDE_PATH.is_match(prefix) {
        return LocationKind::Path;
    }
    if DIRECTIVE.is_match(prefix) {
        return LocationKind::Directive;
    }

    let indent = prefix.len() - prefix.trim_start().len();
    let rest = &line[indent..];
    let (item, content_col) = match rest.strip_prefix('-') {
        Some(after) if after.is_empty() || after.starts_with([' ', '\t']) => {
            let skipped = after.len() - after.trim_start().len();
            (true, indent + 1 + skipped)
        }
        _ => (false, indent),
    };

    let content = &line[content_col.min(line.len())..];
    let prefix_in_content = prefix.len().saturating_sub(content_col);

    if let Some(m) = KEY_PATTERN.find(content) {
        let colon = content[..m.end()].trim_end().len() - 1;
        // At least one character between the colon and the cursor.
        if colon + 1 < prefix_in_content {
            return LocationKind::Value;
        }
        if item {
            return LocationKind::SequenceKey;
        }
        if content.starts_with('(') {
            return LocationKind::Annotation;
        }
        return LocationKind::Key;
    }

    if item {
        return LocationKind::Value;
    }
    if content.starts_with('(') {
        return LocationKind::Annotation;
    }
    LocationKind::Key
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Classify the position marked by `|` in `marked`.
    fn kind(marked: &str) -> LocationKind {
        let offset = marked.find('|').unwrap();
        let text = marked.replacen('|', "", 1);
        determine_completion_kind(&text, offset)
    }

    #[test]
    fn keys_and_values() {
        assert_eq!(kind("types:\n  Us|er:\n"), LocationKind::Key);
        assert_eq!(kind("types:\n  |User:\n"), LocationKind::Key);
        assert_eq!(kind("types:\n  User|:\n"), LocationKind::Key);
        assert_eq!(kind("  type: Us|er\n"), LocationKind::Value);
        assert_eq!(kind("  type: |\n"), LocationKind::Value);
        assert_eq!(kind("  type:|\n"), LocationKind::Key);
    }

    #[test]
    fn sequence_items() {
        assert_eq!(kind("is:\n  - pa|ged:\n      size: 1\n"), LocationKind::SequenceKey);
        assert_eq!(kind("is:\n  - sec|ured\n"), LocationKind::Value);
        assert_eq!(kind("is:\n  - paged: { size: |1 }\n"), LocationKind::Value);
    }

    #[test]
    fn flow_sequences_are_values() {
        assert_eq!(kind("is: [secured, pa|ged]\n"), LocationKind::Value);
    }

    #[test]
    fn special_positions() {
        assert_eq!(kind("#%RAML 1.|0\n"), LocationKind::Version);
        assert_eq!(kind("title: x # no|te\n"), LocationKind::InComment);
        assert_eq!(kind("types: !include lib/ty|pes.raml\n"), LocationKind::Path);
        assert_eq!(kind("types: !inc|\n"), LocationKind::Directive);
        assert_eq!(kind("  (depre|cated): true\n"), LocationKind::Annotation);
    }

    #[test]
    fn offsets_past_end_are_clamped() {
        assert_eq!(determine_completion_kind("title: x", 100), LocationKind::Value);
        assert_eq!(determine_completion_kind("", 3), LocationKind::Key);
    }
}
