//! Offset-based text edits applied as a pure text transform.

use std::ops::Range;

use tracing::warn;

/// A replacement of `range` (byte offsets into the original text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub new_text: String,
}

impl TextEdit {
    pub fn replace(range: Range<usize>, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn insert(offset: usize, new_text: impl Into<String>) -> Self {
        Self::replace(offset..offset, new_text)
    }
}

/// Edits collected against one document, all expressed in the document's
/// original offsets.
#[derive(Debug, Default)]
pub struct EditList {
    edits: Vec<TextEdit>,
}

impl EditList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply every edit to `text`, highest offset first, and return the new
    /// text with the edits that were applied (in descending order).
    ///
    /// Edits overlapping one already applied, out of bounds, or not on char
    /// boundaries are dropped.
    pub fn apply(self, text: &str) -> (String, Vec<TextEdit>) {
        let mut edits = self.edits;
        // Stable: among edits at the same offset, the one pushed first wins.
        edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));

        let mut result = text.to_string();
        let mut applied: Vec<TextEdit> = Vec::with_capacity(edits.len());
        let mut limit = text.len();

        for edit in edits {
            let Range { start, end } = edit.range;
            let valid = start <= end
                && end <= text.len()
                && text.is_char_boundary(start)
                && text.is_char_boundary(end);
            if !valid {
                warn!(component = "rename", ?edit.range, "dropping edit outside the document");
                continue;
            }
            let touches_previous = applied.last().is_some_and(|prev| prev.range.start == start);
            if end > limit || touches_previous {
                warn!(component = "rename", ?edit.range, "dropping overlapping edit");
                continue;
            }

            result.replace_range(start..end, &edit.new_text);
            limit = start;
            applied.push(edit);
        }

        (result, applied)
    }
}
