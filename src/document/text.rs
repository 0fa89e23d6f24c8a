//! Text utilities for position conversion.
//!
//! Provides byte offset <-> LSP position conversion with proper UTF-16 handling.
//! Out-of-range input is clamped to the document bounds instead of failing.

use std::ops::Range;

use tower_lsp::lsp_types::Position;

/// Pre-computed line index for efficient position lookups.
///
/// LSP positions use line/column where column is in UTF-16 code units.
/// This struct pre-computes line start offsets for O(log n) lookup.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
    /// Source text (needed for UTF-16 column calculation).
    source: String,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(source: String) -> Self {
        let mut line_starts = vec![0];

        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }

        Self {
            line_starts,
            source,
        }
    }

    /// Get the source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of lines in the document (a trailing newline opens an empty last line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte range of a line without its line terminator.
    fn line_bounds(&self, line: usize) -> (usize, usize) {
        let line_start = self.line_starts[line];
        let line_end = self
            .line_starts
            .get(line + 1)
            .map(|&end| end.saturating_sub(1)) // Exclude newline
            .unwrap_or(self.source.len());
        let line_end = if self.source[line_start..line_end].ends_with('\r') {
            line_end - 1
        } else {
            line_end
        };
        (line_start, line_end)
    }

    /// Convert a byte offset to an LSP position.
    ///
    /// Offsets past the end clamp to the end of the text; offsets inside a
    /// multi-byte character resolve to the start of that character.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());

        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let (line_start, line_end) = self.line_bounds(line);

        let mut col = 0u32;
        for (i, c) in self.source[line_start..line_end].char_indices() {
            if line_start + i + c.len_utf8() > offset {
                break;
            }
            col += c.len_utf16() as u32;
        }

        Position::new(line as u32, col)
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// A line past the end clamps to the end of the text; a column past the end
    /// of its line clamps to the end of that line.
    pub fn position_to_offset(&self, position: Position) -> usize {
        let line = position.line as usize;

        if line >= self.line_starts.len() {
            return self.source.len();
        }

        let (line_start, line_end) = self.line_bounds(line);

        // Walk UTF-16 code units to find byte offset
        let mut utf16_col = 0u32;
        for (i, c) in self.source[line_start..line_end].char_indices() {
            if utf16_col >= position.character {
                return line_start + i;
            }
            utf16_col += c.len_utf16() as u32;
        }

        line_end
    }

    /// Convert a byte span to an LSP range.
    pub fn span_to_range(&self, span: &Range<usize>) -> tower_lsp::lsp_types::Range {
        let start = self.offset_to_position(span.start);
        let end = self.offset_to_position(span.end);
        tower_lsp::lsp_types::Range::new(start, end)
    }
}
