//! Source location model.
//!
//! Lines are 1-based (as reported to users); columns and bytes are 0-based
//! offsets into the file's text.

use serde::{Deserialize, Serialize};

/// A single point in a source file: the start of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Source span: byte range plus the start point, which is what the spec's
/// `span` attribute records for symbols and reference sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Span {
    pub fn new(start: Position, start_byte: usize, end_byte: usize) -> Self {
        Self {
            start,
            start_byte,
            end_byte,
        }
    }

    pub fn zero() -> Self {
        Self::new(Position::new(0, 0), 0, 0)
    }

    pub fn byte_len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Extract a snippet from `text`, clamped to valid bounds.
    pub fn slice_text<'a>(&self, text: &'a str) -> &'a str {
        let len = text.len();
        let start = self.start_byte.min(len);
        let end = self.end_byte.min(len).max(start);
        &text[start..end]
    }
}
