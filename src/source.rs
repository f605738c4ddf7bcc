//! Source buffers with a filename label and line/column mapping.

use std::io::Read;

use crate::token::Span;

/// Error produced while constructing a [`SourceFile`] from raw input.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Reading from the underlying reader failed.
    #[error("failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    /// Input bytes are not valid UTF-8.
    #[error("{name} is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidUtf8 { name: String, offset: usize },
}

/// An immutable devcmd source buffer.
///
/// Keeps the byte offset of every line start so spans can be
/// annotated with line and column numbers without rescanning.
/// A lone `\r` counts as a line break here even though the
/// lexer reports it as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    name: String,
    text: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    /// Create a source file from already decoded text.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = line_starts(&text);
        Self {
            name: name.into(),
            text,
            line_starts,
        }
    }

    /// Create a source file from raw bytes, validating UTF-8.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SourceError> {
        let name = name.into();
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Self::new(name, text)),
            Err(e) => Err(SourceError::InvalidUtf8 {
                name,
                offset: e.utf8_error().valid_up_to(),
            }),
        }
    }

    /// Read a source file to completion from `reader`.
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> Result<Self, SourceError> {
        let name = name.into();
        let mut bytes = Vec::new();
        if let Err(source) = reader.read_to_end(&mut bytes) {
            return Err(SourceError::Io { name, source });
        }
        Self::from_bytes(name, bytes)
    }

    /// The filename label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full source text, including a leading BOM if present.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the source in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines, counting a final line without a terminator.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Map a byte offset to a 1-based `(line, column)` pair.
    ///
    /// Columns count characters, not bytes. Offsets past the end
    /// are clamped to the end of input.
    #[must_use]
    pub fn location(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.text.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx];
        let col = self
            .text
            .get(line_start..offset)
            .map_or(offset - line_start, |s| s.chars().count());
        (line_idx + 1, col + 1)
    }

    /// Build a span for the half-open byte range `start..end`.
    #[must_use]
    pub fn span(&self, start: usize, end: usize) -> Span {
        let (start_line, start_col) = self.location(start);
        let (end_line, end_col) = self.location(end);
        Span {
            start_offset: start,
            end_offset: end,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Zero-width span at the end of input.
    #[must_use]
    pub fn eof_span(&self) -> Span {
        self.span(self.text.len(), self.text.len())
    }

    /// The text covered by `span`, or `""` if it does not fall on
    /// character boundaries of this file.
    #[must_use]
    pub fn slice(&self, span: Span) -> &str {
        self.text
            .get(span.start_offset..span.end_offset)
            .unwrap_or_default()
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut starts = vec![0];
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => starts.push(i + 1),
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                starts.push(i + 2);
                i += 1;
            }
            b'\r' => starts.push(i + 1),
            _ => {}
        }
        i += 1;
    }
    starts
}
