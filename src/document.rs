//! In-memory document - text with a line index

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::decor::{DocumentId, Position, TextDocument};

/// A document held entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    id: DocumentId,
    path: PathBuf,
    text: String,
    /// Byte offset where each line starts
    line_starts: Vec<usize>,
}

impl MemoryDocument {
    /// Create a document from text
    pub fn new(id: DocumentId, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = index_lines(&text);
        Self {
            id,
            path: path.into(),
            text,
            line_starts,
        }
    }

    /// Create a document from file contents
    pub fn from_file(id: DocumentId, path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::new(id, path, text))
    }

    /// Replace the whole text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.line_starts = index_lines(&self.text);
    }

    /// Byte range of a line, terminator excluded
    fn line_bounds(&self, idx: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(idx)?;
        let end = match self.line_starts.get(idx + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        };
        let end = if self.text[start..end].ends_with('\r') {
            end - 1
        } else {
            end
        };
        Some((start, end))
    }
}

fn index_lines(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect()
}

impl TextDocument for MemoryDocument {
    fn id(&self) -> DocumentId {
        self.id
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line(&self, idx: usize) -> Option<&str> {
        self.line_bounds(idx).map(|(start, end)| &self.text[start..end])
    }

    fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let (start, end) = self.line_bounds(line).unwrap_or((offset, offset));
        Position::new(line, offset.min(end) - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> MemoryDocument {
        MemoryDocument::new(DocumentId(1), "notes.txt", text)
    }

    #[test]
    fn test_lines() {
        let doc = doc("first\r\nsecond\n\nlast");
        assert_eq!(doc.line_count(), 4);
        assert_eq!(doc.line(0), Some("first"));
        assert_eq!(doc.line(1), Some("second"));
        assert_eq!(doc.line(2), Some(""));
        assert_eq!(doc.line(3), Some("last"));
        assert_eq!(doc.line(4), None);
    }

    #[test]
    fn test_trailing_newline() {
        let doc = doc("only\n");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line(1), Some(""));
    }

    #[test]
    fn test_offset_to_position() {
        let doc = doc("ab\r\ncd\nef");
        assert_eq!(doc.offset_to_position(0), Position::new(0, 0));
        assert_eq!(doc.offset_to_position(2), Position::new(0, 2));
        // The carriage return belongs to the terminator.
        assert_eq!(doc.offset_to_position(3), Position::new(0, 2));
        assert_eq!(doc.offset_to_position(4), Position::new(1, 0));
        assert_eq!(doc.offset_to_position(7), Position::new(2, 0));
        assert_eq!(doc.offset_to_position(9), Position::new(2, 2));
        assert_eq!(doc.offset_to_position(100), Position::new(2, 2));
    }

    #[test]
    fn test_set_text() {
        let mut doc = doc("one");
        doc.set_text("one\ntwo");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line(1), Some("two"));
    }
}
