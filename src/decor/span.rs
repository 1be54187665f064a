//! Document positions and decorated ranges

use std::fmt;

/// A zero-based (line, column) position; columns are byte offsets in the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A half-open range of document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// Position where this span starts (inclusive)
    pub start: Position,
    /// Position where this span ends (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span within a single line
    pub fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(line, start), Position::new(line, end))
    }

    /// Check if this span contains a position
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Check if span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains() {
        let span = Span::on_line(2, 5, 10);
        assert!(!span.contains(Position::new(2, 4)));
        assert!(span.contains(Position::new(2, 5)));
        assert!(span.contains(Position::new(2, 9)));
        assert!(!span.contains(Position::new(2, 10)));
        assert!(!span.contains(Position::new(1, 7)));
    }

    #[test]
    fn test_multiline_span_contains() {
        let span = Span::new(Position::new(1, 8), Position::new(3, 2));
        assert!(span.contains(Position::new(2, 0)));
        assert!(span.contains(Position::new(2, 500)));
        assert!(span.contains(Position::new(3, 1)));
        assert!(!span.contains(Position::new(3, 2)));
        assert!(!span.contains(Position::new(1, 7)));
    }

    #[test]
    fn test_span_empty() {
        assert!(Span::on_line(0, 3, 3).is_empty());
        assert!(!Span::on_line(0, 3, 4).is_empty());
    }
}
