//! Source spans shared by the AST, the type checker, and IR diagnostics.

use std::fmt;

/// A single position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A start/end pair of positions, attached to every AST node for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    pub fn new(start: Position, end: Position) -> Self {
        SourceSpan { start, end }
    }

    /// A zero-width span at a single position, useful for synthesized nodes.
    pub fn point(pos: Position) -> Self {
        SourceSpan {
            start: pos,
            end: pos,
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_span_has_equal_start_and_end() {
        let p = Position::new(3, 7);
        let span = SourceSpan::point(p);
        assert_eq!(span.start, span.end);
    }

    #[test]
    fn display_collapses_point_span() {
        let span = SourceSpan::point(Position::new(1, 1));
        assert_eq!(span.to_string(), "1:1");
    }

    #[test]
    fn display_shows_range() {
        let span = SourceSpan::new(Position::new(1, 1), Position::new(2, 4));
        assert_eq!(span.to_string(), "1:1-2:4");
    }
}
