//! Core types for syntax operations

use serde::Deserialize;
use serde::Serialize;

/// Half-open byte range `[start, end)` into a source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width range at `offset`, i.e. an insertion point.
    pub const fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when `[self.start, self.end)` and `other` share at least one byte.
    pub const fn intersects(&self, other: TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A syntax error the parser recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: TextRange,
    pub message: String,
}

impl Diagnostic {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.range, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_basics() {
        let range = TextRange::new(3, 7);
        assert_eq!(range.len(), 4);
        assert!(!range.is_empty());
        assert!(TextRange::empty(5).is_empty());
        assert_eq!(range.to_string(), "3..7");
    }

    #[test]
    fn test_range_intersection() {
        let ident = TextRange::new(10, 13);
        assert!(ident.intersects(TextRange::new(12, 14)));
        assert!(ident.intersects(TextRange::new(9, 11)));
        assert!(!ident.intersects(TextRange::new(13, 14)));
        assert!(!ident.intersects(TextRange::new(8, 10)));
    }
}
