//! Half-open spans of template text

use std::fmt;

use crate::error::ExpressionError;

/// Byte span `[start, end)` of an expression in its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpressionPosition {
    start: usize,
    end: usize,
}

impl ExpressionPosition {
    pub fn new(start: usize, end: usize) -> Result<Self, ExpressionError> {
        if start == end {
            return Err(ExpressionError::EmptyPosition(start));
        }
        if start > end {
            return Err(ExpressionError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Never true for an identical span.
    pub fn is_inside(&self, parent: &ExpressionPosition) -> bool {
        if self == parent {
            return false;
        }
        parent.start <= self.start && parent.end >= self.end
    }

    pub fn is_same(&self, other: &ExpressionPosition) -> bool {
        self == other
    }

    /// Touching spans such as `[0, 10)` and `[10, 20)` do not intersect.
    pub fn is_intersecting(&self, other: &ExpressionPosition) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for ExpressionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}
