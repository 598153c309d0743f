//! Text position type.
//!
//! All coordinates are **0-indexed**. Row 0 is the first line, column 0 is the
//! first character. Columns count Unicode scalar values (chars), not bytes or
//! grapheme clusters, which is how the rope indexes text.
//!
//! Display layers (status bar, the `jump` command) work in 1-indexed terms;
//! that conversion happens at the edge and never belongs here.

use std::fmt;

/// A position in a text buffer: (row, column), both 0-indexed.
///
/// `col` is the char offset from the start of the line, **not** a byte offset.
/// A column equal to the line length is the cursor-after-last-char position.
///
/// # Ordering
///
/// Positions are ordered lexicographically: row first, then column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// The origin, row 0 column 0.
    pub const ZERO: Self = Self { row: 0, col: 0 };

    /// Create a new position.
    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.row, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for the status bar: "row,col".
        write!(f, "{},{}", self.row + 1, self.col + 1)
    }
}
