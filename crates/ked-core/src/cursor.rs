//! Cursor — position tracking with movement.
//!
//! The `Cursor` is a (row, column, sticky column) triple. It does not own or
//! reference the buffer; the buffer is passed to each movement method, which
//! keeps the cursor a plain value the session can copy and compare.
//!
//! # Sticky column
//!
//! When moving vertically, the cursor remembers the column it was asked to be
//! at. Passing through a short line snaps it to that line's end, and reaching
//! a long line again restores the remembered column:
//!
//! ```text
//! Hello friend        up, up: col snaps to 7, then 12
//! Hi mate
//! How are you doing   ← start here at col 17
//! ```
//!
//! Horizontal moves, edits, and explicit jumps reset the sticky column to the
//! new column. Vertical moves never touch it.
//!
//! # Line wrapping
//!
//! Unlike Vim's `h`/`l`, left and right cross line boundaries: left at column
//! 0 lands at the end of the previous line, right at the end of a line lands
//! at the start of the next. At the buffer's edges the cursor stays put.

use crate::buffer::Buffer;
use crate::position::Position;

/// A cursor in a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Current position. `col` may equal the line length (after last char).
    pos: Position,

    /// Remembered column for vertical movement.
    sticky_col: usize,
}

impl Cursor {
    /// Create a cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            sticky_col: 0,
        }
    }

    /// Create a cursor at a specific position. The sticky column starts at
    /// the position's column.
    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            sticky_col: pos.col,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Current position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    /// Current row (0-indexed).
    #[inline]
    #[must_use]
    pub const fn row(&self) -> usize {
        self.pos.row
    }

    /// Current column (0-indexed, char offset).
    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    /// The sticky column (desired column for vertical movement).
    #[inline]
    #[must_use]
    pub const fn sticky_col(&self) -> usize {
        self.sticky_col
    }

    // -- Direct positioning -------------------------------------------------

    /// Move to an exact position, clamped to buffer bounds. Resets the sticky
    /// column. Used after edits and for explicit jumps.
    pub fn set_position(&mut self, pos: Position, buf: &Buffer) {
        self.pos = clamp(pos, buf);
        self.sticky_col = self.pos.col;
    }

    /// Back to the origin, forgetting the sticky column.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }

    // -- Horizontal movement ------------------------------------------------

    /// Move one char left, wrapping to the end of the previous line at column
    /// 0. Returns `false` at the start of the buffer.
    pub fn move_left(&mut self, buf: &Buffer) -> bool {
        let moved = if self.pos.col > 0 {
            self.pos.col -= 1;
            true
        } else if self.pos.row > 0 {
            self.pos.row -= 1;
            self.pos.col = buf.line_len(self.pos.row);
            true
        } else {
            false
        };
        self.sticky_col = self.pos.col;
        moved
    }

    /// Move one char right, wrapping to the start of the next line at the end
    /// of a line. Returns `false` at the end of the buffer.
    pub fn move_right(&mut self, buf: &Buffer) -> bool {
        let moved = if self.pos.col < buf.line_len(self.pos.row) {
            self.pos.col += 1;
            true
        } else if self.pos.row + 1 < buf.line_count() {
            self.pos.row += 1;
            self.pos.col = 0;
            true
        } else {
            false
        };
        self.sticky_col = self.pos.col;
        moved
    }

    /// Move to column 0 (the Home key). Resets sticky column.
    pub const fn move_to_line_start(&mut self) {
        self.pos.col = 0;
        self.sticky_col = 0;
    }

    /// Move past the last char of the line (the End key). Resets sticky
    /// column.
    pub fn move_to_line_end(&mut self, buf: &Buffer) {
        self.pos.col = buf.line_len(self.pos.row);
        self.sticky_col = self.pos.col;
    }

    // -- Vertical movement --------------------------------------------------

    /// Move by `delta` rows (negative is up). The target row is clamped into
    /// the buffer and the column becomes `min(sticky_col, line_len)`. The
    /// sticky column itself is left alone.
    pub fn move_vertical(&mut self, delta: isize, buf: &Buffer) {
        let last_row = buf.line_count() - 1;
        let row = self.pos.row.saturating_add_signed(delta).min(last_row);
        self.pos.row = row;
        self.pos.col = self.sticky_col.min(buf.line_len(row));
    }

    /// Move up by `count` rows, stopping at the first line.
    pub fn move_up(&mut self, count: usize, buf: &Buffer) {
        self.move_vertical(-isize::try_from(count).unwrap_or(isize::MAX), buf);
    }

    /// Move down by `count` rows, stopping at the last line.
    pub fn move_down(&mut self, count: usize, buf: &Buffer) {
        self.move_vertical(isize::try_from(count).unwrap_or(isize::MAX), buf);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Clamp a position to the nearest valid cursor position.
fn clamp(pos: Position, buf: &Buffer) -> Position {
    let row = pos.row.min(buf.line_count() - 1);
    Position::new(row, pos.col.min(buf.line_len(row)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
