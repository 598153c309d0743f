//! Viewport — which slice of the buffer is on screen.
//!
//! The viewport is the scroll state between the cursor and the renderer. It
//! holds the top row and left column of the visible window plus the size of
//! the text area, and nothing else. It never owns the buffer or the cursor.
//!
//! # Scrolling
//!
//! [`follow`](Viewport::follow) is called once per frame after the cursor has
//! moved. It scrolls by the minimum amount that brings the cursor back inside
//! the window, one axis at a time:
//!
//! ```text
//! cursor above top      → top  = cursor.row
//! cursor below bottom   → top  = cursor.row - rows + 1
//! cursor left of window → left = cursor.col
//! cursor right of window→ left = cursor.col - cols + 1
//! ```
//!
//! It never re-centers. The result depends on the previous scroll position,
//! so the viewport is stateful across frames.

use crate::cursor::Cursor;

/// The visible window onto the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible row (0-indexed).
    top_row: usize,

    /// First visible column (0-indexed, char offset).
    left_col: usize,

    /// Number of text rows on screen. Always at least 1.
    rows: usize,

    /// Number of text columns on screen. Always at least 1.
    cols: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

impl Viewport {
    /// Create a viewport scrolled to the origin. Zero dimensions are raised
    /// to 1 so the window can always hold the cursor.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self {
            top_row: 0,
            left_col: 0,
            rows: if rows == 0 { 1 } else { rows },
            cols: if cols == 0 { 1 } else { cols },
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// First visible row.
    #[inline]
    #[must_use]
    pub const fn top_row(&self) -> usize {
        self.top_row
    }

    /// First visible column.
    #[inline]
    #[must_use]
    pub const fn left_col(&self) -> usize {
        self.left_col
    }

    /// Visible text rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Visible text columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Rows `[top_row, top_row + rows)`, clipped to `line_count`.
    #[must_use]
    pub fn visible_rows(&self, line_count: usize) -> std::ops::Range<usize> {
        let end = (self.top_row + self.rows).min(line_count);
        self.top_row.min(end)..end
    }

    // -- Configuration ------------------------------------------------------

    /// Change the text area size. The scroll position is kept; the next
    /// [`follow`](Self::follow) fixes it up if the cursor fell outside.
    pub const fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = if rows == 0 { 1 } else { rows };
        self.cols = if cols == 0 { 1 } else { cols };
    }

    /// Scroll back to the origin (after a file load).
    pub const fn reset(&mut self) {
        self.top_row = 0;
        self.left_col = 0;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Minimal-adjustment scroll so the cursor is inside the window.
    pub const fn follow(&mut self, cursor: &Cursor) {
        let row = cursor.row();
        if row < self.top_row {
            self.top_row = row;
        } else if row > self.top_row + self.rows - 1 {
            self.top_row = row + 1 - self.rows;
        }

        let col = cursor.col();
        if col < self.left_col {
            self.left_col = col;
        } else if col > self.left_col + self.cols - 1 {
            self.left_col = col + 1 - self.cols;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
