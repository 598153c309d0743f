//! Snapshot — what a renderer needs to draw one frame.
//!
//! The core never draws. Once per loop iteration the session hands out a
//! [`Snapshot`]: the visible slice of the buffer already clipped to the
//! viewport, the cursor, search matches for the visible lines, and the facts
//! a status bar is built from. It owns its data, so the renderer can hold it
//! while the session moves on.

use crate::position::Position;
use crate::search::Match;

/// One visible line, clipped to the viewport's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleLine {
    /// Buffer row (0-indexed).
    pub row: usize,
    /// Chars `[left_col, left_col + cols)` of the line.
    pub text: String,
    /// Search matches on this row in buffer columns. Empty unless search is
    /// enabled.
    pub matches: Vec<Match>,
}

/// The open console prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    pub text: String,
    /// Cursor within `text` (char offset).
    pub cursor: usize,
}

/// A read-only frame of editor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Lines in `[top_row, top_row + rows)`, clipped to the buffer.
    pub lines: Vec<VisibleLine>,
    /// Cursor in buffer coordinates.
    pub cursor: Position,
    /// First visible row.
    pub top_row: usize,
    /// First visible column.
    pub left_col: usize,
    /// Text area size.
    pub rows: usize,
    pub cols: usize,
    /// Whether search matches are being shown.
    pub search_enabled: bool,
    /// Current file name, if the buffer has one.
    pub file_name: Option<String>,
    /// Total lines in the buffer.
    pub line_count: usize,
    /// Unsaved changes.
    pub modified: bool,
    /// Status text (message or help).
    pub status: String,
    /// True when `status` reports a failure.
    pub status_is_error: bool,
    /// The console prompt, while open.
    pub prompt: Option<PromptView>,
}

impl Snapshot {
    /// The cursor relative to the top-left of the text area.
    #[must_use]
    pub const fn screen_cursor(&self) -> (usize, usize) {
        (
            self.cursor.row.saturating_sub(self.top_row),
            self.cursor.col.saturating_sub(self.left_col),
        )
    }

    /// 1-indexed `row,col` for the status bar.
    #[must_use]
    pub fn position_label(&self) -> String {
        self.cursor.to_string()
    }
}
