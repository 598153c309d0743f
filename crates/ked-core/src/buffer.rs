//! Text buffer — the ordered sequence of lines every edit funnels through.
//!
//! A `Buffer` wraps a [`ropey::Rope`] holding the document's lines joined by
//! `'\n'`, with **no** trailing separator. That shape gives the two structural
//! guarantees the rest of the editor leans on:
//!
//! - An empty rope is exactly one empty line, so `line_count() >= 1` always
//!   holds. There is no way to represent a zero-line document.
//! - A line never stores its own line ending. Line `n` is the text between
//!   separator `n - 1` and separator `n`.
//!
//! # Design choices
//!
//! - **ropey** gives O(log n) insert/delete and line indexing. The crate is
//!   built without `cr_lines`/`unicode_lines`, so `'\n'` is the only line
//!   break it recognizes. A stray `'\r'` or U+2028 is ordinary line content.
//!
//! - **Columns are char offsets**, not byte offsets. Byte offsets never leak
//!   into the public API.
//!
//! - **Callers pre-validate coordinates.** Editing methods trust that `row`
//!   and `col` are in range; the cursor layer guarantees it. Out-of-range
//!   input is a logic error and panics inside ropey.
//!
//! - **Modification counting lives here.** Every operation that actually
//!   changes text bumps [`modifications`](Buffer::modifications). The session
//!   uses the count for the unsaved-changes check and to invalidate search.

use std::fmt;

use ropey::Rope;

use crate::position::Position;

/// The ordered, mutable sequence of text lines.
pub struct Buffer {
    rope: Rope,

    /// Number of mutating operations since the last load or save.
    modifications: u64,

    /// Whether `split_line` carries the leading spaces of the split line.
    auto_indent: bool,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// Create a buffer holding one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            modifications: 0,
            auto_indent: true,
        }
    }

    /// Create a buffer from a sequence of lines. An empty sequence yields one
    /// empty line. The buffer starts unmodified.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buf = Self::new();
        buf.rope = join_lines(lines);
        buf
    }

    /// Enable or disable auto-indent for [`split_line`](Self::split_line).
    pub const fn set_auto_indent(&mut self, on: bool) {
        self.auto_indent = on;
    }

    /// Whether `split_line` carries indentation onto the new line.
    #[inline]
    #[must_use]
    pub const fn auto_indent(&self) -> bool {
        self.auto_indent
    }

    // -- Text access --------------------------------------------------------

    /// Number of lines. Never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of line `row` in chars. The line ending is not stored, so there
    /// is nothing to exclude.
    ///
    /// # Panics
    ///
    /// Panics if `row >= line_count()`.
    #[must_use]
    pub fn line_len(&self, row: usize) -> usize {
        let line = self.rope.line(row);
        let len = line.len_chars();
        // Every line but the last carries its '\n' inside the rope.
        if row + 1 < self.rope.len_lines() {
            len - 1
        } else {
            len
        }
    }

    /// The text of line `row`, without a line ending.
    ///
    /// # Panics
    ///
    /// Panics if `row >= line_count()`.
    #[must_use]
    pub fn line_text(&self, row: usize) -> String {
        let start = self.rope.line_to_char(row);
        self.rope.slice(start..start + self.line_len(row)).to_string()
    }

    /// Iterate over all lines as owned strings, first to last.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.line_count()).map(|row| self.line_text(row))
    }

    /// Total byte count of [`rendered_text`](Self::rendered_text).
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes() + 1
    }

    /// Operations that changed text since the last load or save.
    #[inline]
    #[must_use]
    pub const fn modifications(&self) -> u64 {
        self.modifications
    }

    /// True if there are unsaved changes.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modifications > 0
    }

    /// Reset the modification count. Called after a successful save.
    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modifications = 0;
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` at `(row, col)`. Returns the new cursor column, `col + 1`.
    /// Never splits or merges lines; a `'\n'` must go through
    /// [`split_line`](Self::split_line).
    pub fn insert_char(&mut self, row: usize, col: usize, ch: char) -> usize {
        debug_assert!(ch != '\n', "newlines go through split_line");
        let idx = self.char_idx(row, col);
        self.rope.insert_char(idx, ch);
        self.modifications += 1;
        col + 1
    }

    /// Insert a run of characters on one line as a single operation. Returns
    /// the new cursor column.
    pub fn insert_str(&mut self, row: usize, col: usize, text: &str) -> usize {
        debug_assert!(!text.contains('\n'), "newlines go through split_line");
        let idx = self.char_idx(row, col);
        self.rope.insert(idx, text);
        self.modifications += 1;
        col + text.chars().count()
    }

    /// Backspace at `(row, col)`.
    ///
    /// - `col > 0`: removes the char left of `col`, cursor moves to `col - 1`.
    /// - `col == 0, row > 0`: appends this line to the previous one and
    ///   removes it. The cursor lands where the previous line used to end.
    /// - `(0, 0)`: nothing happens and `None` is returned.
    pub fn delete_backward(&mut self, row: usize, col: usize) -> Option<Position> {
        if col > 0 {
            let idx = self.char_idx(row, col);
            self.rope.remove(idx - 1..idx);
            self.modifications += 1;
            return Some(Position::new(row, col - 1));
        }
        if row == 0 {
            return None;
        }
        let prev_len = self.line_len(row - 1);
        // The separator ending the previous line sits just before this line.
        let idx = self.rope.line_to_char(row);
        self.rope.remove(idx - 1..idx);
        self.modifications += 1;
        Some(Position::new(row - 1, prev_len))
    }

    /// Forward delete at `(row, col)`.
    ///
    /// Removes the char at `col`, or when `col` is at the end of the line,
    /// pulls the next line up onto this one. At the very end of the buffer
    /// nothing happens and `false` is returned. The cursor never moves.
    pub fn delete_forward(&mut self, row: usize, col: usize) -> bool {
        let at_line_end = col >= self.line_len(row);
        if at_line_end && row + 1 >= self.line_count() {
            return false;
        }
        // At line end the char at `idx` is the '\n' separator, so removing it
        // is exactly the join.
        let idx = self.char_idx(row, col);
        self.rope.remove(idx..=idx);
        self.modifications += 1;
        true
    }

    /// Break line `row` at `col` (the Enter key).
    ///
    /// Text after `col` moves to a new line inserted below. With auto-indent
    /// on, the leading spaces of the original line are prepended to it. The
    /// returned cursor is `(row + 1, indent_len)`.
    pub fn split_line(&mut self, row: usize, col: usize) -> Position {
        let indent = if self.auto_indent {
            self.leading_spaces(row)
        } else {
            0
        };
        let idx = self.char_idx(row, col);
        let mut inserted = String::with_capacity(indent + 1);
        inserted.push('\n');
        inserted.extend(std::iter::repeat_n(' ', indent));
        self.rope.insert(idx, &inserted);
        self.modifications += 1;
        Position::new(row + 1, indent)
    }

    /// Replace the whole document. The buffer ends up unmodified.
    pub fn load_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rope = join_lines(lines);
        self.modifications = 0;
    }

    /// The save-file shape: every line followed by `'\n'`, including the last.
    #[must_use]
    pub fn rendered_text(&self) -> String {
        let mut text = String::with_capacity(self.len_bytes());
        for chunk in self.rope.chunks() {
            text.push_str(chunk);
        }
        text.push('\n');
        text
    }

    // -- Helpers ------------------------------------------------------------

    /// Number of `' '` chars at the start of line `row`.
    fn leading_spaces(&self, row: usize) -> usize {
        self.rope
            .line(row)
            .chars()
            .take_while(|&ch| ch == ' ')
            .count()
    }

    fn char_idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(col <= self.line_len(row), "column past end of line");
        self.rope.line_to_char(row) + col
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("chars", &self.rope.len_chars())
            .field("modifications", &self.modifications)
            .finish_non_exhaustive()
    }
}

/// Build a rope from lines joined by `'\n'`, without a trailing separator.
fn join_lines<I, S>(lines: I) -> Rope
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        text.push_str(line.as_ref());
    }
    Rope::from_str(&text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
