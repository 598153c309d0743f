//! Search — a regex match index with cyclic navigation.
//!
//! `find <pattern>` compiles the pattern once and runs it over every line,
//! recording where it matched. The resulting [`SearchIndex`] is sparse: only
//! lines with at least one match have an entry, kept in ascending row order.
//! Navigation then walks those entries without touching the regex again.
//!
//! # Navigation
//!
//! [`advance`](SearchIndex::advance) steps through matches cyclically:
//!
//! ```text
//! ab ab      (0,0) → (0,3)
//! ab         → (1,0) → back to (0,0)
//! ```
//!
//! Stepping past the last match of a line moves to the next matched line
//! (first match); stepping before the first moves to the previous matched
//! line (last match). Both ends wrap. The editing cursor is placed just past
//! the selected match so a match that starts off-screen scrolls into view.
//!
//! If the cursor is not on a matched line when navigating (the user moved
//! away), it jumps to the nearest matched line instead, ties going to the
//! line above.
//!
//! # Design choices
//!
//! - **Sorted array, not a map.** Navigation addresses matched lines by slot
//!   (0, 1, 2, ...) and wraps modulo their count, so a `Vec` sorted by row
//!   gives both slot indexing and binary search by row.
//! - **The slot follows the cursor.** Whenever the cursor sits on a matched
//!   line, that line's slot becomes the current one before stepping. Manual
//!   cursor movement therefore never leaves a stale slot behind.
//! - **Disabled means empty.** Any buffer edit or an explicit cancel drops the
//!   matches. Positions would be stale after an edit and are never shown
//!   while disabled.

use regex::Regex;
use tracing::{debug, warn};

use crate::buffer::Buffer;
use crate::cursor::Cursor;
use crate::error::SearchError;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// One match within a line: start column and length, both in chars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub len: usize,
}

impl Match {
    /// Column just past the match.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// All matches on one line, left to right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedLine {
    pub row: usize,
    pub matches: Vec<Match>,
}

// ---------------------------------------------------------------------------
// SearchIndex
// ---------------------------------------------------------------------------

/// The match index and navigation state of the last `find`.
#[derive(Debug, Default)]
pub struct SearchIndex {
    /// The pattern the index was built from, if any.
    pattern: Option<String>,

    /// Matched lines in ascending row order. Never holds an empty `matches`.
    lines: Vec<MatchedLine>,

    /// Whether matches are shown and navigation keys step through them.
    enabled: bool,

    /// Index into `lines` of the line navigation is on.
    current_slot: usize,

    /// Index into the current line's matches. Signed because a backward step
    /// goes through -1 before rolling over.
    current_match: isize,
}

impl SearchIndex {
    /// An empty, disabled index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pattern: None,
            lines: Vec::new(),
            enabled: false,
            current_slot: 0,
            current_match: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// True while matches are shown and navigable.
    #[inline]
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The pattern of the last successful build.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Number of lines with at least one match.
    #[inline]
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total number of matches across all lines.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.lines.iter().map(|l| l.matches.len()).sum()
    }

    /// Matched lines in ascending row order.
    #[must_use]
    pub fn lines(&self) -> &[MatchedLine] {
        &self.lines
    }

    /// Matches on `row`, or an empty slice if the row has none.
    #[must_use]
    pub fn matches_for(&self, row: usize) -> &[Match] {
        self.slot_of(row)
            .map_or(&[][..], |slot| self.lines[slot].matches.as_slice())
    }

    /// The currently selected match as (row, match), if navigation has a
    /// valid selection.
    #[must_use]
    pub fn current(&self) -> Option<(usize, Match)> {
        let line = self.lines.get(self.current_slot)?;
        let idx = usize::try_from(self.current_match).ok()?;
        line.matches.get(idx).map(|m| (line.row, *m))
    }

    // -- Build / activate / disable -----------------------------------------

    /// Rebuild the index for `pattern` over the whole buffer.
    ///
    /// Leaves the index disabled either way. On an invalid pattern the old
    /// matches are dropped and the error is returned; the buffer is never
    /// touched. Returns the total match count.
    pub fn build(&mut self, pattern: &str, buf: &Buffer) -> Result<usize, SearchError> {
        self.disable();

        let re = Regex::new(pattern).map_err(|source| {
            warn!(pattern, "invalid search pattern");
            SearchError::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            }
        })?;

        for (row, text) in buf.lines().enumerate() {
            let matches: Vec<Match> = re
                .find_iter(&text)
                .map(|m| Match {
                    start: byte_to_char(&text, m.start()),
                    len: m.as_str().chars().count(),
                })
                .collect();
            if !matches.is_empty() {
                self.lines.push(MatchedLine { row, matches });
            }
        }

        self.pattern = Some(pattern.to_owned());
        let total = self.match_count();
        debug!(pattern, lines = self.lines.len(), total, "search index built");
        Ok(total)
    }

    /// Turn on navigation and put the cursor on the current match.
    ///
    /// Returns `false` (and stays disabled) when there is nothing to show.
    pub fn activate(&mut self, cursor: &mut Cursor, buf: &Buffer) -> bool {
        if self.lines.is_empty() {
            return false;
        }
        self.enabled = true;
        self.current_slot = 0;
        self.current_match = 0;
        self.advance(0, cursor, buf);
        true
    }

    /// Hide and drop all matches.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.lines.clear();
        self.current_slot = 0;
        self.current_match = 0;
    }

    // -- Navigation ---------------------------------------------------------

    /// Step `delta` matches (±1 for next/previous, 0 to snap onto the current
    /// one) and move the cursor just past the selected match.
    ///
    /// Does nothing while disabled.
    pub fn advance(&mut self, delta: isize, cursor: &mut Cursor, buf: &Buffer) {
        if !self.enabled || self.lines.is_empty() {
            return;
        }

        let Some(slot) = self.slot_of(cursor.row()) else {
            self.jump_to_nearest(cursor, buf);
            return;
        };

        self.current_slot = slot;
        self.current_match += delta;

        let in_line = self.lines[slot].matches.len();
        if !(0..to_isize(in_line)).contains(&self.current_match) {
            let count = to_isize(self.lines.len());
            let next = (to_isize(slot) + delta).rem_euclid(count);
            self.current_slot = usize::try_from(next).unwrap_or(0);

            let entered = &self.lines[self.current_slot];
            self.current_match = if delta > 0 {
                0
            } else {
                to_isize(entered.matches.len()) - 1
            };
        }

        self.place_cursor(cursor, buf);
    }

    /// The cursor is off every matched line: move it to the nearest one and
    /// select its first match.
    fn jump_to_nearest(&mut self, cursor: &mut Cursor, buf: &Buffer) {
        let row = cursor.row();
        let mut best = 0;
        for (slot, line) in self.lines.iter().enumerate() {
            if line.row.abs_diff(row) < self.lines[best].row.abs_diff(row) {
                best = slot;
            }
        }
        self.current_slot = best;
        self.current_match = 0;
        self.place_cursor(cursor, buf);
    }

    fn place_cursor(&self, cursor: &mut Cursor, buf: &Buffer) {
        if let Some((row, m)) = self.current() {
            cursor.set_position(Position::new(row, m.end()), buf);
        }
    }

    fn slot_of(&self, row: usize) -> Option<usize> {
        self.lines.binary_search_by_key(&row, |l| l.row).ok()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert a byte offset to a char offset in a string.
fn byte_to_char(s: &str, byte_offset: usize) -> usize {
    s[..byte_offset].chars().count()
}

fn to_isize(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
