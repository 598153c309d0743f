//! Session — the editor state and the one-event-at-a-time loop body.
//!
//! A [`Session`] owns everything one editing session needs: the buffer, the
//! cursor, the viewport, the search index, the current file name, the quit
//! guard, the status line and the console prompt. The driver feeds it one
//! [`Key`] (or one console line) at a time and gets back an [`Action`].
//!
//! # Event flow
//!
//! ```text
//! handle_key(key)
//!   ├─ prompt open?  → edit prompt / Enter runs the line / Esc closes it
//!   └─ otherwise     → one buffer edit, cursor move, search step, or binding
//! viewport.follow(cursor)
//! ```
//!
//! Every failure is caught here and shown as a status message; nothing a
//! user types can end the session except a successful quit.
//!
//! # Key bindings
//!
//! | Key           | Action                                              |
//! |---------------|-----------------------------------------------------|
//! | `Ctrl+S`      | Save, or prompt `save ` when there is no file name   |
//! | `Ctrl+O`      | Prompt `open `                                      |
//! | `Ctrl+F`      | Prompt `find `                                      |
//! | `Ctrl+G`      | Prompt `jump `                                      |
//! | `Ctrl+Q`      | Quit (guarded)                                      |
//! | `Alt+X`       | Empty prompt                                        |
//! | `PgUp`/`PgDn` | Previous/next match while searching, else page move  |
//! | `Esc`         | Leave search                                        |

use std::fmt;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::buffer::Buffer;
use crate::command::{self, Command, CommandLine};
use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::{CommandError, EditorError, IoError};
use crate::file_store::{FileStore, LoadedFile};
use crate::key::Key;
use crate::position::Position;
use crate::search::SearchIndex;
use crate::snapshot::{PromptView, Snapshot, VisibleLine};
use crate::status::StatusLine;
use crate::viewport::Viewport;

// ---------------------------------------------------------------------------
// Action / CommandResult
// ---------------------------------------------------------------------------

/// What the driver should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Outcome of running one console command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CommandResult {
    /// Success, with an optional status message.
    Ok(Option<String>),
    /// Failure, shown as an error message.
    Err(String),
    Quit,
}

// ---------------------------------------------------------------------------
// QuitGuard
// ---------------------------------------------------------------------------

/// Answer to a quit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitDecision {
    Allow,
    /// Refused; this many more attempts are needed.
    Refuse { remaining: u32 },
}

/// Press-again-to-confirm gate in front of quitting with unsaved changes.
///
/// With unsaved changes the first `required` attempts are refused and the
/// next one goes through. Any edit, save or load starts the count over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuitGuard {
    required: u32,
    refusals: u32,
}

impl QuitGuard {
    /// A guard that refuses `required` times. Zero is treated as 1.
    #[must_use]
    pub const fn new(required: u32) -> Self {
        Self {
            required: if required == 0 { 1 } else { required },
            refusals: 0,
        }
    }

    /// Consecutive refused attempts so far.
    #[inline]
    #[must_use]
    pub const fn refusals(&self) -> u32 {
        self.refusals
    }

    /// Record a quit attempt.
    pub const fn attempt(&mut self, unsaved: bool) -> QuitDecision {
        if !unsaved || self.refusals >= self.required {
            return QuitDecision::Allow;
        }
        self.refusals += 1;
        QuitDecision::Refuse {
            remaining: self.required - self.refusals + 1,
        }
    }

    /// Start counting from zero again.
    pub const fn reset(&mut self) {
        self.refusals = 0;
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One editing session over one buffer.
pub struct Session {
    config: Config,
    store: Box<dyn FileStore>,

    buffer: Buffer,
    cursor: Cursor,
    viewport: Viewport,
    search: SearchIndex,

    /// Name the buffer was loaded from or last saved to.
    file_name: Option<String>,

    quit_guard: QuitGuard,
    status: StatusLine,

    /// The console prompt. `Some` while it has focus.
    prompt: Option<CommandLine>,
}

impl Session {
    /// Start a session on an empty, unnamed buffer.
    #[must_use]
    pub fn new(config: Config, store: Box<dyn FileStore>) -> Self {
        let mut buffer = Buffer::new();
        buffer.set_auto_indent(config.auto_indent);
        Self {
            status: StatusLine::new(config.help_text.clone(), config.message_timeout()),
            quit_guard: QuitGuard::new(config.confirm_quit_presses),
            config,
            store,
            buffer,
            cursor: Cursor::new(),
            viewport: Viewport::default(),
            search: SearchIndex::new(),
            file_name: None,
            prompt: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub const fn search(&self) -> &SearchIndex {
        &self.search
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn quit_guard(&self) -> &QuitGuard {
        &self.quit_guard
    }

    #[must_use]
    pub const fn status(&self) -> &StatusLine {
        &self.status
    }

    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Name the buffer without loading or saving anything. Used for a file
    /// that does not exist yet.
    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = Some(name.into());
    }

    /// The prompt text, while the prompt is open.
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_ref().map(CommandLine::input)
    }

    // -- Loop ---------------------------------------------------------------

    /// Apply one input event.
    pub fn handle_key(&mut self, key: Key) -> Action {
        let action = if self.prompt.is_some() {
            self.handle_prompt_key(key)
        } else {
            self.handle_edit_key(key)
        };
        self.viewport.follow(&self.cursor);
        action
    }

    /// Run one console line.
    pub fn execute(&mut self, line: &str) -> Action {
        let action = match command::parse(line) {
            Ok(Some(cmd)) => self.execute_command(cmd),
            Ok(None) => Action::Continue,
            Err(e) => {
                debug!(line, error = %e, "console line rejected");
                self.set_error(e.to_string());
                Action::Continue
            }
        };
        self.viewport.follow(&self.cursor);
        action
    }

    /// Run an already-parsed command.
    pub fn dispatch(&mut self, cmd: Command) -> Action {
        let action = self.execute_command(cmd);
        self.viewport.follow(&self.cursor);
        action
    }

    /// Change the text area size. Zero dimensions are raised to 1.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.viewport.resize(rows, cols);
        self.viewport.follow(&self.cursor);
    }

    /// Expire a stale status message.
    pub fn tick(&mut self, now: Instant) {
        self.status.tick(now);
    }

    /// The frame a renderer draws.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let left = self.viewport.left_col();
        let cols = self.viewport.cols();
        let lines = self
            .viewport
            .visible_rows(self.buffer.line_count())
            .map(|row| VisibleLine {
                row,
                text: self.buffer.line_text(row).chars().skip(left).take(cols).collect(),
                matches: if self.search.is_enabled() {
                    self.search.matches_for(row).to_vec()
                } else {
                    Vec::new()
                },
            })
            .collect();

        Snapshot {
            lines,
            cursor: self.cursor.position(),
            top_row: self.viewport.top_row(),
            left_col: left,
            rows: self.viewport.rows(),
            cols,
            search_enabled: self.search.is_enabled(),
            file_name: self.file_name.clone(),
            line_count: self.buffer.line_count(),
            modified: self.buffer.is_modified(),
            status: self.status.text().to_owned(),
            status_is_error: self.status.is_error(),
            prompt: self.prompt.as_ref().map(|p| PromptView {
                text: p.input().to_owned(),
                cursor: p.cursor(),
            }),
        }
    }

    // -- Messages -----------------------------------------------------------

    fn set_message(&mut self, msg: impl Into<String>) {
        self.status.set_message(msg, Instant::now());
    }

    fn set_error(&mut self, msg: impl Into<String>) {
        self.status.set_error(msg, Instant::now());
    }

    // -- Prompt keys --------------------------------------------------------

    fn open_prompt(&mut self, text: &str) {
        self.prompt = Some(CommandLine::with_text(text));
    }

    fn handle_prompt_key(&mut self, key: Key) -> Action {
        let Some(prompt) = self.prompt.as_mut() else {
            return Action::Continue;
        };

        match key {
            Key::Enter => {
                let line = prompt.take();
                self.prompt = None;
                return self.execute(&line);
            }
            Key::Escape => self.prompt = None,
            Key::Char(ch) => prompt.insert_char(ch),
            Key::Backspace => {
                prompt.backspace();
            }
            Key::Delete => {
                prompt.delete();
            }
            Key::Left => prompt.move_left(),
            Key::Right => prompt.move_right(),
            Key::Home => prompt.move_home(),
            Key::End => prompt.move_end(),
            _ => {}
        }
        Action::Continue
    }

    // -- Editing keys -------------------------------------------------------

    fn handle_edit_key(&mut self, key: Key) -> Action {
        let Position { row, col } = self.cursor.position();

        match key {
            Key::Char('\n') | Key::Enter => {
                let pos = self.buffer.split_line(row, col);
                self.after_edit(pos);
            }
            Key::Char(ch) => {
                let col = self.buffer.insert_char(row, col, ch);
                self.after_edit(Position::new(row, col));
            }
            Key::Tab => {
                let width = self.config.tab_width.max(1);
                let spaces = " ".repeat(width - col % width);
                let col = self.buffer.insert_str(row, col, &spaces);
                self.after_edit(Position::new(row, col));
            }
            Key::Backspace => {
                if let Some(pos) = self.buffer.delete_backward(row, col) {
                    self.after_edit(pos);
                }
            }
            Key::Delete => {
                if self.buffer.delete_forward(row, col) {
                    self.after_edit(Position::new(row, col));
                }
            }
            Key::Left => {
                self.cursor.move_left(&self.buffer);
            }
            Key::Right => {
                self.cursor.move_right(&self.buffer);
            }
            Key::Up => self.cursor.move_up(1, &self.buffer),
            Key::Down => self.cursor.move_down(1, &self.buffer),
            Key::Home => self.cursor.move_to_line_start(),
            Key::End => self.cursor.move_to_line_end(&self.buffer),
            Key::PageUp => self.page(-1),
            Key::PageDown => self.page(1),

            Key::Escape => {
                if self.search.is_enabled() {
                    self.search.disable();
                }
            }

            Key::Ctrl('s') => {
                if self.file_name.is_some() {
                    return self.execute_command(Command::Save(None));
                }
                self.open_prompt("save ");
            }
            Key::Ctrl('o') => self.open_prompt("open "),
            Key::Ctrl('f') => self.open_prompt("find "),
            Key::Ctrl('g') => self.open_prompt("jump "),
            Key::Ctrl('q') => return self.execute_command(Command::Quit),
            Key::Alt('x') => self.open_prompt(""),

            Key::Ctrl(_) | Key::Alt(_) | Key::None => {}
        }
        Action::Continue
    }

    /// Page keys step through matches while searching, otherwise move a
    /// screen's worth of rows.
    fn page(&mut self, dir: isize) {
        if self.search.is_enabled() {
            self.search.advance(dir, &mut self.cursor, &self.buffer);
        } else if dir < 0 {
            self.cursor.move_up(self.viewport.rows(), &self.buffer);
        } else {
            self.cursor.move_down(self.viewport.rows(), &self.buffer);
        }
    }

    /// Bookkeeping shared by every buffer mutation.
    fn after_edit(&mut self, pos: Position) {
        self.cursor.set_position(pos, &self.buffer);
        self.search.disable();
        self.quit_guard.reset();
    }

    // -- Commands -----------------------------------------------------------

    fn execute_command(&mut self, cmd: Command) -> Action {
        debug!(?cmd, "dispatch");
        match self.run_command(cmd) {
            CommandResult::Ok(Some(msg)) => {
                self.set_message(msg);
                Action::Continue
            }
            CommandResult::Ok(None) => Action::Continue,
            CommandResult::Err(msg) => {
                self.set_error(msg);
                Action::Continue
            }
            CommandResult::Quit => Action::Quit,
        }
    }

    fn run_command(&mut self, cmd: Command) -> CommandResult {
        match cmd {
            Command::Save(name) => self.cmd_save(name),
            Command::Open(name) => self.cmd_open(&name),
            Command::Quit => self.cmd_quit(),
            Command::ForceQuit => {
                info!(modified = self.buffer.is_modified(), "force quit");
                CommandResult::Quit
            }
            Command::Find(pattern) => self.cmd_find(&pattern),
            Command::WordCount => self.cmd_word_count(),
            Command::Jump(line) => self.cmd_jump(line),
            Command::Replace { .. } => CommandResult::Err("replace is not supported".to_string()),
        }
    }

    /// `save [name]`
    fn cmd_save(&mut self, name: Option<String>) -> CommandResult {
        let Some(name) = name.or_else(|| self.file_name.clone()) else {
            return CommandResult::Err(CommandError::NoFileName.to_string());
        };
        match self.write_file(&name) {
            Ok(bytes) => {
                self.file_name = Some(name);
                CommandResult::Ok(Some(format!("{bytes} bytes written to disk")))
            }
            Err(_) => CommandResult::Err("Failed to save file, please try again".to_string()),
        }
    }

    /// `open <name>`
    fn cmd_open(&mut self, name: &str) -> CommandResult {
        if let Some(current) = self.file_name.clone() {
            if self.write_file(&current).is_err() {
                return CommandResult::Err("Failed to save file, please try again".to_string());
            }
        }

        let LoadedFile { lines, bytes } = match self.store.load(Path::new(name)) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(file = name, error = %e, "load failed");
                let msg = if e.is_not_found() {
                    "The entered file doesn't exist"
                } else {
                    "Failed to read file, please try again"
                };
                return CommandResult::Err(msg.to_string());
            }
        };

        self.buffer.load_lines(&lines);
        self.file_name = Some(name.to_owned());
        self.cursor.reset();
        self.viewport.reset();
        self.search.disable();
        self.quit_guard.reset();
        info!(file = name, bytes, lines = lines.len(), "file loaded");

        CommandResult::Ok(Some(format!("Loaded {bytes} bytes from {name}")))
    }

    /// `quit`
    fn cmd_quit(&mut self) -> CommandResult {
        match self.quit_guard.attempt(self.buffer.is_modified()) {
            QuitDecision::Allow => CommandResult::Quit,
            QuitDecision::Refuse { remaining } => {
                let plural = if remaining == 1 { "" } else { "s" };
                CommandResult::Err(format!(
                    "unsaved changes, quit {remaining} more time{plural} to discard them"
                ))
            }
        }
    }

    /// `find <pattern>`
    fn cmd_find(&mut self, pattern: &str) -> CommandResult {
        match self.search.build(pattern, &self.buffer) {
            Ok(total) => {
                self.search.activate(&mut self.cursor, &self.buffer);
                CommandResult::Ok(Some(format!("Found {total} matches for \"{pattern}\"")))
            }
            Err(e) => CommandResult::Err(EditorError::from(e).to_string()),
        }
    }

    /// `word-count`
    fn cmd_word_count(&self) -> CommandResult {
        let words: usize = self.buffer.lines().map(|l| command::count_words(&l)).sum();
        CommandResult::Ok(Some(format!("{words} words")))
    }

    /// `jump <line>`: 1-indexed, moved through the vertical-move path so
    /// the sticky column applies.
    fn cmd_jump(&mut self, line: i64) -> CommandResult {
        let max = self.buffer.line_count();
        let Some(target) = usize::try_from(line)
            .ok()
            .filter(|n| (1..=max).contains(n))
            .map(|n| n - 1)
        else {
            return CommandResult::Err(CommandError::LineOutOfRange { line, max }.to_string());
        };

        let row = self.cursor.row();
        if target < row {
            self.cursor.move_up(row - target, &self.buffer);
        } else {
            self.cursor.move_down(target - row, &self.buffer);
        }
        CommandResult::Ok(None)
    }

    /// Save the buffer under `name`, resetting the unsaved-change state.
    fn write_file(&mut self, name: &str) -> Result<u64, IoError> {
        let text = self.buffer.rendered_text();
        match self.store.save(Path::new(name), &text) {
            Ok(bytes) => {
                self.buffer.mark_saved();
                self.quit_guard.reset();
                info!(file = name, bytes, "file saved");
                Ok(bytes)
            }
            Err(e) => {
                warn!(file = name, error = %e, "save failed");
                Err(e)
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("file_name", &self.file_name)
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("viewport", &self.viewport)
            .field("search_enabled", &self.search.is_enabled())
            .field("prompt", &self.prompt())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_store::{DiskStore, MemoryStore};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    /// A store the test can keep inspecting after the session takes it.
    #[derive(Default, Clone)]
    struct Shared(Rc<MemoryStore>);

    impl FileStore for Shared {
        fn load(&self, path: &Path) -> Result<LoadedFile, IoError> {
            self.0.load(path)
        }
        fn save(&self, path: &Path, text: &str) -> Result<u64, IoError> {
            self.0.save(path, text)
        }
    }

    fn session_with(config: Config, store: &Shared) -> Session {
        let mut s = Session::new(config, Box::new(store.clone()));
        s.resize(10, 40);
        s
    }

    fn session() -> (Session, Shared) {
        let store = Shared::default();
        (session_with(Config::default(), &store), store)
    }

    fn type_text(s: &mut Session, text: &str) {
        for ch in text.chars() {
            s.handle_key(Key::Char(ch));
        }
    }

    fn keys(s: &mut Session, keys: &[Key]) -> Action {
        let mut last = Action::Continue;
        for &k in keys {
            last = s.handle_key(k);
        }
        last
    }

    fn lines(s: &Session) -> Vec<String> {
        s.buffer().lines().collect()
    }

    fn status(s: &Session) -> &str {
        s.status().text()
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn typing_and_enter() {
        let (mut s, _) = session();
        type_text(&mut s, "  hello");
        s.handle_key(Key::Enter);
        type_text(&mut s, "world");
        assert_eq!(lines(&s), vec!["  hello", "  world"]);
        assert_eq!(s.cursor().position(), Position::new(1, 7));
        assert_eq!(s.buffer().modifications(), 13);
    }

    #[test]
    fn newline_char_splits_line() {
        let (mut s, _) = session();
        type_text(&mut s, "ab");
        s.handle_key(Key::Left);
        s.handle_key(Key::Char('\n'));
        assert_eq!(lines(&s), vec!["a", "b"]);
        assert_eq!(s.cursor().position(), Position::new(1, 0));
    }

    #[test]
    fn backspace_everything_keeps_one_line() {
        let (mut s, _) = session();
        type_text(&mut s, "ab");
        s.handle_key(Key::Enter);
        type_text(&mut s, "c");
        for _ in 0..10 {
            s.handle_key(Key::Backspace);
        }
        assert_eq!(s.buffer().line_count(), 1);
        assert_eq!(lines(&s), vec![""]);
        assert_eq!(s.cursor().position(), Position::ZERO);
    }

    #[test]
    fn delete_joins_next_line() {
        let (mut s, _) = session();
        type_text(&mut s, "ab");
        s.handle_key(Key::Enter);
        type_text(&mut s, "cd");
        keys(&mut s, &[Key::Up, Key::End, Key::Delete]);
        assert_eq!(lines(&s), vec!["abcd"]);
        assert_eq!(s.cursor().position(), Position::new(0, 2));
    }

    #[test]
    fn tab_pads_to_next_stop_in_one_edit() {
        let (mut s, _) = session();
        type_text(&mut s, "a");
        let before = s.buffer().modifications();
        s.handle_key(Key::Tab);
        assert_eq!(lines(&s), vec!["a   "]);
        assert_eq!(s.cursor().col(), 4);
        assert_eq!(s.buffer().modifications(), before + 1);
        s.handle_key(Key::Tab);
        assert_eq!(s.cursor().col(), 8);
    }

    #[test]
    fn page_moves_by_visible_rows() {
        let store = Shared(Rc::new(
            MemoryStore::new().with_file("long.txt", &"x\n".repeat(30)),
        ));
        let mut s = session_with(Config::default(), &store);
        s.execute("open long.txt");
        s.handle_key(Key::PageDown);
        assert_eq!(s.cursor().row(), 10);
        assert_eq!(s.viewport().top_row(), 1);
        s.handle_key(Key::PageDown);
        s.handle_key(Key::PageDown);
        assert_eq!(s.cursor().row(), 29);
        s.handle_key(Key::PageUp);
        assert_eq!(s.cursor().row(), 19);
    }

    // -- Viewport -----------------------------------------------------------

    #[test]
    fn viewport_follows_cursor() {
        let (mut s, _) = session();
        s.resize(3, 5);
        type_text(&mut s, "abcdefgh");
        assert_eq!(s.viewport().left_col(), 4);
        for _ in 0..4 {
            s.handle_key(Key::Enter);
        }
        assert_eq!(s.viewport().top_row(), 2);
        assert_eq!(s.viewport().left_col(), 0);
    }

    #[test]
    fn snapshot_clips_to_viewport() {
        let store = Shared(Rc::new(
            MemoryStore::new().with_file("f", "0123456789\nabcdefghij\nzz\n"),
        ));
        let mut s = session_with(Config::default(), &store);
        s.execute("open f");
        s.resize(2, 4);
        keys(&mut s, &[Key::Down, Key::End]);

        let snap = s.snapshot();
        assert_eq!(snap.top_row, 0);
        assert_eq!(snap.left_col, 7);
        let texts: Vec<&str> = snap.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["789", "hij"]);
        assert_eq!(snap.screen_cursor(), (1, 3));
        assert_eq!(snap.position_label(), "2,11");
        assert_eq!(snap.file_name.as_deref(), Some("f"));
        assert!(!snap.modified);
        assert!(snap.lines.iter().all(|l| l.matches.is_empty()));
    }

    // -- Save / open --------------------------------------------------------

    #[test]
    fn save_without_file_name_writes_nothing() {
        let (mut s, store) = session();
        type_text(&mut s, "x");
        s.execute("save");
        assert_eq!(status(&s), "cannot save, no file name given");
        assert!(s.status().is_error());
        assert!(s.buffer().is_modified());
        assert_eq!(s.file_name(), None);
        assert_eq!(store.0.contents("x"), None);
    }

    #[test]
    fn save_writes_rendered_text() {
        let (mut s, store) = session();
        type_text(&mut s, "hi");
        s.handle_key(Key::Enter);
        type_text(&mut s, "there");
        s.execute("save out.txt");

        assert_eq!(store.0.contents("out.txt").as_deref(), Some("hi\nthere\n"));
        assert_eq!(status(&s), "9 bytes written to disk");
        assert_eq!(s.file_name(), Some("out.txt"));
        assert!(!s.buffer().is_modified());
    }

    #[test]
    fn ctrl_s_prompts_for_a_name_then_saves() {
        let (mut s, store) = session();
        type_text(&mut s, "a");
        s.handle_key(Key::Ctrl('s'));
        assert_eq!(s.prompt(), Some("save "));
        type_text(&mut s, "n.txt");
        s.handle_key(Key::Enter);
        assert_eq!(s.prompt(), None);
        assert_eq!(store.0.contents("n.txt").as_deref(), Some("a\n"));

        // Now named: Ctrl+S saves straight away.
        type_text(&mut s, "b");
        s.handle_key(Key::Ctrl('s'));
        assert_eq!(s.prompt(), None);
        assert_eq!(store.0.contents("n.txt").as_deref(), Some("ab\n"));
    }

    #[test]
    fn save_failure_is_reported() {
        let (mut s, store) = session();
        type_text(&mut s, "a");
        store.0.set_read_only(true);
        s.execute("save f");
        assert_eq!(status(&s), "Failed to save file, please try again");
        assert!(s.buffer().is_modified());
        assert_eq!(s.file_name(), None);
    }

    #[test]
    fn open_replaces_buffer_and_resets_cursor() {
        let store = Shared(Rc::new(MemoryStore::new().with_file("b.txt", "one\ntwo\n")));
        let mut s = session_with(Config::default(), &store);
        type_text(&mut s, "scratch");
        s.execute("open b.txt");
        assert_eq!(lines(&s), vec!["one", "two"]);
        assert_eq!(s.cursor().position(), Position::ZERO);
        assert_eq!(status(&s), "Loaded 8 bytes from b.txt");
        assert_eq!(s.file_name(), Some("b.txt"));
        assert!(!s.buffer().is_modified());
    }

    #[test]
    fn open_missing_file_changes_nothing() {
        let (mut s, _) = session();
        type_text(&mut s, "keep");
        s.execute("open nope.txt");
        assert_eq!(status(&s), "The entered file doesn't exist");
        assert_eq!(lines(&s), vec!["keep"]);
        assert_eq!(s.cursor().position(), Position::new(0, 4));
        assert_eq!(s.file_name(), None);
    }

    #[test]
    fn open_saves_current_file_first() {
        let store = Shared(Rc::new(
            MemoryStore::new().with_file("a", "A\n").with_file("b", "B\n"),
        ));
        let mut s = session_with(Config::default(), &store);
        s.execute("open a");
        type_text(&mut s, "x");
        s.execute("open b");
        assert_eq!(store.0.contents("a").as_deref(), Some("xA\n"));
        assert_eq!(lines(&s), vec!["B"]);
    }

    #[test]
    fn open_keeps_buffer_when_current_file_cannot_be_saved() {
        let store = Shared(Rc::new(
            MemoryStore::new().with_file("a", "A\n").with_file("b", "B\n"),
        ));
        let mut s = session_with(Config::default(), &store);
        s.execute("open a");
        type_text(&mut s, "x");
        store.0.set_read_only(true);

        s.execute("open b");
        assert_eq!(status(&s), "Failed to save file, please try again");
        assert!(s.status().is_error());
        assert_eq!(lines(&s), vec!["xA"]);
        assert_eq!(s.cursor().position(), Position::new(0, 1));
        assert_eq!(s.file_name(), Some("a"));
        assert!(s.buffer().is_modified());
        assert_eq!(store.0.contents("a").as_deref(), Some("A\n"));
    }

    #[test]
    fn open_reports_bytes_as_stored() {
        let store = Shared(Rc::new(MemoryStore::new().with_file("w.txt", "one\r\ntwo")));
        let mut s = session_with(Config::default(), &store);
        s.execute("open w.txt");
        assert_eq!(lines(&s), vec!["one", "two"]);
        assert_eq!(status(&s), "Loaded 10 bytes from w.txt");
    }

    #[test]
    fn disk_store_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = Session::new(Config::default(), Box::new(DiskStore::new(dir.path())));
        type_text(&mut s, "on disk");
        s.execute("save d.txt");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("d.txt")).unwrap(),
            "on disk\n"
        );
        s.execute("open d.txt");
        assert_eq!(lines(&s), vec!["on disk"]);
    }

    // -- Search -------------------------------------------------------------

    #[test]
    fn find_places_cursor_and_pages_through_matches() {
        let store = Shared(Rc::new(MemoryStore::new().with_file("f", "ab ab\nab\n")));
        let mut s = session_with(Config::default(), &store);
        s.execute("open f");
        s.execute("find ab");
        assert_eq!(status(&s), "Found 3 matches for \"ab\"");
        assert!(s.search().is_enabled());
        assert_eq!(s.cursor().position(), Position::new(0, 2));

        s.handle_key(Key::PageDown);
        assert_eq!(s.cursor().position(), Position::new(0, 5));
        s.handle_key(Key::PageDown);
        assert_eq!(s.cursor().position(), Position::new(1, 2));
        s.handle_key(Key::PageDown);
        assert_eq!(s.cursor().position(), Position::new(0, 2));
        s.handle_key(Key::PageUp);
        assert_eq!(s.cursor().position(), Position::new(1, 2));

        let snap = s.snapshot();
        assert_eq!(snap.lines[0].matches.len(), 2);
    }

    #[test]
    fn edit_or_escape_disables_search() {
        let store = Shared(Rc::new(MemoryStore::new().with_file("f", "ab\nab\n")));
        let mut s = session_with(Config::default(), &store);
        s.execute("open f");

        s.execute("find ab");
        s.handle_key(Key::Char('z'));
        assert!(!s.search().is_enabled());
        assert_eq!(s.search().match_count(), 0);

        s.execute("find ab");
        s.handle_key(Key::Escape);
        assert!(!s.search().is_enabled());
        assert!(s.snapshot().lines.iter().all(|l| l.matches.is_empty()));
    }

    #[test]
    fn find_invalid_pattern_reports_and_stays_off() {
        let (mut s, _) = session();
        type_text(&mut s, "text");
        s.execute("find (");
        assert!(status(&s).starts_with("invalid search pattern"));
        assert!(!s.search().is_enabled());
        assert_eq!(lines(&s), vec!["text"]);
    }

    #[test]
    fn find_through_prompt() {
        let store = Shared(Rc::new(MemoryStore::new().with_file("f", "a\nb\nneedle\n")));
        let mut s = session_with(Config::default(), &store);
        s.execute("open f");
        s.handle_key(Key::Ctrl('f'));
        type_text(&mut s, "needle");
        s.handle_key(Key::Enter);
        assert_eq!(s.cursor().position(), Position::new(2, 6));
    }

    // -- Console ------------------------------------------------------------

    #[test]
    fn jump_rejects_non_integer_without_moving() {
        let (mut s, _) = session();
        type_text(&mut s, "abc");
        s.execute("jump abc");
        assert_eq!(
            status(&s),
            "invalid argument type, expected integer for argument in position 1"
        );
        assert_eq!(s.cursor().position(), Position::new(0, 3));
    }

    #[test]
    fn jump_moves_vertically_keeping_sticky_column() {
        let store = Shared(Rc::new(
            MemoryStore::new().with_file("f", "long line here\nab\nanother long one\n"),
        ));
        let mut s = session_with(Config::default(), &store);
        s.execute("open f");
        s.handle_key(Key::End);
        s.execute("jump 2");
        assert_eq!(s.cursor().position(), Position::new(1, 2));
        s.execute("jump 3");
        assert_eq!(s.cursor().position(), Position::new(2, 14));
        s.execute("jump 1");
        assert_eq!(s.cursor().row(), 0);
    }

    #[test]
    fn jump_out_of_range() {
        let (mut s, _) = session();
        s.execute("jump 0");
        assert_eq!(status(&s), "line number 0 is out of range (1-1)");
        s.execute("jump 5");
        assert_eq!(status(&s), "line number 5 is out of range (1-1)");
        assert_eq!(s.cursor().position(), Position::ZERO);
    }

    #[test]
    fn word_count_and_unknown() {
        let (mut s, _) = session();
        type_text(&mut s, "I'm doing fine");
        s.execute("word-count");
        assert_eq!(status(&s), "4 words");
        s.execute("explode");
        assert_eq!(status(&s), "please enter a valid command");
        s.execute("quit now");
        assert_eq!(status(&s), "too many arguments for quit");
    }

    #[test]
    fn replace_is_validated_but_inert() {
        let (mut s, _) = session();
        type_text(&mut s, "foo");
        s.execute("replace foo");
        assert_eq!(status(&s), "too few arguments for replace");
        s.execute("replace foo bar");
        assert_eq!(status(&s), "replace is not supported");
        assert_eq!(lines(&s), vec!["foo"]);
    }

    #[test]
    fn empty_line_is_silent() {
        let (mut s, _) = session();
        s.execute("   ");
        assert_eq!(status(&s), Config::default().help_text);
    }

    #[test]
    fn prompt_escape_discards() {
        let (mut s, _) = session();
        s.handle_key(Key::Alt('x'));
        assert_eq!(s.prompt(), Some(""));
        type_text(&mut s, "force-quit");
        assert_eq!(s.handle_key(Key::Escape), Action::Continue);
        assert_eq!(s.prompt(), None);
        assert_eq!(lines(&s), vec![""]);
    }

    #[test]
    fn prompt_line_editing() {
        let (mut s, _) = session();
        s.handle_key(Key::Ctrl('g'));
        keys(
            &mut s,
            &[Key::Char('9'), Key::Left, Key::Backspace, Key::Home, Key::Delete],
        );
        assert_eq!(s.prompt(), Some("ump9"));
        keys(&mut s, &[Key::Char('j'), Key::End, Key::Backspace, Key::Char('1')]);
        assert_eq!(s.prompt(), Some("jump1"));
    }

    // -- Quit guard ---------------------------------------------------------

    #[test]
    fn quit_clean_buffer_exits() {
        let (mut s, _) = session();
        assert_eq!(s.execute("quit"), Action::Quit);
    }

    #[test]
    fn quit_guard_refuses_then_allows() {
        let store = Shared::default();
        let config = Config {
            confirm_quit_presses: 2,
            ..Config::default()
        };
        let mut s = session_with(config, &store);
        type_text(&mut s, "x");

        assert_eq!(s.execute("quit"), Action::Continue);
        assert_eq!(status(&s), "unsaved changes, quit 2 more times to discard them");
        assert_eq!(s.handle_key(Key::Ctrl('q')), Action::Continue);
        assert_eq!(status(&s), "unsaved changes, quit 1 more time to discard them");
        assert_eq!(s.execute("quit"), Action::Quit);
    }

    #[test]
    fn quit_guard_resets_on_edit() {
        let (mut s, _) = session();
        type_text(&mut s, "x");
        assert_eq!(s.execute("quit"), Action::Continue);
        assert_eq!(s.quit_guard().refusals(), 1);

        type_text(&mut s, "y");
        assert_eq!(s.quit_guard().refusals(), 0);
        assert_eq!(s.execute("quit"), Action::Continue);
        assert_eq!(s.execute("quit"), Action::Quit);
    }

    #[test]
    fn force_quit_ignores_guard() {
        let (mut s, _) = session();
        type_text(&mut s, "x");
        assert_eq!(s.execute("force-quit"), Action::Quit);
    }

    #[test]
    fn quit_guard_unit() {
        let mut g = QuitGuard::new(1);
        assert_eq!(g.attempt(false), QuitDecision::Allow);
        assert_eq!(g.attempt(true), QuitDecision::Refuse { remaining: 1 });
        assert_eq!(g.attempt(true), QuitDecision::Allow);
        g.reset();
        assert_eq!(g.attempt(true), QuitDecision::Refuse { remaining: 1 });
    }

    // -- Status -------------------------------------------------------------

    #[test]
    fn status_message_expires_on_tick() {
        let (mut s, _) = session();
        s.execute("word-count");
        assert_eq!(status(&s), "0 words");
        s.tick(Instant::now() + std::time::Duration::from_secs(5));
        assert_eq!(status(&s), Config::default().help_text);
    }
}
