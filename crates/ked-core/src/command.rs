//! Command console — parsing and validating console lines.
//!
//! The console takes one line of free text, splits it on whitespace into a
//! command name and arguments, checks the arguments against the command's
//! registered signature, and produces a typed [`Command`]. Executing the
//! command is the session's job; nothing here touches editor state.
//!
//! # Commands
//!
//! | Command                        | Signature            |
//! |--------------------------------|----------------------|
//! | `save [file]`                  | `[]` or `[text]`     |
//! | `open <file>`                  | `[text]`             |
//! | `quit`                         | `[]`                 |
//! | `force-quit`                   | `[]`                 |
//! | `find <pattern>`               | `[text]`             |
//! | `word-count`                   | `[]`                 |
//! | `jump <line>`                  | `[integer]`          |
//! | `replace <pattern> <text>`     | `[text, text]`       |
//!
//! # Validation
//!
//! Every command goes through the same validator: pick the signature whose
//! length equals the argument count, then run each argument through the typed
//! parser for its kind. Arity is exact; extra words are never glued back into
//! the last text argument, so `find two words` is "too many arguments".

use std::fmt;

use crate::error::CommandError;

// ---------------------------------------------------------------------------
// Argument kinds
// ---------------------------------------------------------------------------

/// The primitive type an argument slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Any word.
    Text,
    /// A signed decimal integer.
    Integer,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Integer => "integer",
        })
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Text(String),
    Integer(i64),
}

/// Parse a word as text. Always succeeds.
#[must_use]
pub fn parse_text(word: &str) -> Option<Arg> {
    Some(Arg::Text(word.to_owned()))
}

/// Parse a word as a signed decimal integer.
#[must_use]
pub fn parse_integer(word: &str) -> Option<Arg> {
    word.parse::<i64>().ok().map(Arg::Integer)
}

impl ArgKind {
    /// Run `word` through this kind's parser.
    #[must_use]
    pub fn parse(self, word: &str) -> Option<Arg> {
        match self {
            Self::Text => parse_text(word),
            Self::Integer => parse_integer(word),
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A validated console command, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write the buffer, optionally under a new file name.
    Save(Option<String>),
    /// Save the current file (if any), then load another.
    Open(String),
    /// Quit, guarded against unsaved changes.
    Quit,
    /// Quit unconditionally.
    ForceQuit,
    /// Build the search index and jump to the first match.
    Find(String),
    /// Report the number of words in the buffer.
    WordCount,
    /// Move the cursor to a 1-indexed line.
    Jump(i64),
    /// Accepted for validation only; never edits the buffer.
    Replace { pattern: String, replacement: String },
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// One entry in the command registry.
pub struct CommandEntry {
    /// Name typed at the console.
    pub name: &'static str,
    /// Accepted argument signatures. No two share a length.
    pub signatures: &'static [&'static [ArgKind]],
    /// Turns validated arguments into a command. `None` only if the
    /// arguments do not match a signature.
    build: fn(Vec<Arg>) -> Option<Command>,
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("signatures", &self.signatures)
            .finish_non_exhaustive()
    }
}

use ArgKind::{Integer, Text};

/// Every command the console understands.
pub static REGISTRY: &[CommandEntry] = &[
    CommandEntry {
        name: "save",
        signatures: &[&[], &[Text]],
        build: build_save,
    },
    CommandEntry {
        name: "open",
        signatures: &[&[Text]],
        build: |args| one_text(args).map(Command::Open),
    },
    CommandEntry {
        name: "quit",
        signatures: &[&[]],
        build: |_| Some(Command::Quit),
    },
    CommandEntry {
        name: "force-quit",
        signatures: &[&[]],
        build: |_| Some(Command::ForceQuit),
    },
    CommandEntry {
        name: "find",
        signatures: &[&[Text]],
        build: |args| one_text(args).map(Command::Find),
    },
    CommandEntry {
        name: "word-count",
        signatures: &[&[]],
        build: |_| Some(Command::WordCount),
    },
    CommandEntry {
        name: "jump",
        signatures: &[&[Integer]],
        build: build_jump,
    },
    CommandEntry {
        name: "replace",
        signatures: &[&[Text, Text]],
        build: build_replace,
    },
];

fn build_save(args: Vec<Arg>) -> Option<Command> {
    if args.is_empty() {
        return Some(Command::Save(None));
    }
    one_text(args).map(|name| Command::Save(Some(name)))
}

fn build_jump(args: Vec<Arg>) -> Option<Command> {
    match <[Arg; 1]>::try_from(args) {
        Ok([Arg::Integer(line)]) => Some(Command::Jump(line)),
        _ => None,
    }
}

fn build_replace(args: Vec<Arg>) -> Option<Command> {
    match <[Arg; 2]>::try_from(args) {
        Ok([Arg::Text(pattern), Arg::Text(replacement)]) => Some(Command::Replace {
            pattern,
            replacement,
        }),
        _ => None,
    }
}

fn one_text(args: Vec<Arg>) -> Option<String> {
    match <[Arg; 1]>::try_from(args) {
        Ok([Arg::Text(text)]) => Some(text),
        _ => None,
    }
}

/// Look a command up by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static CommandEntry> {
    REGISTRY.iter().find(|entry| entry.name == name)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse and validate one console line.
///
/// Returns `Ok(None)` for a blank line.
///
/// # Errors
///
/// [`CommandError::Unknown`] for an unregistered name, the arity errors when
/// no signature has the right length, and
/// [`CommandError::InvalidArgumentType`] for the first argument its kind's
/// parser rejects.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let words: Vec<&str> = words.collect();

    let entry = lookup(name).ok_or_else(|| CommandError::Unknown(name.to_owned()))?;
    let args = validate(entry, &words)?;
    (entry.build)(args)
        .map(Some)
        .ok_or_else(|| CommandError::Unknown(name.to_owned()))
}

/// Check `words` against `entry`'s signatures and parse them.
///
/// # Errors
///
/// See [`parse`].
pub fn validate(entry: &CommandEntry, words: &[&str]) -> Result<Vec<Arg>, CommandError> {
    let Some(signature) = entry.signatures.iter().find(|sig| sig.len() == words.len()) else {
        let min = entry.signatures.iter().map(|sig| sig.len()).min().unwrap_or(0);
        return Err(if words.len() < min {
            CommandError::TooFewArguments(entry.name)
        } else {
            CommandError::TooManyArguments(entry.name)
        });
    };

    signature
        .iter()
        .zip(words)
        .enumerate()
        .map(|(i, (kind, word))| {
            kind.parse(word).ok_or(CommandError::InvalidArgumentType {
                expected: *kind,
                position: i + 1,
            })
        })
        .collect()
}

/// Count maximal runs of alphabetic characters.
#[must_use]
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for ch in text.chars() {
        let alpha = ch.is_alphabetic();
        if alpha && !in_word {
            count += 1;
        }
        in_word = alpha;
    }
    count
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// The console prompt's input buffer.
///
/// Tracks the text being typed and the cursor within it. The prompt is
/// opened pre-filled by the key bindings (`find `, `open `, ...), so the
/// cursor starts at the end of any initial text.
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    input: String,

    /// Cursor position within `input` (char offset, 0-indexed).
    cursor: usize,
}

impl CommandLine {
    /// Create an empty prompt.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
            cursor: 0,
        }
    }

    /// Create a prompt holding `text`, cursor at the end.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self {
            input: text.to_owned(),
            cursor: text.chars().count(),
        }
    }

    /// The current input text.
    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The cursor position within the input (char offset).
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.insert(byte_idx, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor. Returns `true` if one was
    /// deleted.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.remove(byte_idx);
        true
    }

    /// Delete the character under the cursor. Returns `true` if one was
    /// deleted.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let byte_idx = self.char_to_byte(self.cursor);
        self.input.remove(byte_idx);
        true
    }

    pub const fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Take the input out, leaving the prompt empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    /// True if the input is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    fn len(&self) -> usize {
        self.input.chars().count()
    }

    /// Convert a char offset to a byte offset in `self.input`.
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_idx)
            .map_or(self.input.len(), |(byte_idx, _)| byte_idx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
