//! Error taxonomy for the editor core.
//!
//! Every failure here is recoverable: the [`Session`](crate::session::Session)
//! catches it, turns its `Display` text into a transient status message, and
//! leaves the buffer and cursor as they were. Nothing in the core unwinds or
//! terminates the process.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::command::ArgKind;

/// A file load or save failed.
#[derive(Debug, Error)]
#[error("{}: {source}", .path.display())]
pub struct IoError {
    /// The path the operation was attempted on.
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl IoError {
    /// Wrap an `io::Error` with the path it happened on.
    #[must_use]
    pub fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True if the file did not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == io::ErrorKind::NotFound
    }
}

/// Building a search index failed.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search pattern \"{pattern}\"")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A console line was rejected before dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("please enter a valid command")]
    Unknown(String),

    #[error("too few arguments for {0}")]
    TooFewArguments(&'static str),

    #[error("too many arguments for {0}")]
    TooManyArguments(&'static str),

    /// `position` is 1-indexed, as shown to the user.
    #[error("invalid argument type, expected {expected} for argument in position {position}")]
    InvalidArgumentType { expected: ArgKind, position: usize },

    #[error("cannot save, no file name given")]
    NoFileName,

    #[error("line number {line} is out of range (1-{max})")]
    LineOutOfRange { line: i64, max: usize },
}

/// The configuration file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Umbrella error for everything the core can report.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
