//! File store — where buffers come from and go to.
//!
//! The session never touches the filesystem directly. It goes through a
//! [`FileStore`], which loads a file as a list of lines and saves the
//! rendered buffer text. Both operations are all-or-nothing: a load either
//! yields every line or fails, a save either replaces the whole file or
//! leaves the old one in place.
//!
//! [`DiskStore`] is the real implementation. [`MemoryStore`] keeps files in
//! a map so sessions can be driven without a disk.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::IoError;

/// A file read by [`FileStore::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    /// Lines without their terminators.
    pub lines: Vec<String>,
    /// Size of the file as read, terminators included.
    pub bytes: u64,
}

impl LoadedFile {
    fn from_content(content: &str) -> Self {
        Self {
            lines: split_lines(content),
            bytes: content.len() as u64,
        }
    }
}

/// Load and save whole files.
pub trait FileStore {
    /// Read `path` as lines.
    ///
    /// # Errors
    ///
    /// [`IoError`] if the file is missing, unreadable, or not UTF-8.
    fn load(&self, path: &Path) -> Result<LoadedFile, IoError>;

    /// Replace `path` with `text`. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`IoError`] if the file could not be written. The previous contents
    /// are left untouched.
    fn save(&self, path: &Path, text: &str) -> Result<u64, IoError>;
}

/// Split file contents into lines. `\n` and `\r\n` both end a line, and a
/// final terminator does not start an extra empty line.
fn split_lines(content: &str) -> Vec<String> {
    content.lines().map(str::to_owned).collect()
}

// ---------------------------------------------------------------------------
// DiskStore
// ---------------------------------------------------------------------------

/// A [`FileStore`] on the local filesystem.
///
/// Relative paths resolve against `root`. Saves go to a temp file in the
/// target's directory which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// A store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory relative paths resolve against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` against the root. Absolute paths pass through.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl Default for DiskStore {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileStore for DiskStore {
    fn load(&self, path: &Path) -> Result<LoadedFile, IoError> {
        let full = self.resolve(path);
        let content = fs::read_to_string(&full).map_err(|e| IoError::new(path, e))?;
        Ok(LoadedFile::from_content(&content))
    }

    fn save(&self, path: &Path, text: &str) -> Result<u64, IoError> {
        let full = self.resolve(path);
        let dir = full
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let write = || -> io::Result<()> {
            let mut tmp = NamedTempFile::new_in(dir)?;
            tmp.write_all(text.as_bytes())?;
            tmp.flush()?;
            tmp.as_file().sync_all()?;
            tmp.persist(&full).map_err(|e| e.error)?;
            Ok(())
        };
        write().map_err(|e| IoError::new(path, e))?;

        Ok(text.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// A [`FileStore`] backed by a map from path to contents.
///
/// Paths are used as given, with no resolution. A store can be made
/// read-only to exercise save failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<HashMap<PathBuf, String>>,
    read_only: Cell<bool>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, content: &str) {
        self.files.borrow_mut().insert(path.into(), content.to_owned());
    }

    /// Current contents of a file.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Make every following save fail (or succeed again).
    pub fn set_read_only(&self, on: bool) {
        self.read_only.set(on);
    }
}

impl FileStore for MemoryStore {
    fn load(&self, path: &Path) -> Result<LoadedFile, IoError> {
        self.files
            .borrow()
            .get(path)
            .map(|content| LoadedFile::from_content(content))
            .ok_or_else(|| IoError::new(path, io::ErrorKind::NotFound.into()))
    }

    fn save(&self, path: &Path, text: &str) -> Result<u64, IoError> {
        if self.read_only.get() {
            return Err(IoError::new(path, io::ErrorKind::PermissionDenied.into()));
        }
        self.insert(path, text);
        Ok(text.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
