//! # ked-core — Editor core for ked
//!
//! Everything the editor does between "a key arrived" and "here is what to
//! draw", with no terminal in sight:
//!
//! - **[`position`]** — `Position` (row, col), 0-indexed
//! - **[`buffer`]** — `Buffer`, the line sequence over a rope, with edits
//! - **[`cursor`]** — cursor movement with a sticky column
//! - **[`viewport`]** — minimal-scroll window that follows the cursor
//! - **[`search`]** — regex match index with cyclic navigation
//! - **[`command`]** — console line parsing and argument validation
//! - **[`key`]** — the abstract key events the session consumes
//! - **[`status`]** — help text and timed status messages
//! - **[`config`]** — `ked.yaml` options
//! - **[`file_store`]** — whole-file load/save behind a trait
//! - **[`error`]** — error types
//! - **[`session`]** — `Session`, which ties the above together
//! - **[`snapshot`]** — the read-only frame handed to a renderer

pub mod buffer;
pub mod command;
pub mod config;
pub mod cursor;
pub mod error;
pub mod file_store;
pub mod key;
pub mod position;
pub mod search;
pub mod session;
pub mod snapshot;
pub mod status;
pub mod viewport;

pub use config::Config;
pub use error::EditorError;
pub use file_store::{DiskStore, FileStore, LoadedFile, MemoryStore};
pub use key::Key;
pub use session::{Action, Session};
