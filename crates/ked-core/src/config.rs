//! Editor configuration — `ked.yaml`.
//!
//! Every key is optional; a missing key takes its default, and a missing or
//! broken file gives the full default configuration.
//!
//! | Key                    | Type    | Default                               |
//! |------------------------|---------|---------------------------------------|
//! | `tab_width`            | integer | 4                                     |
//! | `confirm_quit_presses` | integer | 1                                     |
//! | `auto_indent`          | bool    | true                                  |
//! | `message_timeout_ms`   | integer | 3500                                  |
//! | `status_template`      | string  | `{file} - {lines} lines{modified}`    |
//! | `help_text`            | string  | the command help line                 |
//!
//! `status_template` is carried for the status-bar formatter and is never
//! interpreted by the core.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Help line shown in the status bar when there is no message.
pub const DEFAULT_HELP_TEXT: &str =
    "COMMANDS: Ctrl+S - save | Ctrl+O - open | Ctrl+F - find | Ctrl+Q - quit ";

/// Editor configuration, read-only once the session starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tab stops every this many columns. At least 1.
    pub tab_width: usize,

    /// Quit attempts refused while there are unsaved changes. At least 1.
    pub confirm_quit_presses: u32,

    /// Indent new lines with the leading spaces of the line being split.
    pub auto_indent: bool,

    /// How long a status message stays before the help text returns.
    pub message_timeout_ms: u64,

    /// Status-bar format, consumed by the renderer.
    pub status_template: String,

    /// Default status text.
    pub help_text: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_width: 4,
            confirm_quit_presses: 1,
            auto_indent: true,
            message_timeout_ms: 3500,
            status_template: "{file} - {lines} lines{modified}".to_string(),
            help_text: DEFAULT_HELP_TEXT.to_string(),
        }
    }
}

impl Config {
    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed YAML or a mistyped value,
    /// [`ConfigError::Invalid`] for a zero `tab_width` or
    /// `confirm_quit_presses`.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or return defaults if the file is missing or
    /// unusable.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Reject values the editor cannot work with.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_width == 0 {
            return Err(ConfigError::Invalid("tab_width must be at least 1".into()));
        }
        if self.confirm_quit_presses == 0 {
            return Err(ConfigError::Invalid(
                "confirm_quit_presses must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// `message_timeout_ms` as a `Duration`.
    #[must_use]
    pub const fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
