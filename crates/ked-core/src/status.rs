//! Status line — the help text and transient messages under the buffer.
//!
//! Every command reports back through a short message. A message replaces the
//! help text until the configured timeout passes; the session calls
//! [`StatusLine::tick`] once per loop iteration to restore it. Time is always
//! passed in, so nothing here reads the clock.

use std::time::{Duration, Instant};

/// The message currently shown, with its kind and the time it was set.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Message {
    text: String,
    is_error: bool,
    since: Instant,
}

/// Default text plus an optional timed message.
#[derive(Debug, Clone)]
pub struct StatusLine {
    default_text: String,
    message: Option<Message>,
    timeout: Duration,
}

impl StatusLine {
    /// A status line that falls back to `default_text` after `timeout`.
    #[must_use]
    pub fn new(default_text: impl Into<String>, timeout: Duration) -> Self {
        Self {
            default_text: default_text.into(),
            message: None,
            timeout,
        }
    }

    /// The text to display: the message if one is live, otherwise the
    /// default.
    #[must_use]
    pub fn text(&self) -> &str {
        self.message
            .as_ref()
            .map_or(self.default_text.as_str(), |m| m.text.as_str())
    }

    /// True if the live message reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.message.as_ref().is_some_and(|m| m.is_error)
    }

    /// Show an informational message from `now`.
    pub fn set_message(&mut self, text: impl Into<String>, now: Instant) {
        self.message = Some(Message {
            text: text.into(),
            is_error: false,
            since: now,
        });
    }

    /// Show an error message from `now`.
    pub fn set_error(&mut self, text: impl Into<String>, now: Instant) {
        self.message = Some(Message {
            text: text.into(),
            is_error: true,
            since: now,
        });
    }

    /// Restore the default text once the message has been up longer than
    /// the timeout.
    pub fn tick(&mut self, now: Instant) {
        if self
            .message
            .as_ref()
            .is_some_and(|m| now.saturating_duration_since(m.since) > self.timeout)
        {
            self.message = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> StatusLine {
        StatusLine::new("help", Duration::from_millis(3500))
    }

    #[test]
    fn shows_default_without_message() {
        let s = status();
        assert_eq!(s.text(), "help");
        assert!(!s.is_error());
    }

    #[test]
    fn message_expires_after_timeout() {
        let t0 = Instant::now();
        let mut s = status();
        s.set_message("12 bytes written to disk", t0);
        assert_eq!(s.text(), "12 bytes written to disk");

        s.tick(t0 + Duration::from_millis(3500));
        assert_eq!(s.text(), "12 bytes written to disk");

        s.tick(t0 + Duration::from_millis(3501));
        assert_eq!(s.text(), "help");
    }

    #[test]
    fn new_message_restarts_timer() {
        let t0 = Instant::now();
        let mut s = status();
        s.set_message("first", t0);
        s.set_error("second", t0 + Duration::from_secs(3));
        s.tick(t0 + Duration::from_secs(4));
        assert_eq!(s.text(), "second");
        assert!(s.is_error());
    }
}
