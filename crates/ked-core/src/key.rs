//! Key events — the abstract input the session consumes.
//!
//! Decoding raw terminal bytes into keys happens outside the core. By the
//! time a [`Key`] reaches the session it is one of a small closed set:
//! a printable character, an editing or navigation key, or a named Ctrl/Alt
//! combination.
//!
//! Keys also have a textual name (`enter`, `pgdn`, `ctrl+s`, `alt+x`) used
//! by scripted drivers; see [`Key::from_str`](std::str::FromStr).

use std::fmt;
use std::str::FromStr;

/// One input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character.
    Char(char),
    // ── Editing ─────────────────────────────────────────────
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    // ── Navigation ──────────────────────────────────────────
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Combinations ────────────────────────────────────────
    /// Ctrl plus a letter, stored lowercase.
    Ctrl(char),
    /// Alt plus a letter, stored lowercase.
    Alt(char),
    /// A poll with no input.
    None,
}

/// Named keys and their accepted spellings. The first spelling is the
/// canonical one used by `Display`.
const NAMED: &[(Key, &[&str])] = &[
    (Key::Backspace, &["backspace", "bs"]),
    (Key::Delete, &["delete", "del"]),
    (Key::Enter, &["enter", "ret"]),
    (Key::Tab, &["tab"]),
    (Key::Escape, &["esc", "escape"]),
    (Key::Left, &["left"]),
    (Key::Right, &["right"]),
    (Key::Up, &["up"]),
    (Key::Down, &["down"]),
    (Key::Home, &["home"]),
    (Key::End, &["end"]),
    (Key::PageUp, &["pgup", "pageup"]),
    (Key::PageDown, &["pgdn", "pagedown"]),
    (Key::None, &["none"]),
];

/// A key name that did not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key \"{0}\"")]
pub struct UnknownKey(pub String);

impl FromStr for Key {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();

        let combo = |prefix: &str| {
            lower.strip_prefix(prefix).and_then(|rest| {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
                    _ => None,
                }
            })
        };
        if let Some(c) = combo("ctrl+") {
            return Ok(Self::Ctrl(c));
        }
        if let Some(c) = combo("alt+") {
            return Ok(Self::Alt(c));
        }

        if let Some((key, _)) = NAMED.iter().find(|(_, names)| names.contains(&lower.as_str())) {
            return Ok(*key);
        }

        if lower == "space" {
            return Ok(Self::Char(' '));
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Ok(Self::Char(c)),
            _ => Err(UnknownKey(s.to_owned())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(' ') => f.write_str("space"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Ctrl(c) => write!(f, "ctrl+{c}"),
            Self::Alt(c) => write!(f, "alt+{c}"),
            named => {
                let name = NAMED
                    .iter()
                    .find(|(k, _)| k == named)
                    .map_or("?", |(_, names)| names[0]);
                f.write_str(name)
            }
        }
    }
}
