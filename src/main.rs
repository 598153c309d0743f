// SPDX-License-Identifier: MIT
//
// ked — a keystroke-driven line editor.
//
// This binary is a headless driver around ked-core. It reads a script from
// stdin, one line per step, and prints the status line after each step:
//
//   :<command>        run a console command          (:find foo, :save)
//   @<key> <key> ...  send named keys                (@ctrl+f, @pgdn down)
//   anything else     typed as characters, then Enter
//
// It stops at end of input or when the session quits. The file store is the
// working directory, and options come from $KED_CONFIG or ./ked.yaml.
//
//   stdin → feed_line → Session::{execute, handle_key} → status → stdout
//
// Logging goes to stderr, filtered by RUST_LOG (default `warn`).

use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use ked_core::command::Command;
use ked_core::{Action, Config, DiskStore, Key, Session};

// ─── Setup ──────────────────────────────────────────────────────────────────

/// Install the stderr subscriber. `RUST_LOG` wins over the default level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

/// `$KED_CONFIG` if set, else `ked.yaml` in the working directory.
fn config_path() -> PathBuf {
    env::var_os("KED_CONFIG").map_or_else(|| PathBuf::from("ked.yaml"), PathBuf::from)
}

/// Open `file` if it exists; otherwise just name the buffer so the first
/// save creates it.
fn open_initial(session: &mut Session, file: &str, exists: bool) {
    if exists {
        session.dispatch(Command::Open(file.to_owned()));
    } else {
        session.set_file_name(file);
    }
}

// ─── Script loop ────────────────────────────────────────────────────────────

/// Apply one script line to the session.
fn feed_line(session: &mut Session, line: &str) -> Action {
    session.tick(Instant::now());

    if let Some(cmd) = line.strip_prefix(':') {
        return session.execute(cmd);
    }

    if let Some(names) = line.strip_prefix('@') {
        for name in names.split_whitespace() {
            match name.parse::<Key>() {
                Ok(key) => {
                    if session.handle_key(key) == Action::Quit {
                        return Action::Quit;
                    }
                }
                Err(e) => warn!("{e}"),
            }
        }
        return Action::Continue;
    }

    for ch in line.chars() {
        session.handle_key(Key::Char(ch));
    }
    session.handle_key(Key::Enter)
}

/// Feed every line of `input`, writing the status after each. Returns
/// whether the session asked to quit.
fn run(
    session: &mut Session,
    input: impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<Action> {
    for line in input.lines() {
        let line = line.context("failed to read script line")?;
        let action = feed_line(session, &line);
        writeln!(out, "{}", session.status().text()).context("failed to write status")?;
        if action == Action::Quit {
            return Ok(Action::Quit);
        }
    }
    Ok(Action::Continue)
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load(&config_path());
    let store = DiskStore::default();
    debug!(root = %store.root().display(), "file store ready");
    let mut session = Session::new(config, Box::new(store));

    if let Some(file) = env::args().nth(1) {
        let exists = Path::new(&file).exists();
        open_initial(&mut session, &file, exists);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    run(&mut session, stdin.lock(), &mut stdout)?;
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ked_core::MemoryStore;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session::new(Config::default(), Box::new(MemoryStore::new()))
    }

    fn script(session: &mut Session, text: &str) -> (Action, Vec<String>) {
        let mut out = Vec::new();
        let action = run(session, text.as_bytes(), &mut out).unwrap();
        let lines = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect();
        (action, lines)
    }

    // ── feed_line ─────────────────────────────────────────────────────────

    #[test]
    fn plain_lines_are_typed_with_enter() {
        let mut s = session();
        feed_line(&mut s, "hello");
        feed_line(&mut s, "world");
        let lines: Vec<String> = s.buffer().lines().collect();
        assert_eq!(lines, vec!["hello", "world", ""]);
    }

    #[test]
    fn colon_lines_run_commands() {
        let mut s = session();
        feed_line(&mut s, "one two");
        feed_line(&mut s, ":word-count");
        assert_eq!(s.status().text(), "2 words");
    }

    #[test]
    fn at_lines_send_named_keys() {
        let mut s = session();
        feed_line(&mut s, "abc");
        feed_line(&mut s, "@up end backspace");
        let lines: Vec<String> = s.buffer().lines().collect();
        assert_eq!(lines, vec!["ab", ""]);
    }

    #[test]
    fn bad_key_names_are_skipped() {
        let mut s = session();
        assert_eq!(feed_line(&mut s, "@bogus x"), Action::Continue);
        let lines: Vec<String> = s.buffer().lines().collect();
        assert_eq!(lines, vec!["x"]);
    }

    #[test]
    fn prompt_accepts_typed_line() {
        let mut s = session();
        feed_line(&mut s, "needle");
        feed_line(&mut s, "@ctrl+f");
        assert_eq!(s.prompt(), Some("find "));
        feed_line(&mut s, "needle");
        assert_eq!(s.status().text(), "Found 1 matches for \"needle\"");
    }

    // ── run ───────────────────────────────────────────────────────────────

    #[test]
    fn run_prints_status_per_line() {
        let mut s = session();
        let (action, out) = script(&mut s, ":word-count\n:jump x\n");
        assert_eq!(action, Action::Continue);
        assert_eq!(
            out,
            vec![
                "0 words",
                "invalid argument type, expected integer for argument in position 1",
            ]
        );
    }

    #[test]
    fn run_stops_at_quit() {
        let mut s = session();
        let (action, out) = script(&mut s, ":quit\nnever typed\n");
        assert_eq!(action, Action::Quit);
        assert_eq!(out.len(), 1);
        assert_eq!(s.buffer().line_text(0), "");
    }

    #[test]
    fn run_quit_guard_needs_confirmation() {
        let mut s = session();
        let (action, _) = script(&mut s, "dirty\n:quit\n:quit\n");
        assert_eq!(action, Action::Quit);
    }

    // ── Startup ───────────────────────────────────────────────────────────

    #[test]
    fn missing_initial_file_only_names_buffer() {
        let mut s = session();
        open_initial(&mut s, "new.txt", false);
        assert_eq!(s.file_name(), Some("new.txt"));
        assert_eq!(s.buffer().line_count(), 1);
    }

    #[test]
    fn existing_initial_file_is_loaded() {
        let store = MemoryStore::new().with_file("a.txt", "x\ny\n");
        let mut s = Session::new(Config::default(), Box::new(store));
        open_initial(&mut s, "a.txt", true);
        let lines: Vec<String> = s.buffer().lines().collect();
        assert_eq!(lines, vec!["x", "y"]);
    }
}
