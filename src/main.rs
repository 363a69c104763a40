// SPDX-License-Identifier: MIT
//
// kilo — a minimal terminal text viewer.
//
// This is the binary that wires the two crates together:
//
//   kilo-term   → raw mode, window size, key decoding, frame rendering
//   kilo-editor → cursor, document, the editor loop
//
// Startup order matters:
//
//   1. parse argv, set up logging (if asked)
//   2. load the document      ← before raw mode, so a bad path fails cleanly
//   3. enter raw mode         ← from here on the guard owns cleanup
//   4. resolve the window size (ioctl, else cursor probe)
//   5. run until Ctrl-Q
//
// On any error the editor (and with it the raw-mode guard) is dropped
// first, then the screen is wiped and the error chain goes to stderr.

mod config;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use kilo_editor::document::Document;
use kilo_editor::editor::Editor;
use kilo_term::ansi;
use kilo_term::output::TtyWriter;
use kilo_term::reader::StdinReader;
use kilo_term::terminal::{self, RawMode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Command, Config, usage};

/// Environment variable holding the log filter (`EnvFilter` syntax).
const LOG_ENV: &str = "KILO_LOG";

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("kilo: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match config.command {
        Command::Help => {
            println!("{}", usage());
            return ExitCode::SUCCESS;
        }
        Command::Version => {
            println!("kilo {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Command::Edit => {}
    }

    if let Some(path) = &config.log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("kilo: {e:#}");
            return ExitCode::FAILURE;
        }
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            die(&e)
        }
    }
}

/// Open the document, enter raw mode, and run the editor to completion.
fn run(config: &Config) -> Result<()> {
    let document = match &config.path {
        Some(path) => Document::open(path).context("failed to load document")?,
        None => Document::new(),
    };

    if !terminal::is_tty() {
        bail!("stdin is not a terminal");
    }
    let mode = RawMode::enable().context("failed to enter raw mode")?;
    let mut editor = Editor::with_geometry(
        mode,
        StdinReader::new(),
        TtyWriter::new(),
        terminal::get_size(),
        document,
    )
    .context("failed to get window size")?;

    editor.run()?;
    info!("bye");
    Ok(())
}

/// Install a file-backed subscriber. Stdout is the screen, so logs can
/// only ever go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install log subscriber")?;

    info!(version = env!("CARGO_PKG_VERSION"), "kilo starting");
    Ok(())
}

/// Fatal exit: wipe the screen, report, fail.
///
/// By the time this runs the raw-mode guard has already been dropped.
fn die(e: &anyhow::Error) -> ExitCode {
    let wipe = fatal_wipe(terminal::is_stdout_tty());
    if !wipe.is_empty() {
        let mut tty = TtyWriter::new();
        let _ = tty.write_all(&wipe);
    }
    eprintln!("kilo: {e:#}");
    ExitCode::FAILURE
}

/// Bytes that clear the screen on the way out. Nothing when stdout isn't a
/// terminal, so redirected output stays free of escape sequences.
fn fatal_wipe(stdout_is_tty: bool) -> Vec<u8> {
    let mut wipe = Vec::with_capacity(8);
    if stdout_is_tty {
        // Vec writes can't fail.
        ansi::wipe(&mut wipe).ok();
    }
    wipe
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fatal_wipe_clears_a_terminal() {
        assert_eq!(fatal_wipe(true), b"\x1b[2J\x1b[H".to_vec());
    }

    #[test]
    fn fatal_wipe_leaves_redirected_output_alone() {
        assert!(fatal_wipe(false).is_empty());
    }
}
