// SPDX-License-Identifier: MIT
//
// Error taxonomy for the terminal layer.
//
// Everything here is fatal from the editor's point of view: if termios
// can't be read or written, or the viewport size can't be discovered,
// the terminal can't be trusted and the caller should restore what it
// can and exit. Decode anomalies (malformed escape sequences) are not
// errors at all; the key decoder folds them into `Key::Escape`.

use std::io;

use thiserror::Error;

/// Fatal terminal errors.
#[derive(Debug, Error)]
pub enum TermError {
    /// `tcgetattr` failed while capturing the original mode.
    #[error("failed to read terminal attributes: {0}")]
    GetAttr(#[source] io::Error),

    /// `tcsetattr` failed while entering or restoring a mode.
    #[error("failed to set terminal attributes: {0}")]
    SetAttr(#[source] io::Error),

    /// Reading from the terminal failed for a reason other than a timeout.
    #[error("failed to read from terminal: {0}")]
    Read(#[source] io::Error),

    /// Writing to the terminal failed.
    #[error("failed to write to terminal: {0}")]
    Write(#[source] io::Error),

    /// The cursor-position probe produced an unusable reply.
    #[error("window size probe failed: {0}")]
    Probe(#[from] ProbeError),
}

/// Why a cursor-position report (`ESC [ rows ; cols R`) was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The reply did not start with `ESC [`.
    #[error("reply does not start with ESC [")]
    MissingPrefix,

    /// No terminating `R` arrived before the scratch buffer filled or
    /// the input went quiet.
    #[error("reply not terminated by R")]
    Unterminated,

    /// The `rows;cols` pair was missing, malformed, or zero.
    #[error("reply does not contain a valid rows;cols pair")]
    InvalidReport,
}

pub type Result<T> = std::result::Result<T, TermError>;

// ─── Tests ───────────────────────────────────────────────────────────────────
