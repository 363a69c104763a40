// SPDX-License-Identifier: MIT
//
// Window-size discovery.
//
// The cheap path is `ioctl(TIOCGWINSZ)`. When that fails or reports zero
// columns (serial consoles, some multiplexers), we fall back to asking the
// terminal itself:
//
//   1. ESC [ 999 C  ESC [ 999 B   push the cursor to the bottom-right
//   2. ESC [ 6 n                  Device Status Report: where am I?
//   3. ESC [ rows ; cols R        the reply, read back from stdin
//
// The cursor can't leave the screen, so its reported position *is* the
// size. The reply is read into a fixed 32-byte scratch buffer (31 bytes of
// payload at most) and parsed without allocating.
//
// This must run in raw mode: in canonical mode the reply sits in the line
// buffer until the user presses Enter.

use std::io::Write;

use tracing::{info, warn};

use crate::ansi;
use crate::error::{ProbeError, Result, TermError};
use crate::input::{ByteSource, ESC};
use crate::terminal::Size;

/// Size of the reply scratch buffer. One slot stays unused, matching the
/// classic `char buf[32]` with room for a terminator, so at most 31 bytes
/// are ever read.
const REPLY_BUF_LEN: usize = 32;

/// Maximum number of reply bytes read before giving up on seeing `R`.
pub const MAX_REPLY_LEN: usize = REPLY_BUF_LEN - 1;

/// Resolve the viewport size.
///
/// `query` is the result of the direct ioctl query (see
/// [`terminal::get_size`](crate::terminal::get_size)); when it is present
/// it wins and the terminal is never probed. Otherwise the cursor-position
/// probe runs against `input` / `output`.
///
/// # Errors
///
/// [`TermError::Write`] or [`TermError::Read`] if the probe can't talk to
/// the terminal, [`TermError::Probe`] if the reply is unusable.
pub fn resolve<S, W>(query: Option<Size>, input: &mut S, output: &mut W) -> Result<Size>
where
    S: ByteSource + ?Sized,
    W: Write + ?Sized,
{
    if let Some(size) = query.filter(|s| s.cols > 0 && s.rows > 0) {
        info!(rows = size.rows, cols = size.cols, "window size from ioctl");
        return Ok(size);
    }

    warn!("window size ioctl unavailable, probing cursor position");
    let size = probe(input, output)?;
    info!(rows = size.rows, cols = size.cols, "window size from cursor probe");
    Ok(size)
}

/// Run the cursor-position probe protocol.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn probe<S, W>(input: &mut S, output: &mut W) -> Result<Size>
where
    S: ByteSource + ?Sized,
    W: Write + ?Sized,
{
    let mut request = Vec::with_capacity(16);
    ansi::cursor_to_bottom_right(&mut request).map_err(TermError::Write)?;
    ansi::request_cursor_position(&mut request).map_err(TermError::Write)?;
    output.write_all(&request).map_err(TermError::Write)?;
    output.flush().map_err(TermError::Write)?;

    let mut buf = [0u8; REPLY_BUF_LEN];
    let len = read_reply(input, &mut buf)?;
    Ok(parse_cursor_report(&buf[..len])?)
}

/// Read reply bytes into `buf` until `R`, a timeout, or [`MAX_REPLY_LEN`].
///
/// Returns the number of bytes stored, including the `R` if one arrived.
fn read_reply<S: ByteSource + ?Sized>(input: &mut S, buf: &mut [u8; REPLY_BUF_LEN]) -> Result<usize> {
    let mut len = 0;
    while len < MAX_REPLY_LEN {
        let Some(byte) = input.read_byte().map_err(TermError::Read)? else {
            break;
        };
        buf[len] = byte;
        len += 1;
        if byte == b'R' {
            break;
        }
    }
    Ok(len)
}

/// Parse a cursor-position report of the form `ESC [ rows ; cols R`.
///
/// # Errors
///
/// - [`ProbeError::Unterminated`] if the reply doesn't end in `R`
/// - [`ProbeError::MissingPrefix`] if it doesn't start with `ESC [`
/// - [`ProbeError::InvalidReport`] if the two numbers are missing,
///   malformed, out of range, or zero
pub fn parse_cursor_report(reply: &[u8]) -> std::result::Result<Size, ProbeError> {
    let body = reply.strip_suffix(b"R").ok_or(ProbeError::Unterminated)?;
    let params = body
        .strip_prefix(&[ESC, b'['])
        .ok_or(ProbeError::MissingPrefix)?;

    let mut fields = params.splitn(2, |&b| b == b';');
    let rows = fields.next().and_then(parse_dimension);
    let cols = fields.next().and_then(parse_dimension);

    match (rows, cols) {
        (Some(rows), Some(cols)) => Ok(Size::new(rows, cols)),
        _ => Err(ProbeError::InvalidReport),
    }
}

/// Parse a non-empty, all-digit, non-zero `u16`.
fn parse_dimension(digits: &[u8]) -> Option<u16> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut value: u16 = 0;
    for &d in digits {
        value = value.checked_mul(10)?.checked_add(u16::from(d - b'0'))?;
    }
    (value > 0).then_some(value)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
