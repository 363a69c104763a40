// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — that's the renderer's job. This module
// just knows the byte-level encoding of every terminal command kilo sends.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).
use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(row, col)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, row: u16, col: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(row) + 1, u32::from(col) + 1)
}

/// Move the cursor to the top-left cell (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Push the cursor as far right and down as the terminal allows.
///
/// CUF and CUD are clamped by the terminal at the screen edge, so 999 of
/// each lands on the bottom-right cell without knowing the size. Used as
/// the first half of the window-size probe.
#[inline]
pub fn cursor_to_bottom_right(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The reply arrives on the input stream as `ESC [ rows ; cols R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear from the cursor to the end of the line (EL 0).
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Clear the screen and park the cursor at the top-left.
///
/// This is what the user sees last before kilo exits, on both the quit
/// path and the fatal-error path.
pub fn wipe(w: &mut impl Write) -> io::Result<()> {
    clear_screen(w)?;
    cursor_home(w)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
