// SPDX-License-Identifier: MIT
//
// kilo-term — Terminal protocol layer for kilo.
//
// Everything that touches the wire between the editor and the terminal
// lives here: raw mode via termios, window-size discovery (with the
// cursor-position probe fallback), decoding of raw input bytes into a
// small closed set of keys, and the frame renderer that turns a viewport
// of lines into one buffered write.
//
// No TUI framework sits underneath. Escape sequences are written by hand
// in `ansi`, and raw mode is negotiated directly with libc.

pub mod ansi;
pub mod error;
pub mod geometry;
pub mod input;
pub mod output;
pub mod reader;
pub mod render;
pub mod terminal;

pub use error::{ProbeError, TermError};
