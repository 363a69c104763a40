// SPDX-License-Identifier: MIT
//
// Frame renderer.
//
// Turns (viewport size, visible lines, cursor) into one buffer of escape
// sequences and writes it in one go:
//
//   ESC[?25l  ESC[H                hide cursor, go home
//   <row 0> ESC[K \r\n             every row: content, clear-to-EOL,
//   <row 1> ESC[K \r\n             CR/LF between rows...
//   ...
//   <last>  ESC[K                  ...but not after the last (no scroll)
//   ESC[r;cH  ESC[?25h             place the real cursor, show it
//
// Rows past the end of the content get a `~` marker. When there is no
// content at all, the row a third of the way down carries a centered
// version banner instead.
//
// Content bytes go out as stored: control characters (ESC, TAB, ...) are
// neither escaped nor expanded, and count as zero columns when truncating.
//
// Content is pulled through the `LineSource` trait, so the renderer never
// knows what kind of buffer it's drawing, only how many lines there are
// and what each one says.

use std::borrow::Cow;
use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi;
use crate::output::OutputBuffer;
use crate::terminal::Size;

/// Version string shown in the welcome banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─── Line Source ────────────────────────────────────────────────────────────

/// Read-only access to the lines being displayed.
pub trait LineSource {
    /// Number of lines available.
    fn line_count(&self) -> usize;

    /// The text of line `index`, without its line terminator.
    ///
    /// Only called with `index < line_count()`.
    fn line_at(&self, index: usize) -> Cow<'_, str>;
}

impl<S: AsRef<str>> LineSource for [S] {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_at(&self, index: usize) -> Cow<'_, str> {
        Cow::Borrowed(self[index].as_ref())
    }
}

impl<S: AsRef<str>> LineSource for Vec<S> {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_at(&self, index: usize) -> Cow<'_, str> {
        self.as_slice().line_at(index)
    }
}

// ─── Frame ──────────────────────────────────────────────────────────────────

/// Compose a full frame into `buf`.
///
/// `cursor` is `(row, col)`, 0-indexed.
pub fn draw_frame<L: LineSource + ?Sized>(
    buf: &mut OutputBuffer,
    size: Size,
    lines: &L,
    cursor: (u16, u16),
) {
    // Writes into a Vec-backed buffer can't fail.
    ansi::cursor_hide(buf).ok();
    ansi::cursor_home(buf).ok();

    draw_rows(buf, size, lines);

    ansi::cursor_to(buf, cursor.0, cursor.1).ok();
    ansi::cursor_show(buf).ok();
}

/// Compose a frame and emit it with a single write.
///
/// # Errors
///
/// Returns an error if writing to `w` fails.
pub fn render_frame<L, W>(w: &mut W, size: Size, lines: &L, cursor: (u16, u16)) -> io::Result<()>
where
    L: LineSource + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = OutputBuffer::new();
    draw_frame(&mut buf, size, lines, cursor);
    buf.flush_to(w)
}

fn draw_rows<L: LineSource + ?Sized>(buf: &mut OutputBuffer, size: Size, lines: &L) {
    let cols = usize::from(size.cols);
    let count = lines.line_count();

    for y in 0..size.rows {
        let index = usize::from(y);
        if index < count {
            let line = lines.line_at(index);
            buf.push_bytes(truncate_to_width(&line, cols).as_bytes());
        } else if count == 0 && y == size.rows / 3 {
            draw_banner(buf, cols);
        } else {
            buf.push_bytes(b"~");
        }

        ansi::clear_line(buf).ok();
        if y + 1 < size.rows {
            buf.push_bytes(b"\r\n");
        }
    }
}

/// Centered welcome banner; the first padding column is a `~` marker.
fn draw_banner(buf: &mut OutputBuffer, cols: usize) {
    let banner = format!("Kilo editor -- version {VERSION}");
    let shown = &banner[..banner.len().min(cols)];

    let mut padding = (cols - shown.len()) / 2;
    if padding > 0 {
        buf.push_bytes(b"~");
        padding -= 1;
    }
    buf.push_repeated(b' ', padding);
    buf.push_bytes(shown.as_bytes());
}

/// Longest prefix of `line` that fits in `cols` terminal columns.
///
/// A wide character that would straddle the right edge is left out.
/// Characters with no defined width (control bytes) count as zero.
#[must_use]
pub fn truncate_to_width(line: &str, cols: usize) -> &str {
    let mut width = 0;
    for (idx, ch) in line.char_indices() {
        let w = ch.width().unwrap_or(0);
        if width + w > cols {
            return &line[..idx];
        }
        width += w;
    }
    line
}

// ─── Tests ───────────────────────────────────────────────────────────────────
