// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Output buffering.
//
// OutputBuffer accumulates every byte of a frame in memory so the whole
// frame reaches the terminal in a single write() call. The terminal never
// sees a half-drawn screen (no flicker), and the per-escape syscall cost
// disappears.
//
// A buffer belongs to one render pass: it is filled, flushed once, and
// dropped. Nothing carries over between frames.
//
// TtyWriter is the other half of that contract. `io::stdout()` is line
// buffered: handed a frame full of CR/LF pairs, it writes everything up to
// the last newline and holds the tail back for a second syscall. TtyWriter
// writes straight to fd 1 with no buffer of its own.

use std::io::{self, Write};

/// A byte buffer that accumulates ANSI output for a single `write()` syscall.
///
/// Default capacity: 4 KB — a full 80×24 frame with escapes fits without
/// reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 4096;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (4 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single byte `n` times.
    pub fn push_repeated(&mut self, byte: u8, n: usize) {
        self.buf.resize(self.buf.len() + n, byte);
    }

    /// Write accumulated output to an arbitrary writer and clear the buffer.
    ///
    /// The bytes go out through one `write_all`, so a writer that accepts
    /// the whole slice sees exactly one `write` call.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to<W: Write + ?Sized>(&mut self, w: &mut W) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── TtyWriter ───────────────────────────────────────────────────────────────

/// Unbuffered writer over stdout's file descriptor.
///
/// Every `write` is one `write(2)` call.
#[derive(Debug, Default)]
pub struct TtyWriter {
    _private: (),
}

impl TtyWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Write for TtyWriter {
    #[cfg(unix)]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                buf.as_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    #[cfg(not(unix))]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = io::stdout().lock();
        out.write_all(buf)?;
        out.flush()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer that counts `write` calls.
    #[derive(Default)]
    struct Counting {
        bytes: Vec<u8>,
        writes: usize,
        flushes: usize,
    }

    impl Write for Counting {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn new_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn write_trait() {
        let mut buf = OutputBuffer::new();
        write!(buf, "hello {}", 42).unwrap();
        assert_eq!(buf.as_bytes(), b"hello 42");
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn push_bytes_appends_in_order() {
        let mut buf = OutputBuffer::new();
        buf.push_bytes(b"ab");
        buf.push_bytes(b"cd");
        assert_eq!(buf.as_bytes(), b"abcd");
    }

    #[test]
    fn push_repeated() {
        let mut buf = OutputBuffer::new();
        buf.push_bytes(b"~");
        buf.push_repeated(b' ', 3);
        assert_eq!(buf.as_bytes(), b"~   ");
    }

    #[test]
    fn push_repeated_zero_is_noop() {
        let mut buf = OutputBuffer::new();
        buf.push_repeated(b' ', 0);
        assert!(buf.is_empty());
    }

    #[test]
    fn flush_to_is_one_write() {
        let mut buf = OutputBuffer::new();
        for _ in 0..100 {
            buf.push_bytes(b"\x1b[K\r\n");
        }
        let mut out = Counting::default();
        buf.flush_to(&mut out).unwrap();

        assert_eq!(out.writes, 1);
        assert_eq!(out.flushes, 1);
        assert_eq!(out.bytes.len(), 500);
        assert!(buf.is_empty());
    }

    #[test]
    fn flush_to_empty_writes_nothing() {
        let mut buf = OutputBuffer::new();
        let mut out = Counting::default();
        buf.flush_to(&mut out).unwrap();
        assert_eq!(out.writes, 0);
        assert_eq!(out.flushes, 0);
    }

    #[test]
    fn tty_writer_empty_write() {
        let mut w = TtyWriter::new();
        assert_eq!(w.write(b"").unwrap(), 0);
        w.flush().unwrap();
    }

    #[test]
    fn flush_is_noop() {
        let mut buf = OutputBuffer::new();
        buf.push_bytes(b"x");
        buf.flush().unwrap();
        assert_eq!(buf.as_bytes(), b"x");
    }
}
