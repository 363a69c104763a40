// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Timed stdin reader — the `ByteSource` behind the real terminal.
//
// In raw mode the tty is configured with VMIN=0, VTIME=1: every `read()`
// returns after at most a decisecond, with one byte or with nothing. That
// kernel-side timeout is the whole timing story. No thread, no poll loop.
//
// `read()` goes straight to the file descriptor rather than through
// `io::stdin()`, whose internal buffer would swallow bytes we haven't
// asked for yet and break the one-key-per-call contract of the decoder.

use std::io;

use crate::input::ByteSource;

/// Unbuffered, one-byte-at-a-time reader over stdin.
///
/// # Example
///
/// ```no_run
/// use kilo_term::input::decode_key;
/// use kilo_term::reader::StdinReader;
///
/// let mut stdin = StdinReader::new();
/// let key = decode_key(&mut stdin)?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct StdinReader {
    _private: (),
}

impl StdinReader {
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl ByteSource for StdinReader {
    /// One `read(2)` of a single byte.
    ///
    /// A zero-length read is the VTIME timeout. `EAGAIN` (some platforms
    /// report the timeout this way) and `EINTR` are treated the same.
    #[cfg(unix)]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                (&raw mut byte).cast::<libc::c_void>(),
                1,
            )
        };

        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }

    #[cfg(not(unix))]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_default_agree() {
        let a = StdinReader::new();
        let b = StdinReader::default();
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn is_usable_as_dyn_source() {
        let mut reader = StdinReader::new();
        let _: &mut dyn ByteSource = &mut reader;
    }
}
