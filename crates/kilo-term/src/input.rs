// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw stdin bytes into one of a small, closed set of keys: a plain
// byte, a control byte, or a named navigation key. Handles the legacy
// sequences every VT100-family terminal sends for those keys:
//
// - CSI letter:  ESC [ A/B/C/D/H/F     (arrows, Home, End)
// - CSI tilde:   ESC [ 1-8 ~           (Home, Delete, End, PageUp, PageDown)
// - SS3 letter:  ESC O H/F             (Home, End on some terminals)
//
// # Design
//
// Unlike a buffering parser, `decode_key` pulls bytes from a `ByteSource`
// one at a time and never keeps anything between calls. Each read is
// bounded by the source's timeout (100ms for the tty in raw mode), which
// is what resolves the Escape ambiguity: a lone ESC followed by silence
// is the Escape key. The lookahead is a tiny state machine, so the most
// it ever reads for one key is four bytes.
//
// Anything that doesn't match the grammar collapses to `Key::Escape`.
// Bytes consumed by a malformed sequence are dropped, not replayed.

use std::io;

use tracing::trace;

// ─── Key ────────────────────────────────────────────────────────────────────

/// The escape byte that opens every multi-byte sequence.
pub const ESC: u8 = 0x1B;

/// A decoded keypress.
///
/// Exactly one of these comes out of each [`decode_key`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any byte that is neither a control byte nor ESC: printable ASCII,
    /// DEL (0x7F), and raw high bytes (no UTF-8 assembly).
    Char(u8),
    /// A control byte in 0x00..=0x1F other than ESC. Ctrl-Q is `Control(0x11)`.
    Control(u8),
    // ── Named keys ──────────────────────────────────────────────
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Escape,
}

impl Key {
    /// Classify a single byte that arrived on its own.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            ESC => Self::Escape,
            0x00..=0x1F => Self::Control(byte),
            _ => Self::Char(byte),
        }
    }

    /// The key produced by holding Ctrl and pressing `letter`.
    ///
    /// ```
    /// use kilo_term::input::Key;
    ///
    /// assert_eq!(Key::ctrl(b'q'), Key::Control(0x11));
    /// ```
    #[must_use]
    pub const fn ctrl(letter: u8) -> Self {
        Self::from_byte(ctrl(letter))
    }
}

/// Strip a letter down to the control byte the terminal sends for Ctrl+letter.
#[inline]
#[must_use]
pub const fn ctrl(letter: u8) -> u8 {
    letter & 0x1F
}

// ─── Byte Source ────────────────────────────────────────────────────────────

/// A stream of input bytes with a per-read timeout.
pub trait ByteSource {
    /// Read one byte.
    ///
    /// `Ok(None)` means the read timed out with nothing available. That is
    /// not an error: it is how an incomplete escape sequence is detected.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error for anything other than a timeout.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// A byte slice is a source whose timeout fires once it runs dry.
impl ByteSource for &[u8] {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.split_first() {
            Some((&byte, rest)) => {
                *self = rest;
                Ok(Some(byte))
            }
            None => Ok(None),
        }
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Lookahead state after an ESC has been read.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Just saw ESC.
    Escape,
    /// Saw `ESC [`.
    Csi,
    /// Saw `ESC [ <digit>`; waiting for `~`.
    CsiDigit(u8),
    /// Saw `ESC O`.
    Ss3,
}

/// Block until one key is available and return it.
///
/// Waits for the first byte by retrying reads that time out, so this only
/// returns once the user has pressed something. After an ESC, each further
/// byte gets a single timed read; if one comes back empty, the result is
/// [`Key::Escape`].
///
/// # Errors
///
/// Propagates I/O errors from the source. A timeout is never an error.
pub fn decode_key<S: ByteSource + ?Sized>(src: &mut S) -> io::Result<Key> {
    let first = loop {
        if let Some(byte) = src.read_byte()? {
            break byte;
        }
    };

    if first != ESC {
        return Ok(Key::from_byte(first));
    }
    decode_escape(src)
}

/// Run the lookahead state machine after an ESC.
fn decode_escape<S: ByteSource + ?Sized>(src: &mut S) -> io::Result<Key> {
    let mut state = State::Escape;

    loop {
        let Some(byte) = src.read_byte()? else {
            return Ok(Key::Escape);
        };

        state = match (state, byte) {
            (State::Escape, b'[') => State::Csi,
            (State::Escape, b'O') => State::Ss3,
            (State::Csi, d @ b'0'..=b'9') => State::CsiDigit(d),
            (State::Csi, letter) => return Ok(csi_letter(letter)),
            (State::CsiDigit(d), b'~') => return Ok(csi_tilde(d)),
            (State::Ss3, letter) => return Ok(ss3_letter(letter)),
            (state, byte) => {
                trace!(?state, byte, "unrecognized escape sequence");
                return Ok(Key::Escape);
            }
        };
    }
}

/// `ESC [ <letter>`.
fn csi_letter(letter: u8) -> Key {
    match letter {
        b'A' => Key::ArrowUp,
        b'B' => Key::ArrowDown,
        b'C' => Key::ArrowRight,
        b'D' => Key::ArrowLeft,
        b'H' => Key::Home,
        b'F' => Key::End,
        other => unrecognized(b'[', other),
    }
}

/// `ESC [ <digit> ~`.
fn csi_tilde(digit: u8) -> Key {
    match digit {
        b'1' | b'7' => Key::Home,
        b'3' => Key::Delete,
        b'4' | b'8' => Key::End,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        other => unrecognized(b'~', other),
    }
}

/// `ESC O <letter>`.
fn ss3_letter(letter: u8) -> Key {
    match letter {
        b'H' => Key::Home,
        b'F' => Key::End,
        other => unrecognized(b'O', other),
    }
}

fn unrecognized(kind: u8, byte: u8) -> Key {
    trace!(kind = %char::from(kind), byte, "unrecognized escape sequence");
    Key::Escape
}

// ─── Tests ───────────────────────────────────────────────────────────────────
