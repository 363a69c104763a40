// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd writes. These are
// the standard POSIX interfaces for terminal control — there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. `RawMode::enable` snapshots
// the original termios, switches stdin to byte-at-a-time reads with a
// 100ms timeout, and hands back a guard. Dropping the guard (or calling
// `restore`) puts the snapshot back, so every exit path — normal quit,
// `?` on an error, or a panic — leaves the user's shell usable.
//
// The panic hook bypasses Rust's stdout lock entirely, writing a
// pre-built restore sequence directly to fd 1. If the panic happened
// while a frame was being flushed, the lock is still held and a normal
// `println!` would deadlock.

use std::io;
#[cfg(not(unix))]
use std::io::Write;
use std::sync::{Mutex, Once};

use tracing::{debug, warn};

use crate::error::{Result, TermError};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
///
/// Both fields are non-zero for any size produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

impl Size {
    #[inline]
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// kernel reports a zero dimension (some terminals do until first resize).
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size::new(ws.ws_row, ws.ws_col))
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

/// Check whether stdout is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_stdout_tty() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_stdout_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't
/// reach it. This backup lets the hook restore cooked mode without the
/// guard. It holds nothing but the snapshot.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Restore sequence for emergency use: show cursor, clear, home.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[?25h\x1b[2J\x1b[H";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the error message.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Mode Guard ─────────────────────────────────────────────────────────────

/// Something that can put the terminal back the way it found it.
///
/// [`RawMode`] is the real implementation. The editor is generic over
/// this trait so tests can observe restores without a TTY.
pub trait ModeGuard {
    /// Restore the original terminal mode.
    ///
    /// Must be idempotent: only the first call has an observable effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the original attributes can't be re-applied.
    fn restore(&mut self) -> Result<()>;
}

// ─── Raw Mode ───────────────────────────────────────────────────────────────

/// Raw-mode guard with RAII cleanup.
///
/// # Example
///
/// ```no_run
/// use kilo_term::terminal::RawMode;
///
/// let mode = RawMode::enable()?;
/// // ... render frames, decode keys ...
/// drop(mode); // cooked mode is back
/// # Ok::<(), kilo_term::TermError>(())
/// ```
pub struct RawMode {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original: Option<libc::termios>,

    /// Whether raw mode is currently applied.
    active: bool,
}

impl RawMode {
    /// Capture the current terminal attributes and switch to raw mode.
    ///
    /// Read policy afterwards: `VMIN = 0`, `VTIME = 1`, so every `read()`
    /// returns after at most 100ms, with or without a byte.
    ///
    /// # Errors
    ///
    /// [`TermError::GetAttr`] if stdin is not a terminal or the snapshot
    /// fails; [`TermError::SetAttr`] if the raw attributes are rejected.
    pub fn enable() -> Result<Self> {
        install_panic_hook();

        let mut mode = Self {
            #[cfg(unix)]
            original: None,
            active: false,
        };
        mode.enter()?;
        Ok(mode)
    }

    /// Whether raw mode is currently applied.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[cfg(unix)]
    fn enter(&mut self) -> Result<()> {
        use std::os::unix::io::AsRawFd;

        let fd = io::stdin().as_raw_fd();

        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
            return Err(TermError::GetAttr(io::Error::last_os_error()));
        }

        let original = termios;
        make_raw(&mut termios);

        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) } != 0 {
            return Err(TermError::SetAttr(io::Error::last_os_error()));
        }

        // The panic hook only sees a snapshot once raw mode is really on.
        self.original = Some(original);
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }

        self.active = true;
        debug!("raw mode enabled");
        Ok(())
    }

    #[cfg(not(unix))]
    fn enter(&mut self) -> Result<()> {
        Err(TermError::GetAttr(io::Error::new(
            io::ErrorKind::Unsupported,
            "raw mode requires a unix terminal",
        )))
    }

    #[cfg(unix)]
    fn leave(&mut self) -> Result<()> {
        use std::os::unix::io::AsRawFd;

        if let Some(ref original) = self.original {
            let fd = io::stdin().as_raw_fd();
            if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, original) } != 0 {
                return Err(TermError::SetAttr(io::Error::last_os_error()));
            }

            // Restored — the panic hook has nothing left to do.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            self.original = None;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn leave(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ModeGuard for RawMode {
    fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.leave()?;
        self.active = false;
        debug!("raw mode restored");
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("failed to restore terminal mode on drop: {e}");
        }
    }
}

/// Apply kilo's raw-mode attribute changes to a termios snapshot.
///
/// Input: no CR→NL translation, no break signal, no parity check, no
/// 8th-bit stripping, no XON/XOFF. Output: no post-processing. Control:
/// 8-bit characters. Local: no echo, no canonical mode, no extended input
/// processing, no signal keys. Reads return after 1 decisecond at most.
#[cfg(unix)]
fn make_raw(termios: &mut libc::termios) {
    termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    termios.c_oflag &= !libc::OPOST;
    termios.c_cflag |= libc::CS8;
    termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 1;
}

// ─── Tests ───────────────────────────────────────────────────────────────────
