//! Editor — the context object that ties the terminal layer together.
//!
//! An `Editor` owns everything one session needs: the raw-mode guard, the
//! byte source keys are decoded from, the writer frames go to, the
//! viewport size, the cursor, and the document. Nothing lives in a
//! process-wide global; build one with [`Editor::new`] (known size) or
//! [`Editor::with_geometry`] (resolve the size first) and drive it with
//! [`Editor::run`].
//!
//! Each loop iteration is:
//!
//! ```text
//! refresh_screen   → one frame, one write
//! process_keypress → one decoded key → cursor movement or quit
//! ```
//!
//! # Exit paths
//!
//! Quit (Ctrl-Q) wipes the screen, homes the cursor, and restores the
//! terminal mode before `run` returns `Ok`. Any error returns early; the
//! mode guard is owned by the editor, so dropping the editor on the way
//! out restores the terminal there too.
//!
//! The guard, the source and the writer are generic so tests can run a
//! whole session against byte slices and a `Vec<u8>`.

use std::io::Write;

use kilo_term::TermError;
use kilo_term::ansi;
use kilo_term::geometry;
use kilo_term::input::{ByteSource, Key, decode_key};
use kilo_term::render::render_frame;
use kilo_term::terminal::{ModeGuard, Size};
use tracing::{debug, info};

use crate::cursor::{Cursor, Direction};
use crate::document::Document;

/// What the editor should do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running.
    Continue,
    /// Leave the loop.
    Quit,
}

/// The key that ends the session.
pub const QUIT_KEY: Key = Key::ctrl(b'q');

/// Editor session state.
pub struct Editor<M, S, W> {
    mode: M,
    input: S,
    output: W,
    size: Size,
    cursor: Cursor,
    document: Document,
}

impl<M, S, W> Editor<M, S, W>
where
    M: ModeGuard,
    S: ByteSource,
    W: Write,
{
    /// Build an editor for a viewport of known size.
    pub const fn new(mode: M, input: S, output: W, size: Size, document: Document) -> Self {
        Self {
            mode,
            input,
            output,
            size,
            cursor: Cursor::new(),
            document,
        }
    }

    /// Build an editor, resolving the viewport size first.
    ///
    /// `query` is the direct ioctl result; if it's missing, the
    /// cursor-position probe runs over `input` and `output`. The terminal
    /// must already be in raw mode (i.e. `mode` is live).
    ///
    /// # Errors
    ///
    /// Any [`TermError`] from geometry resolution. `mode` is dropped, and
    /// so restored, before the error is returned.
    pub fn with_geometry(
        mode: M,
        mut input: S,
        mut output: W,
        query: Option<Size>,
        document: Document,
    ) -> Result<Self, TermError> {
        let size = geometry::resolve(query, &mut input, &mut output)?;
        Ok(Self::new(mode, input, output, size, document))
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Mutable cursor access for callers that bind their own keys.
    #[inline]
    pub const fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    #[must_use]
    pub const fn output(&self) -> &W {
        &self.output
    }

    /// Adopt a new viewport size and pull the cursor back inside it.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.cursor.clamp(size);
    }

    /// Re-resolve the viewport size on request.
    ///
    /// # Errors
    ///
    /// Any [`TermError`] from geometry resolution; the old size is kept.
    pub fn refresh_size(&mut self, query: Option<Size>) -> Result<Size, TermError> {
        let size = geometry::resolve(query, &mut self.input, &mut self.output)?;
        self.set_size(size);
        Ok(size)
    }

    // -- Loop ---------------------------------------------------------------

    /// Run until the user quits.
    ///
    /// # Errors
    ///
    /// Any [`TermError`] from rendering, reading, or restoring the mode.
    pub fn run(&mut self) -> Result<(), TermError> {
        info!(rows = self.size.rows, cols = self.size.cols, "editor started");
        loop {
            self.refresh_screen()?;
            if self.process_keypress()? == Action::Quit {
                return self.quit();
            }
        }
    }

    /// Draw the current state as a single write.
    ///
    /// # Errors
    ///
    /// [`TermError::Write`] if the frame can't be written.
    pub fn refresh_screen(&mut self) -> Result<(), TermError> {
        render_frame(
            &mut self.output,
            self.size,
            &self.document,
            self.cursor.position(),
        )
        .map_err(TermError::Write)
    }

    /// Wait for one key and act on it.
    ///
    /// # Errors
    ///
    /// [`TermError::Read`] if the input stream fails.
    pub fn process_keypress(&mut self) -> Result<Action, TermError> {
        let key = decode_key(&mut self.input).map_err(TermError::Read)?;
        Ok(self.handle_key(key))
    }

    /// Apply kilo's key bindings.
    pub fn handle_key(&mut self, key: Key) -> Action {
        debug!(?key, "key");
        match key {
            QUIT_KEY => return Action::Quit,
            Key::ArrowUp => self.cursor.move_by(Direction::Up, self.size),
            Key::ArrowDown => self.cursor.move_by(Direction::Down, self.size),
            Key::ArrowLeft => self.cursor.move_by(Direction::Left, self.size),
            Key::ArrowRight => self.cursor.move_by(Direction::Right, self.size),
            Key::PageUp => self.cursor.page_up(self.size),
            Key::PageDown => self.cursor.page_down(self.size),
            Key::Home => self.cursor.home(),
            Key::End => self.cursor.end(self.size),
            _ => {}
        }
        Action::Continue
    }

    /// Wipe the screen, home the cursor, and restore the terminal mode.
    ///
    /// # Errors
    ///
    /// [`TermError::Write`] if the wipe can't be written,
    /// [`TermError::SetAttr`] if the mode can't be restored.
    pub fn quit(&mut self) -> Result<(), TermError> {
        let mut wipe = Vec::with_capacity(8);
        ansi::wipe(&mut wipe).map_err(TermError::Write)?;
        self.output.write_all(&wipe).map_err(TermError::Write)?;
        self.output.flush().map_err(TermError::Write)?;

        self.mode.restore()?;
        info!("editor quit");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use pretty_assertions::assert_eq;

    /// Everything observable about a fake terminal session, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Write(Vec<u8>),
        Restore,
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    /// Mode guard that records restores into the shared log.
    struct FakeMode {
        log: Log,
        restored: bool,
    }

    impl ModeGuard for FakeMode {
        fn restore(&mut self) -> Result<(), TermError> {
            if !self.restored {
                self.restored = true;
                self.log.borrow_mut().push(Event::Restore);
            }
            Ok(())
        }
    }

    impl Drop for FakeMode {
        fn drop(&mut self) {
            let _ = self.restore();
        }
    }

    /// Writer that records each write into the shared log.
    struct FakeTty {
        log: Log,
    }

    impl Write for FakeTty {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.log.borrow_mut().push(Event::Write(buf.to_vec()));
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session(input: &[u8], size: Size) -> (Editor<FakeMode, &[u8], FakeTty>, Log) {
        let log = Log::default();
        let mode = FakeMode {
            log: Rc::clone(&log),
            restored: false,
        };
        let tty = FakeTty {
            log: Rc::clone(&log),
        };
        let editor = Editor::new(mode, input, tty, size, Document::new());
        (editor, log)
    }

    fn restores(log: &Log) -> usize {
        log.borrow().iter().filter(|e| **e == Event::Restore).count()
    }

    const VIEW: Size = Size::new(24, 80);

    // -- Quit ---------------------------------------------------------------

    #[test]
    fn ctrl_q_wipes_then_restores() {
        let (mut editor, log) = session(&[0x11], VIEW);
        editor.run().unwrap();

        let log = log.borrow();
        let n = log.len();
        assert!(n >= 3);
        // One frame, then the wipe, then the restore.
        assert!(matches!(&log[0], Event::Write(frame) if frame.starts_with(b"\x1b[?25l")));
        assert_eq!(log[n - 2], Event::Write(b"\x1b[2J\x1b[H".to_vec()));
        assert_eq!(log[n - 1], Event::Restore);
    }

    #[test]
    fn quit_restores_exactly_once() {
        let (mut editor, log) = session(&[0x11], VIEW);
        editor.run().unwrap();
        drop(editor);
        assert_eq!(restores(&log), 1);
    }

    #[test]
    fn keys_before_quit_are_processed() {
        let (mut editor, log) = session(b"\x1b[B\x1b[B\x1b[C\x11", VIEW);
        editor.run().unwrap();

        assert_eq!(editor.cursor().position(), (2, 1));
        // Four frames: initial, and one after each of the three moves.
        let frames = log
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Write(w) if w.starts_with(b"\x1b[?25l")))
            .count();
        assert_eq!(frames, 4);
    }

    #[test]
    fn each_frame_is_a_single_write() {
        let (mut editor, log) = session(b"\x1b[B\x11", VIEW);
        editor.run().unwrap();

        let log = log.borrow();
        // frame, frame, wipe, restore
        assert_eq!(log.len(), 4);
        for event in &log[..2] {
            let Event::Write(frame) = event else {
                panic!("expected a frame write, got {event:?}");
            };
            assert!(frame.starts_with(b"\x1b[?25l\x1b[H"));
            assert!(frame.ends_with(b"\x1b[?25h"));
        }
    }

    #[test]
    fn last_frame_shows_moved_cursor() {
        let (mut editor, log) = session(b"\x1b[B\x1b[C\x11", VIEW);
        editor.run().unwrap();

        let log = log.borrow();
        let Event::Write(last_frame) = &log[log.len() - 3] else {
            panic!("expected a frame");
        };
        assert!(last_frame.ends_with(b"\x1b[2;2H\x1b[?25h"));
    }

    // -- Error paths --------------------------------------------------------

    #[test]
    fn read_error_restores_on_drop() {
        struct Broken;
        impl ByteSource for Broken {
            fn read_byte(&mut self) -> io::Result<Option<u8>> {
                Err(io::Error::other("tty gone"))
            }
        }

        let log = Log::default();
        let mode = FakeMode {
            log: Rc::clone(&log),
            restored: false,
        };
        let tty = FakeTty {
            log: Rc::clone(&log),
        };
        let mut editor = Editor::new(mode, Broken, tty, VIEW, Document::new());

        let err = editor.run().unwrap_err();
        assert!(matches!(err, TermError::Read(_)));
        assert_eq!(restores(&log), 0);

        drop(editor);
        assert_eq!(restores(&log), 1);
    }

    #[test]
    fn failed_geometry_restores_mode() {
        let log = Log::default();
        let mode = FakeMode {
            log: Rc::clone(&log),
            restored: false,
        };
        let input: &[u8] = b"garbage";
        let result = Editor::with_geometry(mode, input, Vec::new(), None, Document::new());

        assert!(matches!(result, Err(TermError::Probe(_))));
        assert_eq!(restores(&log), 1);
    }

    // -- Geometry -----------------------------------------------------------

    #[test]
    fn with_geometry_uses_probe_reply() {
        let log = Log::default();
        let mode = FakeMode {
            log: Rc::clone(&log),
            restored: false,
        };
        let input: &[u8] = b"\x1b[40;120R";
        let editor = Editor::with_geometry(mode, input, Vec::new(), None, Document::new()).unwrap();

        assert_eq!(editor.size(), Size::new(40, 120));
        assert_eq!(editor.output().as_slice(), b"\x1b[999C\x1b[999B\x1b[6n");
    }

    #[test]
    fn with_geometry_prefers_query() {
        let log = Log::default();
        let mode = FakeMode {
            log: Rc::clone(&log),
            restored: false,
        };
        let input: &[u8] = b"";
        let editor =
            Editor::with_geometry(mode, input, Vec::new(), Some(VIEW), Document::new()).unwrap();
        assert_eq!(editor.size(), VIEW);
        assert!(editor.output().is_empty());
    }

    #[test]
    fn set_size_clamps_cursor() {
        let (mut editor, _log) = session(b"", VIEW);
        editor.cursor_mut().set(20, 70, VIEW);
        editor.set_size(Size::new(10, 40));
        assert_eq!(editor.cursor().position(), (9, 39));
    }

    #[test]
    fn refresh_size_probes_and_clamps_cursor() {
        let (mut editor, log) = session(b"\x1b[10;40R", VIEW);
        editor.cursor_mut().set(20, 70, VIEW);

        let size = editor.refresh_size(None).unwrap();

        assert_eq!(size, Size::new(10, 40));
        assert_eq!(editor.size(), size);
        assert_eq!(editor.cursor().position(), (9, 39));
        assert_eq!(
            log.borrow()[0],
            Event::Write(b"\x1b[999C\x1b[999B\x1b[6n".to_vec())
        );
    }

    #[test]
    fn refresh_size_prefers_query() {
        let (mut editor, log) = session(b"", VIEW);
        let size = editor.refresh_size(Some(Size::new(30, 100))).unwrap();
        assert_eq!(size, Size::new(30, 100));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn refresh_size_keeps_old_size_on_bad_reply() {
        let (mut editor, _log) = session(b"junk", VIEW);
        editor.cursor_mut().set(20, 70, VIEW);

        let err = editor.refresh_size(None).unwrap_err();

        assert!(matches!(err, TermError::Probe(_)));
        assert_eq!(editor.size(), VIEW);
        assert_eq!(editor.cursor().position(), (20, 70));
    }

    // -- Key bindings -------------------------------------------------------

    #[test]
    fn arrows_move_cursor() {
        let (mut editor, _log) = session(b"", VIEW);
        editor.handle_key(Key::ArrowDown);
        editor.handle_key(Key::ArrowRight);
        editor.handle_key(Key::ArrowRight);
        editor.handle_key(Key::ArrowLeft);
        editor.handle_key(Key::ArrowUp);
        editor.handle_key(Key::ArrowDown);
        assert_eq!(editor.cursor().position(), (1, 1));
    }

    #[test]
    fn page_keys_jump_a_screen() {
        let (mut editor, _log) = session(b"", VIEW);
        editor.handle_key(Key::PageDown);
        assert_eq!(editor.cursor().row(), 23);
        editor.handle_key(Key::PageUp);
        assert_eq!(editor.cursor().row(), 0);
    }

    #[test]
    fn home_end_jump_columns() {
        let (mut editor, _log) = session(b"", VIEW);
        editor.handle_key(Key::End);
        assert_eq!(editor.cursor().col(), 79);
        editor.handle_key(Key::Home);
        assert_eq!(editor.cursor().col(), 0);
    }

    #[test]
    fn other_keys_are_ignored() {
        let (mut editor, _log) = session(b"", VIEW);
        for key in [
            Key::Char(b'q'),
            Key::Control(0x01),
            Key::Escape,
            Key::Delete,
        ] {
            assert_eq!(editor.handle_key(key), Action::Continue);
        }
        assert_eq!(editor.cursor().position(), (0, 0));
    }

    #[test]
    fn only_ctrl_q_quits() {
        let (mut editor, _log) = session(b"", VIEW);
        assert_eq!(editor.handle_key(Key::ctrl(b'q')), Action::Quit);
        assert_eq!(editor.handle_key(Key::Char(b'q')), Action::Continue);
    }

    // -- Rendering ----------------------------------------------------------

    #[test]
    fn empty_document_frame_has_banner() {
        let (mut editor, log) = session(b"", VIEW);
        editor.refresh_screen().unwrap();
        let log = log.borrow();
        let Event::Write(frame) = &log[0] else {
            panic!("expected a frame");
        };
        let text = String::from_utf8_lossy(frame);
        assert!(text.contains("Kilo editor"));
    }

    #[test]
    fn document_lines_are_rendered() {
        let mut out = Vec::new();
        let input: &[u8] = b"";
        let mut editor = Editor::new(
            NoopMode,
            input,
            &mut out,
            Size::new(3, 20),
            Document::from_text("one\ntwo\n"),
        );
        editor.refresh_screen().unwrap();
        drop(editor);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("one\x1b[K\r\ntwo\x1b[K\r\n~\x1b[K"));
    }

    struct NoopMode;

    impl ModeGuard for NoopMode {
        fn restore(&mut self) -> Result<(), TermError> {
            Ok(())
        }
    }
}
