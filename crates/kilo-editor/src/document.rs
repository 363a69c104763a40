//! Document — the text being displayed.
//!
//! A `Document` wraps a [`ropey::Rope`] and exposes it to the renderer
//! through [`LineSource`]. It is read-only: kilo displays a file, it does
//! not edit or save it.
//!
//! # Line counting
//!
//! Lines are counted the way a text file reads, not the way a rope stores
//! them. `"a\nb\n"` is two lines (a rope reports a third, empty one after
//! the final newline), and an empty file has zero lines, which is what
//! makes the renderer show the welcome banner.
//!
//! Only `\n`, `\r\n`, and `\r` end a line. Form feeds, vertical tabs and
//! the Unicode line/paragraph separators are ordinary characters.
//!
//! Lines are handed out without their terminator (`\n`, `\r\n`, or `\r`).
//! Bytes that aren't valid UTF-8 are replaced with U+FFFD on load.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kilo_term::render::LineSource;
use ropey::Rope;
use thiserror::Error;
use tracing::info;

/// Failure to load a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A read-only, rope-backed text document.
#[derive(Clone, Default)]
pub struct Document {
    rope: Rope,
    path: Option<PathBuf>,
}

impl Document {
    /// An empty, unnamed document (zero lines).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding `text`, with no file behind it.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            path: None,
        }
    }

    /// Load a document from disk.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Open`] if the file can't be read.
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let bytes = fs::read(path).map_err(|source| DocumentError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);

        let doc = Self {
            rope: Rope::from_str(&text),
            path: Some(path.to_path_buf()),
        };
        info!(path = %path.display(), lines = doc.line_count(), "opened document");
        Ok(doc)
    }

    /// The file this document was loaded from, if any.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the document has no lines at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }
}

impl LineSource for Document {
    fn line_count(&self) -> usize {
        let lines = self.rope.len_lines();
        // The rope's last line is empty exactly when the text is empty or
        // ends with a line break; neither counts as a line of the file.
        if self.rope.line(lines - 1).len_chars() == 0 {
            lines - 1
        } else {
            lines
        }
    }

    fn line_at(&self, index: usize) -> Cow<'_, str> {
        strip_line_ending(self.rope.line(index).into())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("lines", &self.line_count())
            .finish()
    }
}

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Drop a trailing `\n`, `\r\n`, or `\r`, keeping the borrow when possible.
fn strip_line_ending(line: Cow<'_, str>) -> Cow<'_, str> {
    match line {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim_end_matches(is_line_break)),
        Cow::Owned(mut s) => {
            let len = s.trim_end_matches(is_line_break).len();
            s.truncate(len);
            Cow::Owned(s)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
