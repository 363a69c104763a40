//! Cursor — a screen position clamped to the viewport.
//!
//! The `Cursor` is a plain (row, col) pair, both 0-indexed, that never
//! leaves the current viewport: `row < rows` and `col < cols` hold after
//! every operation. It does not look at the document; movement is bounded
//! by the screen, not by line lengths.
//!
//! The viewport size is passed to each movement method rather than stored,
//! so a cursor can't go stale when the caller re-resolves the geometry.
//! Call [`Cursor::clamp`] after a size change to pull it back inside.

use kilo_term::terminal::Size;

/// One step of cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A cursor position in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    row: u16,
    col: u16,
}

impl Cursor {
    /// Create a cursor at the top-left corner.
    #[must_use]
    pub const fn new() -> Self {
        Self { row: 0, col: 0 }
    }

    // -- Accessors ----------------------------------------------------------

    /// Current row (0-indexed).
    #[inline]
    #[must_use]
    pub const fn row(&self) -> u16 {
        self.row
    }

    /// Current column (0-indexed).
    #[inline]
    #[must_use]
    pub const fn col(&self) -> u16 {
        self.col
    }

    /// `(row, col)`, the shape the renderer takes.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.row, self.col)
    }

    // -- Direct positioning -------------------------------------------------

    /// Move to an exact position, clamped to the viewport.
    pub fn set(&mut self, row: u16, col: u16, size: Size) {
        self.row = row;
        self.col = col;
        self.clamp(size);
    }

    /// Re-establish `row < rows` and `col < cols` for a new viewport size.
    pub fn clamp(&mut self, size: Size) {
        self.row = self.row.min(last_index(size.rows));
        self.col = self.col.min(last_index(size.cols));
    }

    /// Jump to column 0.
    pub const fn home(&mut self) {
        self.col = 0;
    }

    /// Jump to the last column of the viewport.
    pub fn end(&mut self, size: Size) {
        self.col = last_index(size.cols);
    }

    // -- Movement -----------------------------------------------------------

    /// Move one cell in `dir`, stopping at the viewport edge.
    pub fn move_by(&mut self, dir: Direction, size: Size) {
        match dir {
            Direction::Up => self.row = self.row.saturating_sub(1),
            Direction::Down => {
                if self.row < last_index(size.rows) {
                    self.row += 1;
                }
            }
            Direction::Left => self.col = self.col.saturating_sub(1),
            Direction::Right => {
                if self.col < last_index(size.cols) {
                    self.col += 1;
                }
            }
        }
    }

    /// Move up by a full viewport height (one `Up` step per row).
    pub fn page_up(&mut self, size: Size) {
        for _ in 0..size.rows {
            self.move_by(Direction::Up, size);
        }
    }

    /// Move down by a full viewport height (one `Down` step per row).
    pub fn page_down(&mut self, size: Size) {
        for _ in 0..size.rows {
            self.move_by(Direction::Down, size);
        }
    }
}

/// Largest valid index along an axis of `len` cells.
const fn last_index(len: u16) -> u16 {
    len.saturating_sub(1)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
