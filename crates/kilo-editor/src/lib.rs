//! # kilo-editor — Editor core for kilo
//!
//! The pieces that sit on top of the terminal layer:
//!
//! - **[`cursor`]** — `Cursor` (row, col) clamped to the viewport
//! - **[`document`]** — `Document`, a rope-backed line provider loaded from a file
//! - **[`editor`]** — `Editor`, the context that owns the terminal handles and
//!   runs the render/decode loop with kilo's key bindings

pub mod cursor;
pub mod document;
pub mod editor;
