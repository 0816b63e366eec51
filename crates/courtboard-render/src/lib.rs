//! Courtboard Render Library
//!
//! Deterministic export of a board session to a flattened still image:
//! court lines, committed ink, markers, and player tokens composited at a
//! fixed supersample scale. Reads session state, never mutates it.

pub mod court;
pub mod export;
pub mod glyph;

pub use export::{EXPORT_SCALE, ExportError, export_png, render_board};
