//! Board geometry: sizes and the bounds clamp for draggable entities.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Dimensions of the board surface in board-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardSize {
    pub width: f64,
    pub height: f64,
}

impl BoardSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center of the board, the default spawn point for new entities.
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Clamp a single coordinate to `[lo, hi]`.
///
/// `min` is applied before `max` so a degenerate interval (`hi < lo`)
/// collapses to `lo` instead of oscillating per call site.
fn clamp_axis(v: f64, lo: f64, hi: f64) -> f64 {
    v.min(hi).max(lo)
}

/// Constrain an entity center to the board, keeping the full disc of the
/// given radius inside the surface.
///
/// Each axis clamps independently to `[radius, dimension - radius]`. A board
/// smaller than the entity diameter clamps to `radius` on that axis.
pub fn clamp_to_board(point: Point, radius: f64, size: BoardSize) -> Point {
    Point::new(
        clamp_axis(point.x, radius, size.width - radius),
        clamp_axis(point.y, radius, size.height - radius),
    )
}
