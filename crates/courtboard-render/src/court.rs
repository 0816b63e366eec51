//! Fixed court-line geometry drawn beneath the ink and tokens.

use courtboard_core::paint::fill_rect;
use courtboard_core::{Bitmap, Color};

/// Court surface fill.
pub const COURT_FILL: Color = Color::opaque(0xd4, 0xa7, 0x6a);

/// Boundary and center-line color.
pub const LINE_COLOR: Color = Color::white();

/// Attack lines render at 60% white.
pub const ATTACK_LINE_COLOR: Color = Color::new(255, 255, 255, 153);

/// Boundary line width in board pixels (before supersampling).
pub const BORDER_WIDTH: f64 = 2.0;

/// Center line width in board pixels.
pub const CENTER_LINE_WIDTH: f64 = 4.0;

/// Attack line width in board pixels.
pub const ATTACK_LINE_WIDTH: f64 = 2.0;

/// Paint the full court onto `bmp`: surface fill, boundary, center line,
/// and the two attack lines at one third and two thirds of the width.
pub fn draw_court(bmp: &mut Bitmap, scale: u32) {
    let w = i64::from(bmp.width());
    let h = i64::from(bmp.height());
    let s = f64::from(scale);

    fill_rect(bmp, 0, 0, w, h, COURT_FILL);

    // Boundary.
    let b = (BORDER_WIDTH * s).round() as i64;
    fill_rect(bmp, 0, 0, w, b, LINE_COLOR);
    fill_rect(bmp, 0, h - b, w, b, LINE_COLOR);
    fill_rect(bmp, 0, 0, b, h, LINE_COLOR);
    fill_rect(bmp, w - b, 0, b, h, LINE_COLOR);

    // Center line (the net).
    let cw = (CENTER_LINE_WIDTH * s).round() as i64;
    fill_rect(bmp, w / 2 - cw / 2, 0, cw, h, LINE_COLOR);

    // Attack lines.
    let aw = (ATTACK_LINE_WIDTH * s).round() as i64;
    fill_rect(bmp, w / 3 - aw / 2, 0, aw, h, ATTACK_LINE_COLOR);
    fill_rect(bmp, w - w / 3 - aw / 2, 0, aw, h, ATTACK_LINE_COLOR);
}
