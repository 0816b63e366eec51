//! Flattens a session into a single supersampled PNG.

use courtboard_core::entities::{MARKER_RADIUS, PLAYER_RADIUS};
use courtboard_core::paint::{blit_scaled, fill_circle, fill_rect};
use courtboard_core::{Bitmap, BoardSession, Color, Marker, Player, RasterError};
use kurbo::Point;
use thiserror::Error;

use crate::court::draw_court;
use crate::glyph::{self, GLYPH_HEIGHT};

/// Exports render at twice the board resolution.
pub const EXPORT_SCALE: u32 = 2;

const MARKER_FILL: Color = Color::white();
const MARKER_OUTLINE: Color = Color::opaque(0x33, 0x33, 0x33);
const TAG_BACKGROUND: Color = Color::new(0, 0, 0, 178);
const TAG_TEXT: Color = Color::white();

/// Minimum and maximum name-tag width in board pixels.
const TAG_MIN_WIDTH: f64 = 40.0;
const TAG_MAX_WIDTH: f64 = 120.0;
const TAG_PADDING: f64 = 4.0;
const TAG_GAP: f64 = 4.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("raster error: {0}")]
    Raster(#[from] RasterError),
}

/// Render the full board at [`EXPORT_SCALE`]: court, committed ink, then
/// markers and players with jersey numbers and name tags on top.
pub fn render_board(session: &BoardSession) -> Bitmap {
    let size = session.size();
    let w = (size.width.round().max(1.0) as u32) * EXPORT_SCALE;
    let h = (size.height.round().max(1.0) as u32) * EXPORT_SCALE;
    let mut bmp = Bitmap::blank(w, h);

    draw_court(&mut bmp, EXPORT_SCALE);
    blit_scaled(&mut bmp, session.ink(), 0, 0, EXPORT_SCALE);

    for marker in session.markers() {
        draw_marker(&mut bmp, marker);
    }
    for player in session.players() {
        draw_player(&mut bmp, player);
    }
    bmp
}

/// Render the board and encode it as a PNG.
pub fn export_png(session: &BoardSession) -> Result<Vec<u8>, ExportError> {
    Ok(render_board(session).encode_png()?)
}

fn scaled(p: Point) -> Point {
    let s = f64::from(EXPORT_SCALE);
    Point::new(p.x * s, p.y * s)
}

fn draw_marker(bmp: &mut Bitmap, marker: &Marker) {
    let s = f64::from(EXPORT_SCALE);
    let center = scaled(marker.position);
    fill_circle(bmp, center, MARKER_RADIUS * s, MARKER_OUTLINE);
    fill_circle(bmp, center, (MARKER_RADIUS - 1.5) * s, MARKER_FILL);
}

fn draw_player(bmp: &mut Bitmap, player: &Player) {
    let s = f64::from(EXPORT_SCALE);
    let center = scaled(player.position);
    fill_circle(bmp, center, PLAYER_RADIUS * s, player.color);

    // Jersey number, centered in the disc.
    let number = player.number.to_string();
    let tw = i64::from(glyph::text_width(&number, EXPORT_SCALE));
    let th = i64::from(GLYPH_HEIGHT * EXPORT_SCALE);
    let cx = center.x.round() as i64;
    let cy = center.y.round() as i64;
    glyph::draw_text(bmp, cx - tw / 2, cy - th / 2, &number, EXPORT_SCALE, TAG_TEXT);

    draw_name_tag(bmp, player, cx, cy);
}

fn draw_name_tag(bmp: &mut Bitmap, player: &Player, cx: i64, cy: i64) {
    let s = f64::from(EXPORT_SCALE);
    let name = fit_tag_text(&player.display_name());
    let tw = i64::from(glyph::text_width(&name, EXPORT_SCALE));

    let box_w_board =
        (f64::from(glyph::text_width(&name, 1)) + 2.0 * TAG_PADDING).clamp(TAG_MIN_WIDTH, TAG_MAX_WIDTH);
    let box_w = (box_w_board * s).round() as i64;
    let box_h = ((f64::from(GLYPH_HEIGHT) + 2.0 * TAG_PADDING) * s).round() as i64;
    let box_y = cy + ((PLAYER_RADIUS + TAG_GAP) * s).round() as i64;

    fill_rect(bmp, cx - box_w / 2, box_y, box_w, box_h, TAG_BACKGROUND);
    let pad = (TAG_PADDING * s).round() as i64;
    glyph::draw_text(bmp, cx - tw / 2, box_y + pad, &name, EXPORT_SCALE, TAG_TEXT);
}

/// Truncate a name so its glyphs fit inside the widest tag.
fn fit_tag_text(name: &str) -> String {
    let max = TAG_MAX_WIDTH - 2.0 * TAG_PADDING;
    let mut out: String = name.into();
    while out.chars().count() > 1 && f64::from(glyph::text_width(&out, 1)) > max {
        out.pop();
    }
    out
}
