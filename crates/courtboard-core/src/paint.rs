//! Software painting primitives for the ink layer and export compositing.
//!
//! Strokes are rasterized by stamping filled discs along each pointer
//! segment, which matches round-cap/round-join canvas strokes closely enough
//! at board resolution. The eraser stamps transparency instead of color.

use crate::entities::Color;
use crate::raster::Bitmap;
use kurbo::Point;

/// Source-over blend of one pixel.
#[inline]
fn blend_pixel(dst: &mut Bitmap, x: u32, y: u32, color: Color) {
    let Some(under) = dst.pixel(x, y) else { return };
    if color.a == 255 {
        dst.set_pixel(x, y, [color.r, color.g, color.b, 255]);
        return;
    }
    let a = color.a as u32;
    let inv = 255 - a;
    let blend = |src: u8, dst: u8| -> u8 { ((src as u32 * a + dst as u32 * inv) / 255) as u8 };
    let out_a = (a + under[3] as u32 * inv / 255) as u8;
    dst.set_pixel(
        x,
        y,
        [
            blend(color.r, under[0]),
            blend(color.g, under[1]),
            blend(color.b, under[2]),
            out_a,
        ],
    );
}

/// Visit every pixel inside the disc of `radius` around `center` that lies
/// within the bitmap.
fn for_disc(bmp: &mut Bitmap, center: Point, radius: f64, mut visit: impl FnMut(&mut Bitmap, u32, u32)) {
    let r = radius.max(0.5);
    let x0 = (center.x - r).floor().max(0.0) as u32;
    let y0 = (center.y - r).floor().max(0.0) as u32;
    let x1 = ((center.x + r).ceil() as i64).clamp(0, i64::from(bmp.width())) as u32;
    let y1 = ((center.y + r).ceil() as i64).clamp(0, i64::from(bmp.height())) as u32;
    let r_sq = r * r;
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            if dx * dx + dy * dy <= r_sq {
                visit(bmp, x, y);
            }
        }
    }
}

/// Fill a disc with `color`, alpha-blended over existing content.
pub fn fill_circle(bmp: &mut Bitmap, center: Point, radius: f64, color: Color) {
    for_disc(bmp, center, radius, |bmp, x, y| blend_pixel(bmp, x, y, color));
}

/// Clear a disc to full transparency (destination-out).
pub fn erase_circle(bmp: &mut Bitmap, center: Point, radius: f64) {
    for_disc(bmp, center, radius, |bmp, x, y| bmp.set_pixel(x, y, [0, 0, 0, 0]));
}

/// Stamp discs along the segment so consecutive stamps overlap.
fn for_segment(from: Point, to: Point, radius: f64, mut stamp: impl FnMut(Point)) {
    let dist = from.distance(to);
    let step = (radius * 0.5).max(0.5);
    let count = (dist / step).ceil() as usize;
    stamp(from);
    for i in 1..=count {
        let t = i as f64 / count.max(1) as f64;
        stamp(from.lerp(to, t));
    }
}

/// Paint a round-capped stroke segment of the given total width.
pub fn stroke_segment(bmp: &mut Bitmap, from: Point, to: Point, width: f64, color: Color) {
    for_segment(from, to, width / 2.0, |p| fill_circle(bmp, p, width / 2.0, color));
}

/// Erase a round-capped segment of the given total width.
pub fn erase_segment(bmp: &mut Bitmap, from: Point, to: Point, width: f64) {
    for_segment(from, to, width / 2.0, |p| erase_circle(bmp, p, width / 2.0));
}

/// Fill an axis-aligned rectangle, clipped to the bitmap.
pub fn fill_rect(bmp: &mut Bitmap, x0: i64, y0: i64, w: i64, h: i64, color: Color) {
    let xa = x0.clamp(0, i64::from(bmp.width())) as u32;
    let ya = y0.clamp(0, i64::from(bmp.height())) as u32;
    let xb = (x0 + w).clamp(0, i64::from(bmp.width())) as u32;
    let yb = (y0 + h).clamp(0, i64::from(bmp.height())) as u32;
    for y in ya..yb {
        for x in xa..xb {
            blend_pixel(bmp, x, y, color);
        }
    }
}

/// Composite `src` over `dst` at `(dx, dy)`, magnified by an integer factor.
/// Nearest-neighbor; used by export to lay the 1x ink layer onto the
/// supersampled output.
pub fn blit_scaled(dst: &mut Bitmap, src: &Bitmap, dx: i64, dy: i64, scale: u32) {
    for sy in 0..src.height() {
        for sx in 0..src.width() {
            let Some(px) = src.pixel(sx, sy) else { continue };
            if px[3] == 0 {
                continue;
            }
            let color = Color::new(px[0], px[1], px[2], px[3]);
            fill_rect(
                dst,
                dx + i64::from(sx) * i64::from(scale),
                dy + i64::from(sy) * i64::from(scale),
                i64::from(scale),
                i64::from(scale),
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::opaque(255, 0, 0);

    #[test]
    fn test_fill_circle_covers_center() {
        let mut bmp = Bitmap::blank(20, 20);
        fill_circle(&mut bmp, Point::new(10.0, 10.0), 4.0, RED);
        assert_eq!(bmp.pixel(10, 10), Some([255, 0, 0, 255]));
        // Corner of the bounding box stays untouched.
        assert_eq!(bmp.pixel(6, 6), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_fill_circle_clips_at_edges() {
        let mut bmp = Bitmap::blank(10, 10);
        fill_circle(&mut bmp, Point::new(0.0, 0.0), 5.0, RED);
        assert_eq!(bmp.pixel(0, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_segment_is_continuous() {
        let mut bmp = Bitmap::blank(40, 10);
        stroke_segment(&mut bmp, Point::new(3.0, 5.0), Point::new(36.0, 5.0), 3.0, RED);
        // Every column along the stroke midline is painted.
        for x in 3..=36 {
            assert_eq!(bmp.pixel(x, 5), Some([255, 0, 0, 255]), "gap at x={x}");
        }
    }

    #[test]
    fn test_erase_segment_clears_alpha() {
        let mut bmp = Bitmap::blank(20, 20);
        stroke_segment(&mut bmp, Point::new(2.0, 10.0), Point::new(18.0, 10.0), 4.0, RED);
        erase_segment(&mut bmp, Point::new(2.0, 10.0), Point::new(18.0, 10.0), 12.0);
        assert!(bmp.is_blank());
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut bmp = Bitmap::blank(8, 8);
        fill_rect(&mut bmp, -2, -2, 4, 4, RED);
        assert_eq!(bmp.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(bmp.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_semi_transparent_blend() {
        let mut bmp = Bitmap::blank(4, 4);
        fill_rect(&mut bmp, 0, 0, 4, 4, Color::opaque(0, 0, 0));
        fill_rect(&mut bmp, 0, 0, 4, 4, Color::new(255, 255, 255, 128));
        let px = bmp.pixel(0, 0).unwrap();
        assert!(px[0] > 100 && px[0] < 155, "expected mid gray, got {px:?}");
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_blit_scaled_magnifies() {
        let mut src = Bitmap::blank(2, 2);
        src.set_pixel(1, 0, [0, 255, 0, 255]);
        let mut dst = Bitmap::blank(4, 4);
        blit_scaled(&mut dst, &src, 0, 0, 2);
        assert_eq!(dst.pixel(2, 0), Some([0, 255, 0, 255]));
        assert_eq!(dst.pixel(3, 1), Some([0, 255, 0, 255]));
        assert_eq!(dst.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
