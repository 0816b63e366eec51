//! Ink raster layer: RGBA bitmaps and the snapshot-based history store.

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

/// Errors from raster encode/decode.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported pixel format: {0:?}")]
    PixelFormat(png::ColorType),
}

/// An owned RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Fully transparent bitmap of the given dimensions.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap raw RGBA8 data. Length must be `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize) * 4);
        Self { width, height, data }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Pixel at (x, y), or None outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Write a pixel, ignoring out-of-bounds coordinates.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Copy this bitmap into a buffer of new dimensions without rescaling:
    /// overlapping content is preserved pixel-for-pixel, clipped content is
    /// lost, newly exposed area is transparent.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let mut out = Self::blank(width, height);
        let copy_w = self.width.min(width) as usize * 4;
        for y in 0..self.height.min(height) {
            let src = self.index(0, y);
            let dst = out.index(0, y);
            out.data[dst..dst + copy_w].copy_from_slice(&self.data[src..src + copy_w]);
        }
        out
    }

    /// Encode as a PNG byte stream.
    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.data)?;
        }
        Ok(out)
    }

    /// Decode a PNG byte stream. Only RGBA8, the format this crate writes.
    pub fn decode_png(bytes: &[u8]) -> Result<Self, RasterError> {
        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        if info.color_type != png::ColorType::Rgba || info.bit_depth != png::BitDepth::Eight {
            return Err(RasterError::PixelFormat(info.color_type));
        }
        buf.truncate(info.buffer_size());
        Ok(Self::from_rgba(info.width, info.height, buf))
    }

    /// Encode as base64 PNG for embedding in the string key-value store.
    pub fn to_base64_png(&self) -> Result<String, RasterError> {
        Ok(STANDARD.encode(self.encode_png()?))
    }

    /// Decode from a base64 PNG string.
    pub fn from_base64_png(encoded: &str) -> Result<Self, RasterError> {
        let bytes = STANDARD.decode(encoded)?;
        Self::decode_png(&bytes)
    }
}

/// Append-only sequence of full-frame ink snapshots with a cursor.
///
/// The snapshot at the cursor is the currently visible ink layer. Snapshots
/// before it are undo targets; snapshots after it (left by a prior undo) are
/// redo targets until the next commit truncates them. The sequence is never
/// empty: construction seeds one blank snapshot.
#[derive(Debug, Clone)]
pub struct RasterHistory {
    snapshots: Vec<Bitmap>,
    cursor: usize,
}

impl RasterHistory {
    /// History with a single blank snapshot.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_snapshot(Bitmap::blank(width, height))
    }

    /// History seeded from a restored snapshot (session load).
    pub fn from_snapshot(snapshot: Bitmap) -> Self {
        Self { snapshots: vec![snapshot], cursor: 0 }
    }

    /// The currently visible snapshot.
    pub fn current(&self) -> &Bitmap {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        // Invariant: construction seeds one snapshot.
        self.snapshots.is_empty()
    }

    /// Append a snapshot, discarding any abandoned redo branch first, and
    /// move the cursor onto it.
    pub fn commit(&mut self, snapshot: Bitmap) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot and return the one now visible. None when
    /// already at the oldest snapshot.
    pub fn undo(&mut self) -> Option<&Bitmap> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward one snapshot. Exposed for symmetry; the unified action
    /// log drives undo only.
    pub fn redo(&mut self) -> Option<&Bitmap> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Drop all history and start over with one blank snapshot.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.snapshots = vec![Bitmap::blank(width, height)];
        self.cursor = 0;
    }

    /// Re-render the visible snapshot into new dimensions (clip or
    /// blank-extend, never rescale). Replaces the snapshot in place; resizing
    /// is not an undoable action.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.snapshots[self.cursor] = self.snapshots[self.cursor].resized(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(width: u32, height: u32, x: u32, y: u32) -> Bitmap {
        let mut bmp = Bitmap::blank(width, height);
        bmp.set_pixel(x, y, [255, 0, 0, 255]);
        bmp
    }

    #[test]
    fn test_starts_with_blank_snapshot() {
        let history = RasterHistory::new(4, 4);
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(history.current().is_blank());
    }

    #[test]
    fn test_commit_undo_redo() {
        let mut history = RasterHistory::new(4, 4);
        let first = dot(4, 4, 0, 0);
        let second = dot(4, 4, 1, 1);
        history.commit(first.clone());
        history.commit(second.clone());
        assert_eq!(history.cursor(), 2);

        assert_eq!(history.undo(), Some(&first));
        assert_eq!(history.cursor(), 1);

        assert_eq!(history.redo(), Some(&second));
        assert_eq!(history.cursor(), 2);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_at_origin_is_noop() {
        let mut history = RasterHistory::new(4, 4);
        assert!(history.undo().is_none());
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_commit_after_undo_truncates_branch() {
        let mut history = RasterHistory::new(4, 4);
        history.commit(dot(4, 4, 0, 0));
        history.commit(dot(4, 4, 1, 1));
        history.undo();
        history.undo();

        let replacement = dot(4, 4, 2, 2);
        history.commit(replacement.clone());

        // The two undone snapshots are gone; redo cannot resurrect them.
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), &replacement);
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_reset() {
        let mut history = RasterHistory::new(4, 4);
        history.commit(dot(4, 4, 0, 0));
        history.reset(8, 8);
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.current().width(), 8);
        assert!(history.current().is_blank());
    }

    #[test]
    fn test_resize_preserves_content_without_history_entry() {
        let mut history = RasterHistory::new(4, 4);
        history.commit(dot(4, 4, 1, 1));
        let len_before = history.len();

        history.resize(8, 8);
        assert_eq!(history.len(), len_before);
        assert_eq!(history.current().pixel(1, 1), Some([255, 0, 0, 255]));
        // Newly exposed area is transparent.
        assert_eq!(history.current().pixel(6, 6), Some([0, 0, 0, 0]));

        history.resize(2, 2);
        assert_eq!(history.current().pixel(1, 1), Some([255, 0, 0, 255]));
        assert!(history.current().pixel(3, 3).is_none());
    }

    #[test]
    fn test_png_base64_round_trip() {
        let bmp = dot(8, 6, 3, 2);
        let encoded = bmp.to_base64_png().unwrap();
        let decoded = Bitmap::from_base64_png(&encoded).unwrap();
        assert_eq!(decoded, bmp);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(Bitmap::from_base64_png("not base64 at all!!!").is_err());
        assert!(Bitmap::decode_png(&[0x00, 0x01, 0x02]).is_err());
    }
}
