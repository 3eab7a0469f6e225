//! `ImageSink` (consumed in offline mode): `append(row)` / `write()`,
//! with a PNG-on-disk backend (`image` crate) and an in-memory backend
//! for tests. Orientation is applied at finalize time; internal buffers
//! always stay in the vertical layout.

use crate::error::SinkError;
use crate::settings::Orientation;
use image::{ImageBuffer, Rgb, RgbImage};
use std::path::PathBuf;

pub trait ImageSink {
    /// Appends one `PixelRow` of packed `0x00RRGGBB` pixels. All
    /// appended rows must share the same width.
    fn append(&mut self, row: &[u32]) -> Result<(), SinkError>;

    /// Finalizes the image at `width x total_rows`, applying orientation.
    fn write(&mut self) -> Result<(), SinkError>;
}

/// Writes a PNG to disk once `write` is called.
pub struct PngImageSink {
    path: PathBuf,
    width: u32,
    orientation: Orientation,
    rows: Vec<u32>,
}

impl PngImageSink {
    pub fn new(path: PathBuf, width: u32, orientation: Orientation) -> Self {
        Self {
            path,
            width,
            orientation,
            rows: Vec::new(),
        }
    }
}

fn unpack(px: u32) -> Rgb<u8> {
    Rgb([(px >> 16) as u8, (px >> 8) as u8, px as u8])
}

fn build_image(pixels: &[u32], width: u32, orientation: Orientation) -> RgbImage {
    let height = (pixels.len() as u32) / width.max(1);
    let mut vertical: RgbImage = ImageBuffer::new(width, height);
    for (i, &px) in pixels.iter().enumerate() {
        let x = (i as u32) % width;
        let y = (i as u32) / width;
        vertical.put_pixel(x, y, unpack(px));
    }
    match orientation {
        Orientation::Vertical => vertical,
        Orientation::Horizontal => image::imageops::rotate90(&vertical),
    }
}

impl ImageSink for PngImageSink {
    fn append(&mut self, row: &[u32]) -> Result<(), SinkError> {
        debug_assert_eq!(row.len(), self.width as usize);
        self.rows.extend_from_slice(row);
        Ok(())
    }

    fn write(&mut self) -> Result<(), SinkError> {
        let image = build_image(&self.rows, self.width, self.orientation);
        image.save(&self.path)?;
        Ok(())
    }
}

/// An in-memory sink used by tests and by the realtime Presenter's
/// staging buffer logic (shared `append`/finalize contract).
pub struct InMemoryImageSink {
    pub width: u32,
    pub orientation: Orientation,
    pub rows: Vec<u32>,
    pub finalized: Option<RgbImage>,
}

impl InMemoryImageSink {
    pub fn new(width: u32, orientation: Orientation) -> Self {
        Self {
            width,
            orientation,
            rows: Vec::new(),
            finalized: None,
        }
    }
}

impl ImageSink for InMemoryImageSink {
    fn append(&mut self, row: &[u32]) -> Result<(), SinkError> {
        debug_assert_eq!(row.len(), self.width as usize);
        self.rows.extend_from_slice(row);
        Ok(())
    }

    fn write(&mut self) -> Result<(), SinkError> {
        let image = build_image(&self.rows, self.width, self.orientation);
        self.finalized = Some(image);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appended_rows_produce_correct_dimensions() {
        let mut sink = InMemoryImageSink::new(4, Orientation::Vertical);
        for _ in 0..3 {
            sink.append(&[0, 1, 2, 3]).unwrap();
        }
        sink.write().unwrap();
        let image = sink.finalized.unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 3);
    }

    #[test]
    fn horizontal_orientation_rotates_at_finalize() {
        let image = build_image(&[0, 1, 2, 3, 4, 5], 3, Orientation::Horizontal);
        // 3 wide x 2 tall rotated 90 degrees -> 2 wide x 3 tall.
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 3);
    }
}
