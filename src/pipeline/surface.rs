// ============================================================================
// PRESENTATION SURFACES — source and result bitmaps shown by the host
// ============================================================================
//
// Only the Image Source resizes/draws the source bitmap and only the
// Dispatcher paints the result bitmap.  Each paint replaces the whole
// buffer at once, and bumps `revision` so the host knows to re-upload.

use super::pixels::{PixelBuffer, expected_len};

/// A drawable RGBA bitmap region.
#[derive(Clone, Debug, Default)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    /// Incremented on every resize or paint.
    revision: u64,
    paints: u64,
}

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of full paints since creation.
    pub fn paint_count(&self) -> u64 {
        self.paints
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Change geometry; contents are cleared to transparent.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; expected_len(width, height)];
        self.revision += 1;
    }

    /// Replace the whole bitmap in one step.  Returns `false` (and leaves the
    /// bitmap untouched) when the buffer's dimensions differ from the bitmap's.
    pub fn paint(&mut self, buffer: PixelBuffer) -> bool {
        if buffer.dimensions() != self.dimensions() {
            return false;
        }
        self.pixels = buffer.into_bytes();
        self.revision += 1;
        self.paints += 1;
        true
    }

    /// Read the current bitmap as a buffer, using the bitmap's own geometry.
    /// `None` while the bitmap has no area.
    pub fn snapshot(&self) -> Option<PixelBuffer> {
        if self.is_empty() {
            return None;
        }
        PixelBuffer::from_raw(self.width, self.height, self.pixels.clone())
    }
}

/// The pair of bitmaps a card renders into.
#[derive(Clone, Debug, Default)]
pub struct Surfaces {
    pub source: Bitmap,
    pub result: Bitmap,
}

impl Surfaces {
    /// Give both surfaces the same geometry.
    pub fn resize_both(&mut self, width: u32, height: u32) {
        self.source.resize(width, height);
        self.result.resize(width, height);
    }
}
