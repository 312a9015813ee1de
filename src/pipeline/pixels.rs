// ============================================================================
// PIXEL BUFFER — RGBA8 snapshot passed across the engine boundary
// ============================================================================

use image::RgbaImage;

/// Bytes per pixel; channel order is always `[R, G, B, A]`.
pub const CHANNELS: usize = 4;

/// Raw RGBA byte buffer with known dimensions.
///
/// `bytes.len() == width * height * 4` holds for every value that can be
/// constructed, so anything handed to the engine is well-formed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes.  Returns `None` for zero dimensions or a length
    /// that does not match `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || bytes.len() != expected_len(width, height) {
            return None;
        }
        Some(Self {
            width,
            height,
            bytes,
        })
    }

    /// A fully transparent buffer.
    pub fn transparent(width: u32, height: u32) -> Option<Self> {
        Self::from_raw(width, height, vec![0; expected_len(width, height)])
    }

    pub fn from_rgba_image(img: RgbaImage) -> Option<Self> {
        let (w, h) = img.dimensions();
        Self::from_raw(w, h, img.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        // Length is checked at construction, so from_raw cannot fail here.
        RgbaImage::from_raw(self.width, self.height, self.bytes.clone())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }
}

/// `width * height * 4`, the only legal byte length for a buffer.
pub fn expected_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * CHANNELS
}
