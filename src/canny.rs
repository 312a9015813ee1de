// ============================================================================
// CANNY ENGINE — the concrete edge engine behind the pipeline's boundary
// ============================================================================
//
// RGBA → BT.601 luma → optional Gaussian pre-blur → Canny → opaque
// black/white RGBA.  Hysteresis thresholds come straight from the sliders.

use std::sync::atomic::{AtomicBool, Ordering};

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use rayon::prelude::*;

use crate::pipeline::engine::{EdgeEngine, EngineError};
use crate::pipeline::pixels::{CHANNELS, expected_len};

const EDGE: [u8; 4] = [255, 255, 255, 255];
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

pub struct CannyEngine {
    /// Gaussian sigma applied before Canny; `0.0` disables the blur.
    pre_blur_sigma: f32,
    initialized: AtomicBool,
}

impl CannyEngine {
    pub fn new(pre_blur_sigma: f32) -> Self {
        Self {
            pre_blur_sigma: pre_blur_sigma.max(0.0),
            initialized: AtomicBool::new(false),
        }
    }

    fn run(&self, pixels: &[u8], width: u32, height: u32, low: u8, high: u8) -> Vec<u8> {
        let luma: Vec<u8> = pixels.par_chunks_exact(CHANNELS).map(bt601_luma).collect();
        let mut gray = GrayImage::from_raw(width, height, luma)
            .unwrap_or_else(|| GrayImage::new(width, height));
        if self.pre_blur_sigma > 0.0 {
            gray = gaussian_blur_f32(&gray, self.pre_blur_sigma);
        }

        let edges = canny(&gray, low as f32, high as f32);
        edges
            .as_raw()
            .par_iter()
            .flat_map_iter(|&e| if e == 0 { BACKGROUND } else { EDGE })
            .collect()
    }
}

impl Default for CannyEngine {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl EdgeEngine for CannyEngine {
    fn name(&self) -> &str {
        "canny"
    }

    /// Self-test on a tiny step image; the engine only accepts work after it passes.
    fn init(&self) -> Result<(), EngineError> {
        let mut probe = Vec::with_capacity(expected_len(4, 4));
        for i in 0..16u32 {
            let v = if i % 4 < 2 { 0 } else { 255 };
            probe.extend_from_slice(&[v, v, v, 255]);
        }
        let out = self.run(&probe, 4, 4, 75, 200);
        if out.len() != probe.len() {
            return Err(EngineError::LoadFailed(format!(
                "self-test produced {} bytes, expected {}",
                out.len(),
                probe.len()
            )));
        }
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    fn detect(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        low: u8,
        high: u8,
    ) -> Result<Vec<u8>, EngineError> {
        if !self.initialized.load(Ordering::Acquire) {
            return Err(EngineError::NotInitialized);
        }
        let expected = expected_len(width, height);
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(EngineError::InvalidInput(format!(
                "{} bytes for {}x{} (expected {})",
                pixels.len(),
                width,
                height,
                expected
            )));
        }
        Ok(self.run(pixels, width, height, low, high))
    }

    fn shutdown(&self) {
        self.initialized.store(false, Ordering::Release);
    }
}

/// Rec.601 luma, truncated to `u8`.
fn bt601_luma(px: &[u8]) -> u8 {
    (0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32) as u8
}
