//! Mock engines and image helpers shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, mpsc};

use canny_playground::{EdgeEngine, EngineError};
use image::{ImageOutputFormat, Rgba, RgbaImage};

/// One recorded `detect` call.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub low: u8,
    pub high: u8,
}

/// Records every call and answers with every byte set to `low`, so a
/// painted result shows which thresholds produced it.
#[derive(Default)]
pub struct RecordingEngine {
    pub calls: Mutex<Vec<Call>>,
    /// Fail `detect` whenever `low` equals this value.
    pub fail_on_low: Option<u8>,
}

impl RecordingEngine {
    pub fn failing_on_low(low: u8) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_low: Some(low),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<Call> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl EdgeEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn init(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn detect(&self, pixels: &[u8], width: u32, height: u32, low: u8, high: u8) -> Result<Vec<u8>, EngineError> {
        self.calls.lock().unwrap().push(Call {
            pixels: pixels.to_vec(),
            width,
            height,
            low,
            high,
        });
        if self.fail_on_low == Some(low) {
            return Err(EngineError::InvalidInput(format!("low {} rejected", low)));
        }
        Ok(vec![low; pixels.len()])
    }
}

/// Engine whose load always fails; counts any `detect` call it receives.
#[derive(Default)]
pub struct BrokenEngine {
    pub detect_calls: AtomicUsize,
}

impl EdgeEngine for BrokenEngine {
    fn name(&self) -> &str {
        "broken"
    }

    fn init(&self) -> Result<(), EngineError> {
        Err(EngineError::LoadFailed("module could not be instantiated".into()))
    }

    fn detect(&self, pixels: &[u8], _: u32, _: u32, _: u8, _: u8) -> Result<Vec<u8>, EngineError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(pixels.to_vec())
    }
}

/// Behaves like [`RecordingEngine`] until `detect` sees `panic_on_low`.
pub struct PanickingEngine {
    pub panic_on_low: u8,
    pub inner: RecordingEngine,
}

impl PanickingEngine {
    pub fn new(panic_on_low: u8) -> Self {
        Self {
            panic_on_low,
            inner: RecordingEngine::default(),
        }
    }
}

impl EdgeEngine for PanickingEngine {
    fn name(&self) -> &str {
        "panicking"
    }

    fn init(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn detect(&self, pixels: &[u8], width: u32, height: u32, low: u8, high: u8) -> Result<Vec<u8>, EngineError> {
        if low == self.panic_on_low {
            panic!("kaboom");
        }
        self.inner.detect(pixels, width, height, low, high)
    }
}

/// `init` and `detect` each block until the test hands out a permit.
pub struct GatedEngine {
    init_gate: Mutex<mpsc::Receiver<()>>,
    detect_gate: Mutex<mpsc::Receiver<()>>,
    pub inner: RecordingEngine,
}

pub struct Gates {
    pub init: mpsc::Sender<()>,
    pub detect: mpsc::Sender<()>,
}

impl GatedEngine {
    pub fn new() -> (Self, Gates) {
        let (init_tx, init_rx) = mpsc::channel();
        let (detect_tx, detect_rx) = mpsc::channel();
        let engine = Self {
            init_gate: Mutex::new(init_rx),
            detect_gate: Mutex::new(detect_rx),
            inner: RecordingEngine::default(),
        };
        (engine, Gates { init: init_tx, detect: detect_tx })
    }
}

impl EdgeEngine for GatedEngine {
    fn name(&self) -> &str {
        "gated"
    }

    fn init(&self) -> Result<(), EngineError> {
        self.init_gate
            .lock()
            .unwrap()
            .recv()
            .map_err(|_| EngineError::LoadFailed("gate closed".into()))
    }

    fn detect(&self, pixels: &[u8], width: u32, height: u32, low: u8, high: u8) -> Result<Vec<u8>, EngineError> {
        self.detect_gate
            .lock()
            .unwrap()
            .recv()
            .map_err(|_| EngineError::InvalidInput("gate closed".into()))?;
        self.inner.detect(pixels, width, height, low, high)
    }
}

/// PNG bytes of a solid `w`×`h` image.
pub fn solid_png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(w, h, Rgba(px)))
}

/// PNG bytes of a black/white vertical step at `split_x`.
pub fn step_png(w: u32, h: u32, split_x: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(w, h, |x, _| {
        if x < split_x {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    encode_png(&img)
}

pub fn encode_png(img: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
    out.into_inner()
}
