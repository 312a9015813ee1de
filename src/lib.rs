//! Canny Playground — load an image, tune two thresholds, watch the edge map
//! recompute live.
//!
//! The [`pipeline`] module holds the interactive recompute core; [`canny`]
//! is the engine the binary plugs into it.

pub mod app;
pub mod canny;
pub mod cli;
pub mod logger;
pub mod pipeline;
pub mod settings;

pub use pipeline::{EdgeCard, EdgeEngine, EngineError, EngineState, PipelineError, ThresholdParams};
