// ============================================================================
// INTERACTIVE RECOMPUTE PIPELINE
// ============================================================================
//
// Image/threshold state, engine lifecycle, and the dispatcher that keeps the
// result surface in step with the latest inputs.  `EdgeCard` is the single
// actor the host UI (or CLI) talks to.

pub mod card;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod params;
pub mod pixels;
pub mod source;
pub mod surface;

use std::sync::mpsc;

pub use card::EdgeCard;
pub use dispatcher::Dispatcher;
pub use engine::{EdgeEngine, EngineError, EngineLifecycle, EngineState};
pub use error::{ErrorSlot, PipelineError};
pub use params::{ParameterStore, ThresholdParams};
pub use pixels::PixelBuffer;
pub use source::{FileInput, ImageError, ImageOrigin, ImageSession, ImageSource};
pub use surface::{Bitmap, Surfaces};

/// Change notification that should lead to a recompute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    ParamsChanged,
    ImageLoaded,
    /// Raised by the card itself when the engine lifecycle reports Ready.
    EngineReady,
}

/// Fan-out of [`Trigger`]s to every subscriber.  Subscribers that hung up
/// are dropped on the next publish.
#[derive(Default)]
pub struct Publisher {
    subscribers: Vec<mpsc::Sender<Trigger>>,
}

impl Publisher {
    pub fn subscribe(&mut self) -> mpsc::Receiver<Trigger> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, trigger: Trigger) {
        self.subscribers.retain(|tx| tx.send(trigger).is_ok());
    }
}
