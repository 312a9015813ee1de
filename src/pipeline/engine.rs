// ============================================================================
// ENGINE BOUNDARY + LIFECYCLE — one-time asynchronous engine load
// ============================================================================
//
// The engine is a black box: `init()` once, then `detect()` any number of
// times.  `EngineLifecycle` runs `init()` on the rayon pool and reports the
// outcome over a channel that the owner polls each frame, the same way the
// UI polls every other background job.

use std::sync::Arc;
use std::sync::mpsc;

use crate::{log_err, log_info, log_warn};

/// Errors produced at the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    NotInitialized,
    LoadFailed(String),
    InvalidInput(String),
    InvalidOutput(String),
    Panicked(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotInitialized => write!(f, "Edge engine used before it finished loading"),
            EngineError::LoadFailed(e) => write!(f, "Failed to load edge engine: {}", e),
            EngineError::InvalidInput(e) => write!(f, "Invalid engine input: {}", e),
            EngineError::InvalidOutput(e) => write!(f, "Invalid engine output: {}", e),
            EngineError::Panicked(e) => write!(f, "Edge engine panicked: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

/// External edge-detection engine.
///
/// `detect` takes an RGBA buffer of `width * height * 4` bytes and must
/// return a buffer of the same length and channel layout.
pub trait EdgeEngine: Send + Sync + 'static {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// One-time load.  Called from a worker thread.
    fn init(&self) -> Result<(), EngineError>;

    fn detect(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        low: u8,
        high: u8,
    ) -> Result<Vec<u8>, EngineError>;

    /// Release engine resources at session end.
    fn shutdown(&self) {}
}

/// Process-wide engine readiness.  Moves only forward; `Failed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

/// Owns the engine handle and its load state.
///
/// Nothing outside this type can reach the engine until the state is
/// [`EngineState::Ready`]: [`EngineLifecycle::engine`] returns `None` otherwise.
pub struct EngineLifecycle {
    engine: Arc<dyn EdgeEngine>,
    state: EngineState,
    failure: Option<String>,
    load_rx: Option<mpsc::Receiver<Result<(), EngineError>>>,
}

impl EngineLifecycle {
    pub fn new(engine: Arc<dyn EdgeEngine>) -> Self {
        Self {
            engine,
            state: EngineState::Uninitialized,
            failure: None,
            load_rx: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Human-readable reason once the state is `Failed`.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// The engine, only while `Ready`.
    pub fn engine(&self) -> Option<Arc<dyn EdgeEngine>> {
        (self.state == EngineState::Ready).then(|| Arc::clone(&self.engine))
    }

    /// Start loading the engine in the background.
    ///
    /// Only the first call has an effect (`Uninitialized -> Loading`);
    /// returns `false` for any later call.
    pub fn initialize(&mut self) -> bool {
        if self.state != EngineState::Uninitialized {
            log_warn!(
                "Engine '{}' initialize called again in state {:?}; ignored",
                self.engine.name(),
                self.state
            );
            return false;
        }
        self.state = EngineState::Loading;
        log_info!("Loading edge engine '{}'", self.engine.name());

        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);
        let engine = Arc::clone(&self.engine);
        rayon::spawn(move || {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| engine.init()))
                .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(&*payload))));
            let _ = tx.send(outcome);
        });
        true
    }

    /// Apply a finished load, if any.  Returns the new state when a
    /// transition happened on this call.
    pub fn poll(&mut self) -> Option<EngineState> {
        let rx = self.load_rx.as_ref()?;
        match rx.try_recv() {
            Ok(outcome) => Some(self.finish(outcome)),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(self.finish(Err(
                EngineError::LoadFailed("loader thread exited without reporting".to_string()),
            ))),
        }
    }

    /// Block until a pending load finishes.  Returns the resulting state.
    pub fn wait(&mut self) -> EngineState {
        if let Some(rx) = self.load_rx.as_ref() {
            let outcome = rx.recv().unwrap_or_else(|_| {
                Err(EngineError::LoadFailed(
                    "loader thread exited without reporting".to_string(),
                ))
            });
            self.finish(outcome);
        }
        self.state
    }

    /// End of session: shut the engine down if it was ever loaded.
    pub fn teardown(self) {
        if self.state == EngineState::Ready {
            self.engine.shutdown();
        }
        log_info!("Edge engine '{}' torn down in state {:?}", self.engine.name(), self.state);
    }

    fn finish(&mut self, outcome: Result<(), EngineError>) -> EngineState {
        self.load_rx = None;
        match outcome {
            Ok(()) => {
                self.state = EngineState::Ready;
                log_info!("Edge engine '{}' ready", self.engine.name());
            }
            Err(e) => {
                self.state = EngineState::Failed;
                log_err!("Edge engine '{}' failed to load: {}", self.engine.name(), e);
                self.failure = Some(e.to_string());
            }
        }
        self.state
    }
}

/// Best-effort text for a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
