// ============================================================================
// EDGE CARD — the single actor behind one playground card
// ============================================================================
//
// All user events (threshold drags, file drops/picks, engine readiness) go
// through this type, strictly in arrival order.  The Parameter Store and the
// Image Source publish triggers; the card drains them right after each
// operation and recomputes once for the whole batch, reading the latest
// state on demand.

use std::sync::Arc;
use std::sync::mpsc;

use super::dispatcher::{Applied, Dispatcher, JobResult, RecomputeStatus};
use super::engine::{EdgeEngine, EngineLifecycle, EngineState};
use super::error::{ErrorSlot, PipelineError};
use super::params::{ParameterStore, ThresholdParams};
use super::source::{FileInput, ImageOrigin, ImageSession, ImageSource};
use super::surface::Surfaces;
use super::Trigger;
use crate::log_info;

pub struct EdgeCard {
    params: ParameterStore,
    source: ImageSource,
    engine: EngineLifecycle,
    surfaces: Surfaces,
    dispatcher: Dispatcher,
    errors: ErrorSlot,
    triggers: Vec<mpsc::Receiver<Trigger>>,
}

impl EdgeCard {
    pub fn new(engine: Arc<dyn EdgeEngine>, initial: ThresholdParams) -> Self {
        let mut params = ParameterStore::new(initial);
        let mut source = ImageSource::default();
        let triggers = vec![params.subscribe(), source.subscribe()];
        Self {
            params,
            source,
            engine: EngineLifecycle::new(engine),
            surfaces: Surfaces::default(),
            dispatcher: Dispatcher::new(),
            errors: ErrorSlot::default(),
            triggers,
        }
    }

    /// Begin loading the engine.  Later calls are ignored.
    pub fn start(&mut self) {
        self.engine.initialize();
    }

    // --- accessors ---

    pub fn params(&self) -> ThresholdParams {
        self.params.params()
    }

    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn session(&self) -> Option<&ImageSession> {
        self.source.session()
    }

    pub fn surfaces(&self) -> &Surfaces {
        &self.surfaces
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.errors.current()
    }

    pub fn error_message(&self) -> Option<String> {
        self.errors.message()
    }

    /// Engine still loading or a recompute still outstanding.
    pub fn is_busy(&self) -> bool {
        self.engine.state() == EngineState::Loading || self.dispatcher.is_busy()
    }

    // --- user operations ---

    pub fn set_low(&mut self, v: i32) -> u8 {
        let committed = self.params.set_low(v);
        self.drain_triggers();
        committed
    }

    pub fn set_high(&mut self, v: i32) -> u8 {
        let committed = self.params.set_high(v);
        self.drain_triggers();
        committed
    }

    /// Decode and show an image.  Failures land in the error slot as well
    /// as being returned; the previous image and result stay on screen.
    pub fn load_bytes(
        &mut self,
        origin: ImageOrigin,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), PipelineError> {
        let loaded = self
            .source
            .load(origin, name, bytes, &mut self.surfaces)
            .map(|_| ());
        self.after_load(loaded)
    }

    /// Load the first of the offered files (drop or picker selection).
    /// An empty offer changes nothing, the error slot included.
    pub fn load_files(
        &mut self,
        origin: ImageOrigin,
        files: Vec<FileInput>,
    ) -> Result<(), PipelineError> {
        let loaded = match self.source.load_files(origin, files, &mut self.surfaces) {
            Ok(None) => return Ok(()),
            Ok(Some(_)) => Ok(()),
            Err(e) => Err(e),
        };
        self.after_load(loaded)
    }

    /// Recompute the edge map from the current inputs.  A silent no-op
    /// unless the engine is ready and an image is loaded.
    pub fn recompute(&mut self) -> RecomputeStatus {
        self.dispatcher.recompute(
            self.engine.engine(),
            self.source.session().is_some(),
            &self.surfaces.source,
            self.params.params(),
        )
    }

    /// Apply whatever finished since the last call, without blocking.
    /// Returns `true` when something visible changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        if let Some(state) = self.engine.poll() {
            self.on_engine_state(state);
            changed = true;
        }
        while let Some(job) = self.dispatcher.poll() {
            changed |= self.finish_job(job);
        }
        changed
    }

    /// Block until the engine load and every outstanding recompute are done.
    pub fn settle(&mut self) {
        loop {
            if self.engine.state() == EngineState::Loading {
                let state = self.engine.wait();
                self.on_engine_state(state);
                continue;
            }
            match self.dispatcher.wait() {
                Some(job) => {
                    self.finish_job(job);
                }
                None => break,
            }
        }
    }

    /// End of session.
    pub fn teardown(mut self) {
        self.settle();
        self.engine.teardown();
    }

    // --- internals ---

    fn after_load(&mut self, loaded: Result<(), super::ImageError>) -> Result<(), PipelineError> {
        match loaded {
            Ok(()) => {
                self.errors.clear();
                self.drain_triggers();
                Ok(())
            }
            Err(e) => {
                crate::log_warn!("Image rejected: {}", e);
                let err = PipelineError::from(e);
                self.errors.set(err.clone());
                Err(err)
            }
        }
    }

    /// Collapse everything published since the last drain into one recompute.
    fn drain_triggers(&mut self) {
        let latest = self.triggers.iter().flat_map(|rx| rx.try_iter()).last();
        if let Some(trigger) = latest {
            self.handle(trigger);
        }
    }

    fn handle(&mut self, trigger: Trigger) {
        if self.recompute() == RecomputeStatus::Deferred {
            log_info!("{:?} while a job is running; it will be superseded", trigger);
        }
    }

    fn on_engine_state(&mut self, state: EngineState) {
        match state {
            EngineState::Ready => {
                self.handle(Trigger::EngineReady);
            }
            EngineState::Failed => {
                let reason = self
                    .engine
                    .failure_reason()
                    .unwrap_or("unknown error")
                    .to_string();
                self.errors.set(PipelineError::EngineLoadFailed(reason));
            }
            EngineState::Uninitialized | EngineState::Loading => {}
        }
    }

    fn finish_job(&mut self, job: JobResult) -> bool {
        let applied = self
            .dispatcher
            .apply(job, &mut self.surfaces.result, &mut self.errors);
        if self.dispatcher.take_dirty() {
            self.recompute();
        }
        applied != Applied::Superseded
    }
}
