// ============================================================================
// RECOMPUTE DISPATCHER — single point where the engine is invoked
// ============================================================================
//
// Engine calls run on the rayon pool and report back over a channel.  At
// most one job is in flight.  A recompute requested while a job is running
// only marks the dispatcher dirty; when that job lands its result is thrown
// away (it was computed from superseded inputs) and the owner dispatches
// again against the latest state.  Each job carries a token and results
// whose token is not the in-flight one are discarded on receipt, so the
// result surface can never be painted out of order.

use std::sync::Arc;
use std::sync::mpsc;

use super::engine::{EdgeEngine, EngineError, panic_message};
use super::error::{ErrorSlot, PipelineError};
use super::params::ThresholdParams;
use super::pixels::{PixelBuffer, expected_len};
use super::surface::Bitmap;
use crate::{log_info, log_warn};

/// What a `recompute` call did.  Callers are free to ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecomputeStatus {
    /// Engine not ready.
    EngineNotReady,
    /// No image loaded (or the source surface has no area).
    NoImage,
    /// A job is already running; it will be superseded.
    Deferred,
    /// A new engine job was started with this token.
    Dispatched(u64),
}

/// Result of one background engine call.
pub struct JobResult {
    token: u64,
    width: u32,
    height: u32,
    outcome: Result<Vec<u8>, EngineError>,
}

/// What happened when a finished job was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// Result painted onto the result surface.
    Painted,
    /// Result belonged to superseded inputs and was dropped.
    Superseded,
    /// Engine or output validation failed; previous result kept.
    Failed,
}

pub struct Dispatcher {
    sender: mpsc::Sender<JobResult>,
    receiver: mpsc::Receiver<JobResult>,
    /// Monotonically-increasing; the last token handed out.
    job_token: u64,
    in_flight: Option<u64>,
    /// Inputs changed while `in_flight` was running.
    dirty: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            job_token: 0,
            in_flight: None,
            dirty: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True once, after a superseded job, when the owner must dispatch again.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Start an engine job for the current inputs, if the preconditions hold.
    ///
    /// `engine` is `Some` only while the engine is ready.  The source
    /// bitmap is read here, so its geometry (not the load-time size) decides
    /// the buffer dimensions.
    pub fn recompute(
        &mut self,
        engine: Option<Arc<dyn EdgeEngine>>,
        has_session: bool,
        source: &Bitmap,
        params: ThresholdParams,
    ) -> RecomputeStatus {
        let Some(engine) = engine else {
            return RecomputeStatus::EngineNotReady;
        };
        if !has_session {
            return RecomputeStatus::NoImage;
        }
        if self.in_flight.is_some() {
            self.dirty = true;
            return RecomputeStatus::Deferred;
        }
        let Some(snapshot) = source.snapshot() else {
            return RecomputeStatus::NoImage;
        };

        self.job_token = self.job_token.wrapping_add(1);
        let token = self.job_token;
        self.in_flight = Some(token);
        self.dirty = false;

        let sender = self.sender.clone();
        rayon::spawn(move || {
            let (width, height) = snapshot.dimensions();
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                engine.detect(snapshot.bytes(), width, height, params.low(), params.high())
            }))
            .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(&*payload))));
            let _ = sender.send(JobResult {
                token,
                width,
                height,
                outcome,
            });
        });
        RecomputeStatus::Dispatched(token)
    }

    /// Non-blocking: the next finished job, if any.
    pub fn poll(&mut self) -> Option<JobResult> {
        self.in_flight?;
        self.receiver.try_recv().ok()
    }

    /// Blocking: wait for the in-flight job.  `None` when idle.
    pub fn wait(&mut self) -> Option<JobResult> {
        self.in_flight?;
        self.receiver.recv().ok()
    }

    /// Apply a finished job: paint it once, or record why not.
    pub fn apply(&mut self, job: JobResult, result: &mut Bitmap, errors: &mut ErrorSlot) -> Applied {
        if self.in_flight != Some(job.token) {
            log_warn!("Discarding result of unknown job {}", job.token);
            return Applied::Superseded;
        }
        self.in_flight = None;

        if self.dirty {
            log_info!("Job {} superseded by newer inputs; result discarded", job.token);
            return Applied::Superseded;
        }

        let bytes = match job.outcome {
            Ok(bytes) => bytes,
            Err(e) => {
                errors.set(PipelineError::EngineInvocationFailed(e.to_string()));
                crate::log_err!("Edge detection job {} failed: {}", job.token, e);
                return Applied::Failed;
            }
        };

        let expected = expected_len(job.width, job.height);
        let Some(buffer) = PixelBuffer::from_raw(job.width, job.height, bytes) else {
            let e = EngineError::InvalidOutput(format!(
                "expected {} bytes for {}x{}",
                expected, job.width, job.height
            ));
            errors.set(PipelineError::EngineInvocationFailed(e.to_string()));
            crate::log_err!("Edge detection job {}: {}", job.token, e);
            return Applied::Failed;
        };

        if !result.paint(buffer) {
            log_warn!(
                "Job {} result is {}x{} but the surface is {}x{}; discarded",
                job.token,
                job.width,
                job.height,
                result.width(),
                result.height()
            );
            return Applied::Superseded;
        }
        errors.clear();
        Applied::Painted
    }
}
