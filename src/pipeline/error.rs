// ============================================================================
// PIPELINE ERRORS — taxonomy and the single user-visible error slot
// ============================================================================

use super::source::ImageError;

/// Every failure the pipeline surfaces to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Engine never became ready.  Disables recompute for the session.
    EngineLoadFailed(String),
    /// The offered file could not be read or decoded.
    ImageDecodeFailed(ImageError),
    /// The engine call (or interpreting its output) failed.
    EngineInvocationFailed(String),
}

impl PipelineError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::EngineLoadFailed(_))
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::EngineLoadFailed(e) => write!(f, "{}", e),
            PipelineError::ImageDecodeFailed(e) => write!(f, "{}", e),
            PipelineError::EngineInvocationFailed(e) => write!(f, "Edge detection failed: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ImageError> for PipelineError {
    fn from(e: ImageError) -> Self {
        PipelineError::ImageDecodeFailed(e)
    }
}

/// Latest-wins error slot.
///
/// A fatal error (engine load failure) is remembered separately: clearing
/// the slot after a later successful operation falls back to it, since
/// recompute stays disabled for the rest of the session.
#[derive(Debug, Default)]
pub struct ErrorSlot {
    latest: Option<PipelineError>,
    fatal: Option<PipelineError>,
}

impl ErrorSlot {
    pub fn set(&mut self, error: PipelineError) {
        if error.is_fatal() && self.fatal.is_none() {
            self.fatal = Some(error.clone());
        }
        self.latest = Some(error);
    }

    /// Called after a successful operation.
    pub fn clear(&mut self) {
        self.latest = None;
    }

    pub fn current(&self) -> Option<&PipelineError> {
        self.latest.as_ref().or(self.fatal.as_ref())
    }

    pub fn message(&self) -> Option<String> {
        self.current().map(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_error_wins() {
        let mut slot = ErrorSlot::default();
        slot.set(PipelineError::EngineInvocationFailed("first".into()));
        slot.set(PipelineError::ImageDecodeFailed(ImageError::EmptyImage));
        assert_eq!(slot.current(), Some(&PipelineError::ImageDecodeFailed(ImageError::EmptyImage)));
    }

    #[test]
    fn clear_removes_recoverable_errors() {
        let mut slot = ErrorSlot::default();
        slot.set(PipelineError::EngineInvocationFailed("boom".into()));
        slot.clear();
        assert!(slot.current().is_none());
    }

    #[test]
    fn fatal_error_survives_clear() {
        let mut slot = ErrorSlot::default();
        slot.set(PipelineError::EngineLoadFailed("missing".into()));
        slot.set(PipelineError::ImageDecodeFailed(ImageError::EmptyImage));
        slot.clear();
        assert!(slot.current().unwrap().is_fatal());
        assert!(slot.message().unwrap().contains("missing"));
    }
}
