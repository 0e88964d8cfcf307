//! Recognition session wrapping the platform capture capability.
//!
//! ```text
//! Idle --start()--> Listening --final result--> Idle   (text, once)
//!                             --error---------> Idle   (failure)
//!                             --ended---------> Idle   (nothing)
//!                             --stop()--------> Idle   (nothing)
//! ```

use crate::capability::{AttemptId, CaptureCapability, CaptureEvent};
use crate::error::CaptureFailure;
use tracing::{debug, info, warn};

/// What a capture session reports once an attempt finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Recognized(String),
    Failed(CaptureFailure),
    /// The platform ended the attempt without a result.
    Ended,
}

/// Owns at most one live recognition attempt.
pub struct CaptureSession {
    capability: Option<Box<dyn CaptureCapability>>,
    language: String,
    active: Option<AttemptId>,
    next_attempt: u64,
}

impl CaptureSession {
    /// Wraps `capability`. `None` means the platform has no speech
    /// recognition; the session then reports itself unsupported and every
    /// `start` is a no-op.
    pub fn new(
        capability: Option<Box<dyn CaptureCapability>>,
        language: impl Into<String>,
    ) -> Self {
        if capability.is_none() {
            warn!("speech recognition is not supported on this platform");
        }
        Self {
            capability,
            language: language.into(),
            active: None,
            next_attempt: 1,
        }
    }

    /// Whether a recognition capability was supplied.
    pub fn is_supported(&self) -> bool {
        self.capability.is_some()
    }

    /// Whether an attempt is in progress.
    pub fn is_listening(&self) -> bool {
        self.active.is_some()
    }

    /// The attempt currently in flight, if any.
    pub fn active_attempt(&self) -> Option<AttemptId> {
        self.active
    }

    /// Starts a recognition attempt.
    ///
    /// Returns `true` only if a new attempt was started. Starting while
    /// already listening, or without a capability, does nothing.
    pub fn start(&mut self) -> bool {
        let Some(capability) = self.capability.as_mut() else {
            return false;
        };
        if let Some(attempt) = self.active {
            debug!(%attempt, "capture already listening, ignoring start");
            return false;
        }

        let attempt = AttemptId(self.next_attempt);
        self.next_attempt += 1;
        self.active = Some(attempt);
        info!(%attempt, language = %self.language, "capture started");
        capability.start(attempt, &self.language);
        true
    }

    /// Stops the live attempt. Its eventual result, if any, is discarded.
    pub fn stop(&mut self) {
        let Some(attempt) = self.active.take() else {
            return;
        };
        info!(%attempt, "capture stopped");
        if let Some(capability) = self.capability.as_mut() {
            capability.stop(attempt);
        }
    }

    /// Applies a platform notification.
    ///
    /// Returns an outcome only for the terminal event of the live attempt.
    /// Interim results and events for any other attempt are ignored.
    pub fn handle_event(&mut self, event: CaptureEvent) -> Option<CaptureOutcome> {
        let attempt = event.attempt();
        if self.active != Some(attempt) {
            debug!(%attempt, "ignoring capture event for inactive attempt");
            return None;
        }

        let outcome = match event {
            CaptureEvent::Result {
                is_final: false, ..
            } => {
                debug!(%attempt, "ignoring interim capture result");
                return None;
            }
            CaptureEvent::Result { transcripts, .. } => {
                match transcripts.into_iter().next().map(|t| t.trim().to_string()) {
                    Some(text) if !text.is_empty() => {
                        info!(%attempt, chars = text.len(), "speech recognized");
                        CaptureOutcome::Recognized(text)
                    }
                    _ => {
                        warn!(%attempt, "recognition finished without a transcript");
                        CaptureOutcome::Failed(CaptureFailure::NoSpeech)
                    }
                }
            }
            CaptureEvent::Error { reason, .. } => {
                warn!(%attempt, %reason, "speech recognition error");
                CaptureOutcome::Failed(CaptureFailure::Platform(reason))
            }
            CaptureEvent::Ended { .. } => {
                debug!(%attempt, "capture ended without result");
                CaptureOutcome::Ended
            }
        };

        self.active = None;
        Some(outcome)
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("supported", &self.is_supported())
            .field("language", &self.language)
            .field("active", &self.active)
            .finish()
    }
}
