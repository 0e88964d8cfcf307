use thiserror::Error;

/// Errors raised while building the engine from configuration.
///
/// Runtime failures never surface as `VoiceError`; they are normalized into
/// [`CaptureFailure`] or [`SynthesisFailure`] at the session boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoiceError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("no tokio runtime is running; the engine's timers need one")]
    NoRuntime,
}

/// Why a recognition attempt produced no usable text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureFailure {
    #[error("speech recognition failed: {0}")]
    Platform(String),

    #[error("no speech was recognized")]
    NoSpeech,
}

/// Why an utterance failed to play.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisFailure {
    #[error("speech synthesis failed: {0}")]
    Platform(String),
}
