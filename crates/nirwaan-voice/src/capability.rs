//! Platform capability seams.
//!
//! The engine never talks to a microphone or a speaker directly. The embedding
//! application supplies a [`CaptureCapability`] and a [`SynthesisCapability`];
//! their methods return immediately and every outcome is reported later as a
//! [`CaptureEvent`] or [`SynthesisEvent`] that the embedding loop feeds back
//! into the owning session.
//!
//! Each recognition attempt and each utterance carries an id. A session only
//! honours events tagged with the id it is currently waiting on, so events for
//! an attempt that was stopped, or an utterance that was cancelled, are dropped
//! at the session boundary.

use nirwaan_types::{SpeechParams, VoiceOption};
use std::fmt;

/// Identifies one recognition attempt started by a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt-{}", self.0)
    }
}

/// Identifies one utterance handed to the synthesis capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utterance-{}", self.0)
    }
}

/// Platform speech-to-text.
///
/// For every `start` the platform reports exactly one terminal outcome: a
/// final [`CaptureEvent::Result`], a [`CaptureEvent::Error`] or a
/// [`CaptureEvent::Ended`]. Interim results may be reported before it.
pub trait CaptureCapability: Send {
    /// Begins listening. `language` is a BCP 47 tag such as "en-US".
    fn start(&mut self, attempt: AttemptId, language: &str);

    /// Stops listening. Teardown may complete asynchronously.
    fn stop(&mut self, attempt: AttemptId);
}

/// Notifications delivered by a [`CaptureCapability`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Recognized speech, best transcript first.
    Result {
        attempt: AttemptId,
        transcripts: Vec<String>,
        is_final: bool,
    },
    Error {
        attempt: AttemptId,
        reason: String,
    },
    /// Recognition ended without producing a result.
    Ended { attempt: AttemptId },
}

impl CaptureEvent {
    pub fn attempt(&self) -> AttemptId {
        match self {
            Self::Result { attempt, .. }
            | Self::Error { attempt, .. }
            | Self::Ended { attempt } => {
                *attempt
            }
        }
    }
}

/// A fully resolved request to speak.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub params: SpeechParams,
    /// `None` lets the platform use its own default voice.
    pub voice: Option<VoiceOption>,
}

/// Platform text-to-speech.
///
/// The platform is a single output channel. `cancel_all` silences everything
/// it is playing or has queued.
pub trait SynthesisCapability: Send {
    fn speak(&mut self, utterance: &Utterance);

    fn cancel_all(&mut self);

    /// Current voice catalog. May be empty until the platform reports
    /// [`SynthesisEvent::VoicesChanged`].
    fn voices(&self) -> Vec<VoiceOption>;
}

/// Notifications delivered by a [`SynthesisCapability`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    Started(UtteranceId),
    Ended(UtteranceId),
    Failed { id: UtteranceId, reason: String },
    /// The voice catalog changed and must be re-queried.
    VoicesChanged,
}
