//! Speech session wrapping the platform synthesis capability.
//!
//! There is no queue. A new `speak` cancels whatever is playing and the
//! cancelled utterance never reports an end. `stop` returns the session to
//! idle at once and likewise silences the cancelled utterance's end.

use crate::capability::{SynthesisCapability, SynthesisEvent, Utterance, UtteranceId};
use crate::error::SynthesisFailure;
use crate::policy::VoicePreferencePolicy;
use nirwaan_types::{SpeechParams, VoiceOption};
use tracing::{debug, info, warn};

/// Per-call overrides for [`SynthesisSession::speak`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakOptions {
    /// Display name of a voice to use instead of the policy's choice.
    /// Ignored when the catalog has no voice by that name.
    pub voice: Option<String>,
    pub params: Option<SpeechParams>,
}

impl SpeakOptions {
    pub fn with_voice(voice: impl Into<String>) -> Self {
        Self {
            voice: Some(voice.into()),
            params: None,
        }
    }
}

/// Lifecycle notifications for the live utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    Started(UtteranceId),
    Finished(UtteranceId),
    Failed(UtteranceId, SynthesisFailure),
}

/// Owns at most one live utterance.
pub struct SynthesisSession {
    capability: Option<Box<dyn SynthesisCapability>>,
    policy: VoicePreferencePolicy,
    params: SpeechParams,
    voices: Vec<VoiceOption>,
    current: Option<UtteranceId>,
    next_utterance: u64,
}

impl SynthesisSession {
    /// Wraps `capability`. `None` means the platform cannot speak; `speak`
    /// and `stop` then do nothing and the session never reports speaking.
    pub fn new(
        capability: Option<Box<dyn SynthesisCapability>>,
        policy: VoicePreferencePolicy,
        params: SpeechParams,
    ) -> Self {
        let voices = match capability.as_ref() {
            Some(capability) => capability.voices(),
            None => {
                warn!("speech synthesis is not supported on this platform");
                Vec::new()
            }
        };
        Self {
            capability,
            policy,
            params,
            voices,
            current: None,
            next_utterance: 1,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.capability.is_some()
    }

    pub fn is_speaking(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_utterance(&self) -> Option<UtteranceId> {
        self.current
    }

    /// Voices reported by the platform the last time the catalog was read.
    pub fn voices(&self) -> &[VoiceOption] {
        &self.voices
    }

    /// The voice the preference policy picks from the current catalog.
    pub fn preferred_voice(&self) -> Option<&VoiceOption> {
        self.policy.select(&self.voices)
    }

    /// Speaks `text`, cancelling any utterance in progress.
    ///
    /// Returns the new utterance id, or `None` when nothing was spoken
    /// because synthesis is unsupported or `text` is blank.
    pub fn speak(&mut self, text: &str, options: SpeakOptions) -> Option<UtteranceId> {
        if text.trim().is_empty() {
            debug!("ignoring request to speak blank text");
            return None;
        }
        self.capability.as_ref()?;

        let voice = self.resolve_voice(options.voice.as_deref()).cloned();
        let params = options.params.unwrap_or(self.params);
        let id = UtteranceId(self.next_utterance);
        self.next_utterance += 1;

        let utterance = Utterance {
            id,
            text: text.to_string(),
            params,
            voice,
        };

        let capability = self.capability.as_mut()?;
        if let Some(previous) = self.current.replace(id) {
            info!(%previous, utterance = %id, "cancelling utterance in favour of new speech");
        }
        capability.cancel_all();
        let voice_name = utterance
            .voice
            .as_ref()
            .map(|v| v.display_name.as_str())
            .unwrap_or("<platform default>");
        info!(utterance = %id, voice = voice_name, "speaking");
        capability.speak(&utterance);
        Some(id)
    }

    /// Silences the live utterance. Its end notification is suppressed.
    pub fn stop(&mut self) {
        let Some(utterance) = self.current.take() else {
            return;
        };
        info!(%utterance, "speech stopped");
        if let Some(capability) = self.capability.as_mut() {
            capability.cancel_all();
        }
    }

    /// Applies a platform notification.
    ///
    /// Only the live utterance produces outcomes; notifications for cancelled
    /// utterances are dropped. A catalog change refreshes the cached voices.
    pub fn handle_event(&mut self, event: SynthesisEvent) -> Option<SynthesisOutcome> {
        match event {
            SynthesisEvent::VoicesChanged => {
                self.refresh_voices();
                None
            }
            SynthesisEvent::Started(id) if self.current == Some(id) => {
                debug!(utterance = %id, "utterance started");
                Some(SynthesisOutcome::Started(id))
            }
            SynthesisEvent::Ended(id) if self.current == Some(id) => {
                self.current = None;
                info!(utterance = %id, "utterance finished");
                Some(SynthesisOutcome::Finished(id))
            }
            SynthesisEvent::Failed { id, reason } if self.current == Some(id) => {
                self.current = None;
                warn!(utterance = %id, %reason, "utterance failed");
                Some(SynthesisOutcome::Failed(id, SynthesisFailure::Platform(reason)))
            }
            SynthesisEvent::Started(id)
            | SynthesisEvent::Ended(id)
            | SynthesisEvent::Failed { id, .. } => {
                debug!(utterance = %id, "ignoring event for cancelled utterance");
                None
            }
        }
    }

    fn refresh_voices(&mut self) {
        if let Some(capability) = self.capability.as_ref() {
            self.voices = capability.voices();
            debug!(
                count = self.voices.len(),
                preferred = self.preferred_voice().map(|v| v.display_name.as_str()),
                "voice catalog refreshed"
            );
        }
    }

    fn resolve_voice(&self, hint: Option<&str>) -> Option<&VoiceOption> {
        hint.and_then(|name| {
            self.voices
                .iter()
                .find(|voice| voice.display_name.eq_ignore_ascii_case(name))
        })
        .or_else(|| self.preferred_voice())
    }
}

impl std::fmt::Debug for SynthesisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisSession")
            .field("supported", &self.is_supported())
            .field("params", &self.params)
            .field("voices", &self.voices.len())
            .field("current", &self.current)
            .finish()
    }
}
