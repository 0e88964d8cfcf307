//! Voice catalog entries and utterance parameters.
//!
//! A `VoiceOption` is whatever the platform synthesis capability reports in
//! its catalog. The engine never owns the catalog; it re-queries it each time
//! the platform says it changed.

use serde::{Deserialize, Serialize};

/// One voice offered by the platform synthesis capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceOption {
    /// Human-readable voice name, e.g. "Samantha".
    pub display_name: String,
    /// BCP 47 language tag, e.g. "en-US".
    pub language_tag: String,
}

impl VoiceOption {
    pub fn new(display_name: impl Into<String>, language_tag: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            language_tag: language_tag.into(),
        }
    }
}

/// Rate, pitch and volume applied to a single utterance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechParams {
    /// Speaking rate multiplier (1.0 is normal).
    #[serde(default = "default_rate")]
    pub rate: f32,
    /// Pitch factor (1.0 is normal).
    #[serde(default = "default_pitch")]
    pub pitch: f32,
    /// Output volume in `0.0..=1.0`.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_rate() -> f32 {
    0.9
}

fn default_pitch() -> f32 {
    1.0
}

fn default_volume() -> f32 {
    0.8
}

impl Default for SpeechParams {
    /// The calming preset: slightly slow, neutral pitch, softened volume.
    fn default() -> Self {
        Self {
            rate: default_rate(),
            pitch: default_pitch(),
            volume: default_volume(),
        }
    }
}
