use crate::error::VoiceError;
use crate::policy::{VoicePreferencePolicy, DEFAULT_LANGUAGE_PREFIX, DEFAULT_PREFERRED_MARKERS};
use crate::rules::{builtin_rules, ResponseRuleTable, RuleEntry, DEFAULT_FALLBACK};
use nirwaan_types::SpeechParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_language() -> String {
    "en-US".to_string()
}

fn default_reply_delay_ms() -> u64 {
    500
}

fn default_greeting_settle_ms() -> u64 {
    1000
}

fn default_preferred_markers() -> Vec<String> {
    DEFAULT_PREFERRED_MARKERS.iter().map(|m| m.to_string()).collect()
}

fn default_language_prefix() -> String {
    DEFAULT_LANGUAGE_PREFIX.to_string()
}

/// Engine configuration. Every field has a default, so an empty table is
/// a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Recognition language handed to the capture capability.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub voice: VoiceSelectionConfig,

    /// Utterance parameters used unless a call overrides them.
    #[serde(default)]
    pub speech: SpeechParams,

    /// Pause between appending a reply to the transcript and speaking it.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// How long a location must stay current before the guide greets.
    #[serde(default = "default_greeting_settle_ms")]
    pub greeting_settle_ms: u64,

    /// Replaces the built-in rule table when set.
    #[serde(default)]
    pub rules: Option<Vec<RuleEntry>>,

    /// Replaces the built-in fallback reply when set.
    #[serde(default)]
    pub fallback: Option<String>,
}

/// Inputs to the voice preference policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSelectionConfig {
    #[serde(default = "default_preferred_markers")]
    pub preferred_markers: Vec<String>,

    #[serde(default = "default_language_prefix")]
    pub default_language_prefix: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            voice: VoiceSelectionConfig::default(),
            speech: SpeechParams::default(),
            reply_delay_ms: default_reply_delay_ms(),
            greeting_settle_ms: default_greeting_settle_ms(),
            rules: None,
            fallback: None,
        }
    }
}

impl Default for VoiceSelectionConfig {
    fn default() -> Self {
        Self {
            preferred_markers: default_preferred_markers(),
            default_language_prefix: default_language_prefix(),
        }
    }
}

impl VoiceConfig {
    /// Checks value ranges and builds the rule table once to surface rule
    /// errors early.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), VoiceError> {
        if self.language.trim().is_empty() {
            return Err(VoiceError::Config("language must not be empty".to_string()));
        }

        let SpeechParams {
            rate,
            pitch,
            volume,
        } = self.speech;
        if !(0.1..=10.0).contains(&rate) {
            return Err(VoiceError::Config(
                "speech rate must be between 0.1 and 10.0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&pitch) {
            return Err(VoiceError::Config(
                "speech pitch must be between 0.0 and 2.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&volume) {
            return Err(VoiceError::Config(
                "speech volume must be between 0.0 and 1.0".to_string(),
            ));
        }

        self.rule_table().map(|_| ())
    }

    /// Builds the response rule table, applying any overrides.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError::Config`] if the overriding rules are invalid.
    pub fn rule_table(&self) -> Result<ResponseRuleTable, VoiceError> {
        if self.rules.is_none() && self.fallback.is_none() {
            return Ok(ResponseRuleTable::default());
        }
        let rules = self.rules.clone().unwrap_or_else(builtin_rules);
        let fallback = self
            .fallback
            .clone()
            .unwrap_or_else(|| DEFAULT_FALLBACK.to_string());
        ResponseRuleTable::new(rules, fallback)
    }

    pub fn voice_policy(&self) -> VoicePreferencePolicy {
        VoicePreferencePolicy::new(
            &self.voice.preferred_markers,
            self.voice.default_language_prefix.clone(),
        )
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn greeting_settle_delay(&self) -> Duration {
        Duration::from_millis(self.greeting_settle_ms)
    }
}
