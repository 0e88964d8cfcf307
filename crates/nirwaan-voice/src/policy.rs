//! Synthesis voice selection.

use nirwaan_types::VoiceOption;

/// Name markers that tend to identify warm, friendly voices.
pub const DEFAULT_PREFERRED_MARKERS: &[&str] = &["female", "woman", "samantha", "karen", "susan"];

/// Language prefix used when no preferred voice is present.
pub const DEFAULT_LANGUAGE_PREFIX: &str = "en";

/// Picks a synthesis voice from whatever the platform currently offers.
///
/// Priority, first hit wins:
/// 1. the first voice whose display name contains any preferred marker
///    (case-insensitive),
/// 2. the first voice whose language tag starts with the default prefix,
/// 3. the first voice in the catalog.
///
/// An empty catalog yields `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoicePreferencePolicy {
    markers: Vec<String>,
    language_prefix: String,
}

impl Default for VoicePreferencePolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_PREFERRED_MARKERS.iter().copied(),
            DEFAULT_LANGUAGE_PREFIX,
        )
    }
}

impl VoicePreferencePolicy {
    /// Creates a policy preferring voices whose names contain any of `markers`,
    /// then voices whose language tag starts with `language_prefix`.
    pub fn new<I, S>(markers: I, language_prefix: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
            language_prefix: language_prefix.into(),
        }
    }

    /// Picks a voice from `voices`, or `None` if the catalog is empty.
    pub fn select<'a>(&self, voices: &'a [VoiceOption]) -> Option<&'a VoiceOption> {
        voices
            .iter()
            .find(|voice| self.is_preferred(voice))
            .or_else(|| {
                voices
                    .iter()
                    .find(|voice| voice.language_tag.starts_with(&self.language_prefix))
            })
            .or_else(|| voices.first())
    }

    fn is_preferred(&self, voice: &VoiceOption) -> bool {
        let name = voice.display_name.to_lowercase();
        self.markers.iter().any(|marker| name.contains(marker.as_str()))
    }
}
