//! Shared types for the Nirwaan voice companion.
//!
//! This crate holds the plain data that crosses crate boundaries: the
//! conversation transcript, the voice catalog entries reported by the
//! platform, session state exposed to the presentation layer, navigation
//! context, and user-facing notifications.
//!
//! Nothing here performs I/O or owns behaviour. The engine lives in
//! `nirwaan-voice`; the presentation layer only ever reads these values.

pub mod conversation;
pub mod voice;

pub use conversation::Message;
pub use voice::{SpeechParams, VoiceOption};

use serde::{Deserialize, Serialize};

/// Observable state of an orchestrator.
///
/// Exactly one instance exists per orchestrator and only that orchestrator
/// mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing in progress; a new turn may begin.
    #[default]
    Idle,
    /// A recognition attempt is live.
    Listening,
    /// A reply is pending or being spoken.
    Speaking,
    /// The platform cannot support this session at all.
    Error,
}

impl SessionState {
    /// Returns the string label for this state.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Speaking => "speaking",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Optional payload supplied alongside a navigation location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavigationContext {
    /// Set when the user reaches the location for the first time, e.g.
    /// straight after signing up.
    #[serde(default)]
    pub is_first_time: bool,
}

impl NavigationContext {
    /// Context for a first visit.
    pub fn first_visit() -> Self {
        Self {
            is_first_time: true,
        }
    }
}

/// Severity marker attached to a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    /// Rendered as an error toast.
    Destructive,
}

/// A user-facing notification produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }
}
