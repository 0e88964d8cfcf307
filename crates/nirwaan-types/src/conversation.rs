//! Transcript entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in a conversation transcript.
///
/// Messages are created by the conversation orchestrator for every user
/// utterance and every generated response, and are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque unique token.
    pub id: Uuid,
    pub text: String,
    /// `true` for what the user said, `false` for the companion's reply.
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A message spoken by the user.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    /// A reply produced by the companion.
    pub fn from_companion(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    fn new(text: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            is_user,
            timestamp: Utc::now(),
        }
    }
}
