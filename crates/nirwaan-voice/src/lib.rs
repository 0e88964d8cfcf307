//! Voice interaction engine for the Nirwaan wellness companion.
//!
//! Spoken input is transcribed by a platform capture capability, matched
//! against an ordered keyword rule table to pick a supportive reply, and the
//! reply is read aloud by a platform synthesis capability. A separate guide
//! narrates context-appropriate help as the user moves between locations.
//!
//! ```text
//!  microphone ─► CaptureSession ─► ResponseRuleTable ─► SynthesisSession ─► speaker
//!                     └──────── ConversationOrchestrator ───────┘
//!
//!  navigation ─► GuideScript ─► SynthesisSession ─► speaker
//!                └──── GuideOrchestrator ────┘
//! ```
//!
//! The engine is single-threaded and event driven. Capability methods return
//! immediately; the embedding loop delivers [`CaptureEvent`]s,
//! [`SynthesisEvent`]s and timer wake-ups back to the orchestrators one at a
//! time, and each is processed to completion before the next.
//!
//! Audio is never handled here. Capture and synthesis are supplied by the
//! host through the traits in [`capability`].

pub mod capability;
pub mod capture;
pub mod config;
pub mod conversation;
pub mod error;
pub mod guide;
pub mod notify;
pub mod policy;
pub mod rules;
pub mod schedule;
pub mod script;
pub mod synthesis;

pub use capability::{
    AttemptId, CaptureCapability, CaptureEvent, SynthesisCapability, SynthesisEvent, Utterance,
    UtteranceId,
};
pub use capture::{CaptureOutcome, CaptureSession};
pub use config::{VoiceConfig, VoiceSelectionConfig};
pub use conversation::{ConversationOrchestrator, ConversationSnapshot};
pub use error::{CaptureFailure, SynthesisFailure, VoiceError};
pub use guide::{GuideOrchestrator, GuideSnapshot};
pub use notify::{LogSink, NotificationSink};
pub use policy::VoicePreferencePolicy;
pub use rules::{ResponseRuleTable, RuleEntry};
pub use schedule::TaskId;
pub use script::{GuideEntry, GuideScript};
pub use synthesis::{SpeakOptions, SynthesisOutcome, SynthesisSession};
