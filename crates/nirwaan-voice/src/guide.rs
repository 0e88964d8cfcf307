//! Proactive spoken guidance as the user navigates.
//!
//! Each distinct location is greeted at most once, after the location has
//! stayed current for a settle delay. Moving on before the delay elapses
//! cancels the greeting. Returning to a location after visiting another one
//! counts as a fresh location and greets again.

use crate::capability::{SynthesisCapability, SynthesisEvent};
use crate::config::VoiceConfig;
use crate::error::VoiceError;
use crate::schedule::{ScheduledTask, Scheduler, TaskId};
use crate::script::{GuideEntry, GuideScript};
use crate::synthesis::{SpeakOptions, SynthesisSession};
use nirwaan_types::{NavigationContext, SessionState};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// What the presentation layer renders for the guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuideSnapshot {
    pub supported: bool,
    pub enabled: bool,
    pub speaking: bool,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
struct Location {
    key: String,
    context: NavigationContext,
}

/// Remembers which location was last greeted.
#[derive(Debug, Default)]
struct GreetingMemory {
    last_greeted: Option<String>,
}

impl GreetingMemory {
    fn has_greeted(&self, key: &str) -> bool {
        self.last_greeted.as_deref() == Some(key)
    }
}

/// Speaks location greetings and on-demand help through one synthesis
/// session. Timer wake-ups are fed in through [`Self::handle_timer`].
pub struct GuideOrchestrator {
    synthesis: SynthesisSession,
    script: GuideScript,
    scheduler: Scheduler,
    settle_delay: Duration,
    enabled: bool,
    location: Option<Location>,
    memory: GreetingMemory,
    pending_greeting: Option<ScheduledTask>,
}

impl GuideOrchestrator {
    /// Builds an enabled guide and the receiver its greeting timers fire on.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError::Config`] if `config` fails validation and
    /// [`VoiceError::NoRuntime`] if no tokio runtime is running.
    pub fn new(
        config: &VoiceConfig,
        synthesis: Option<Box<dyn SynthesisCapability>>,
        script: GuideScript,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TaskId>), VoiceError> {
        config.validate()?;
        let (scheduler, timer_rx) = Scheduler::new()?;
        let guide = Self {
            synthesis: SynthesisSession::new(synthesis, config.voice_policy(), config.speech),
            script,
            scheduler,
            settle_delay: config.greeting_settle_delay(),
            enabled: true,
            location: None,
            memory: GreetingMemory::default(),
            pending_greeting: None,
        };
        Ok((guide, timer_rx))
    }

    /// Whether a synthesis capability was supplied.
    pub fn is_supported(&self) -> bool {
        self.synthesis.is_supported()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_speaking(&self) -> bool {
        self.synthesis.is_speaking()
    }

    /// `Error` without synthesis, `Speaking` while an utterance plays, else `Idle`.
    pub fn state(&self) -> SessionState {
        if !self.is_supported() {
            SessionState::Error
        } else if self.is_speaking() {
            SessionState::Speaking
        } else {
            SessionState::Idle
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_ref().map(|l| l.key.as_str())
    }

    pub fn snapshot(&self) -> GuideSnapshot {
        GuideSnapshot {
            supported: self.is_supported(),
            enabled: self.enabled,
            speaking: self.is_speaking(),
            location: self.location().map(str::to_string),
        }
    }

    /// Records a navigation and schedules a greeting if this location has
    /// not been greeted yet.
    pub fn on_location_change(&mut self, key: impl Into<String>, context: NavigationContext) {
        let key = key.into();
        if self.location() != Some(key.as_str()) {
            info!(location = %key, "location changed");
            self.pending_greeting = None;
            self.memory = GreetingMemory::default();
        }
        self.location = Some(Location { key, context });
        self.schedule_greeting();
    }

    /// Flips enablement. Disabling silences the guide and drops any pending
    /// greeting; enabling schedules the current location's greeting if it
    /// was never delivered. Returns the new setting.
    pub fn toggle_enabled(&mut self) -> bool {
        self.enabled = !self.enabled;
        info!(enabled = self.enabled, "guide toggled");
        if self.synthesis.is_speaking() {
            self.synthesis.stop();
        }
        if self.enabled {
            self.schedule_greeting();
        } else {
            self.pending_greeting = None;
        }
        self.enabled
    }

    /// Speaks the current location's greeting again.
    ///
    /// Returns `false` without speaking when disabled or already speaking.
    pub fn repeat(&mut self) -> bool {
        if !self.can_speak_on_demand() {
            return false;
        }
        let context = self
            .location
            .as_ref()
            .map(|location| location.context)
            .unwrap_or_default();
        let text = self.current_entry().greeting_for(context).to_string();
        self.synthesis.speak(&text, SpeakOptions::default()).is_some()
    }

    /// Speaks the help text for the current location.
    ///
    /// Returns `false` without speaking when disabled or already speaking.
    pub fn request_help(&mut self) -> bool {
        if !self.can_speak_on_demand() {
            return false;
        }
        let text = self.current_entry().help.clone();
        self.synthesis.speak(&text, SpeakOptions::default()).is_some()
    }

    /// Silences the guide. Enablement is unchanged.
    pub fn stop(&mut self) {
        self.synthesis.stop();
    }

    /// Silences the guide and cancels any pending greeting.
    pub fn shutdown(&mut self) {
        self.pending_greeting = None;
        self.synthesis.stop();
    }

    pub fn handle_synthesis_event(&mut self, event: SynthesisEvent) {
        // The session tracks speaking state; outcomes need no further action.
        let _ = self.synthesis.handle_event(event);
    }

    /// Handles a wake-up from the receiver returned by [`Self::new`].
    pub fn handle_timer(&mut self, task: TaskId) {
        let due = matches!(&self.pending_greeting, Some(pending) if pending.id() == task);
        if !due {
            debug!(?task, "ignoring stale greeting timer");
            return;
        }
        self.pending_greeting = None;

        let Some(location) = self.location.clone() else {
            return;
        };
        if !self.enabled || self.memory.has_greeted(&location.key) {
            return;
        }

        let text = self.script.greeting(&location.key, location.context).to_string();
        info!(location = %location.key, "greeting");
        self.synthesis.speak(&text, SpeakOptions::default());
        self.memory.last_greeted = Some(location.key);
    }

    /// Pushes a due greeting back by another settle delay instead of
    /// speaking it. Used when the embedding application's audio output is
    /// busy. Returns `false` for a stale timer.
    pub fn postpone_greeting(&mut self, task: TaskId) -> bool {
        let due = matches!(&self.pending_greeting, Some(pending) if pending.id() == task);
        if !due {
            return false;
        }
        self.pending_greeting = None;
        debug!(location = ?self.location(), "greeting postponed");
        self.schedule_greeting();
        true
    }

    fn schedule_greeting(&mut self) {
        if !self.enabled || !self.is_supported() || self.pending_greeting.is_some() {
            return;
        }
        let Some(location) = &self.location else {
            return;
        };
        if self.memory.has_greeted(&location.key) {
            debug!(location = %location.key, "already greeted");
            return;
        }
        self.pending_greeting = Some(self.scheduler.schedule(self.settle_delay));
    }

    fn can_speak_on_demand(&self) -> bool {
        self.enabled && !self.synthesis.is_speaking()
    }

    fn current_entry(&self) -> &GuideEntry {
        match &self.location {
            Some(location) => self.script.entry(&location.key),
            None => self.script.fallback(),
        }
    }
}

impl Drop for GuideOrchestrator {
    fn drop(&mut self) {
        self.synthesis.stop();
    }
}

impl std::fmt::Debug for GuideOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuideOrchestrator")
            .field("enabled", &self.enabled)
            .field("location", &self.location())
            .field("last_greeted", &self.memory.last_greeted)
            .field("greeting_pending", &self.pending_greeting.is_some())
            .field("synthesis", &self.synthesis)
            .finish()
    }
}
