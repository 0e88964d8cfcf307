//! Turn-taking voice conversation.
//!
//! One turn: the user presses the capture control, speaks, the recognized
//! text and the rule table's reply are appended to the transcript, and after
//! a short pause the reply is spoken. Capture is refused while a reply is
//! pending or playing so the companion never listens to itself.

use crate::capability::{CaptureCapability, CaptureEvent, SynthesisCapability, SynthesisEvent};
use crate::capture::{CaptureOutcome, CaptureSession};
use crate::config::VoiceConfig;
use crate::error::{CaptureFailure, VoiceError};
use crate::notify::NotificationSink;
use crate::rules::ResponseRuleTable;
use crate::schedule::{ScheduledTask, Scheduler, TaskId};
use crate::synthesis::{SpeakOptions, SynthesisOutcome, SynthesisSession};
use nirwaan_types::{Message, Notification, SessionState, Severity};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// What the presentation layer renders for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSnapshot {
    pub state: SessionState,
    pub supported: bool,
    pub transcript: Vec<Message>,
}

struct PendingReply {
    task: ScheduledTask,
    text: String,
}

/// Drives capture, reply selection and synthesis for one conversation.
///
/// All methods run to completion; platform notifications and timer wake-ups
/// are fed in through the `handle_*` methods by the embedding event loop.
pub struct ConversationOrchestrator {
    capture: CaptureSession,
    synthesis: SynthesisSession,
    rules: ResponseRuleTable,
    notifier: Arc<dyn NotificationSink>,
    scheduler: Scheduler,
    reply_delay: Duration,
    transcript: Vec<Message>,
    state: SessionState,
    pending_reply: Option<PendingReply>,
}

impl ConversationOrchestrator {
    /// Builds an orchestrator and the receiver its reply timers fire on.
    ///
    /// A missing capture capability leaves the orchestrator permanently in
    /// [`SessionState::Error`]; a missing synthesis capability only means
    /// replies are written to the transcript but never spoken.
    ///
    /// # Errors
    ///
    /// Returns [`VoiceError::Config`] if `config` fails validation and
    /// [`VoiceError::NoRuntime`] if no tokio runtime is running.
    pub fn new(
        config: &VoiceConfig,
        capture: Option<Box<dyn CaptureCapability>>,
        synthesis: Option<Box<dyn SynthesisCapability>>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<TaskId>), VoiceError> {
        config.validate()?;
        let (scheduler, timer_rx) = Scheduler::new()?;
        let capture = CaptureSession::new(capture, config.language.clone());
        let synthesis = SynthesisSession::new(synthesis, config.voice_policy(), config.speech);
        let state = if capture.is_supported() {
            SessionState::Idle
        } else {
            SessionState::Error
        };

        let orchestrator = Self {
            capture,
            synthesis,
            rules: config.rule_table()?,
            notifier,
            scheduler,
            reply_delay: config.reply_delay(),
            transcript: Vec::new(),
            state,
            pending_reply: None,
        };
        Ok((orchestrator, timer_rx))
    }

    /// Current turn state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Messages in conversation order.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Whether speech recognition is available.
    pub fn is_supported(&self) -> bool {
        self.capture.is_supported()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            state: self.state,
            supported: self.is_supported(),
            transcript: self.transcript.clone(),
        }
    }

    /// Starts listening for the user's next utterance.
    ///
    /// Returns `true` if capture started. Refused while listening, while a
    /// reply is pending or playing, and when capture is unsupported.
    pub fn begin_turn(&mut self) -> bool {
        match self.state {
            SessionState::Idle => {}
            SessionState::Speaking => {
                debug!("refusing to listen while speaking");
                return false;
            }
            SessionState::Listening | SessionState::Error => return false,
        }

        if !self.capture.start() {
            return false;
        }
        self.state = SessionState::Listening;
        info!("turn begun");
        true
    }

    /// Stops listening without waiting for a result.
    pub fn end_turn(&mut self) {
        if self.state != SessionState::Listening {
            return;
        }
        self.capture.stop();
        self.state = SessionState::Idle;
        info!("turn ended by user");
    }

    /// Silences the reply, including one still waiting out its pause.
    pub fn cancel_speech(&mut self) {
        if self.pending_reply.take().is_some() {
            debug!("pending reply cancelled");
        }
        self.synthesis.stop();
        if self.state == SessionState::Speaking {
            self.state = SessionState::Idle;
        }
    }

    /// Stops everything and cancels outstanding timers.
    pub fn shutdown(&mut self) {
        self.pending_reply = None;
        self.capture.stop();
        self.synthesis.stop();
        if self.state != SessionState::Error {
            self.state = SessionState::Idle;
        }
        info!(messages = self.transcript.len(), "conversation shut down");
    }

    pub fn handle_capture_event(&mut self, event: CaptureEvent) {
        let Some(outcome) = self.capture.handle_event(event) else {
            return;
        };
        match outcome {
            CaptureOutcome::Recognized(text) => self.reply_to(text),
            CaptureOutcome::Failed(failure) => self.capture_failed(failure),
            CaptureOutcome::Ended => {
                if self.state == SessionState::Listening {
                    self.state = SessionState::Idle;
                }
            }
        }
    }

    pub fn handle_synthesis_event(&mut self, event: SynthesisEvent) {
        match self.synthesis.handle_event(event) {
            Some(SynthesisOutcome::Finished(_)) | Some(SynthesisOutcome::Failed(..)) => {
                if self.pending_reply.is_none() && self.state == SessionState::Speaking {
                    self.state = SessionState::Idle;
                }
            }
            Some(SynthesisOutcome::Started(_)) | None => {}
        }
    }

    /// Handles a wake-up from the receiver returned by [`Self::new`].
    pub fn handle_timer(&mut self, task: TaskId) {
        let due = matches!(&self.pending_reply, Some(pending) if pending.task.id() == task);
        if !due {
            debug!(?task, "ignoring stale reply timer");
            return;
        }
        let Some(PendingReply { text, .. }) = self.pending_reply.take() else {
            return;
        };

        if self.synthesis.speak(&text, SpeakOptions::default()).is_none() {
            self.state = SessionState::Idle;
        }
    }

    fn reply_to(&mut self, text: String) {
        let rule = self.rules.matching_rule(&text);
        let reply = self.rules.respond(&text).to_string();
        info!(?rule, "replying to user");

        self.transcript.push(Message::from_user(text));
        self.transcript.push(Message::from_companion(reply.clone()));

        if !self.synthesis.is_supported() {
            self.state = SessionState::Idle;
            return;
        }
        let task = self.scheduler.schedule(self.reply_delay);
        self.pending_reply = Some(PendingReply { task, text: reply });
        self.state = SessionState::Speaking;
    }

    fn capture_failed(&mut self, failure: CaptureFailure) {
        warn!(%failure, "capture failed");
        self.state = SessionState::Idle;
        self.notifier.notify(Notification::new(
            "Speech Recognition Error",
            "Please try speaking again.",
            Severity::Destructive,
        ));
    }
}

impl Drop for ConversationOrchestrator {
    fn drop(&mut self) {
        self.capture.stop();
        self.synthesis.stop();
    }
}

impl std::fmt::Debug for ConversationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationOrchestrator")
            .field("state", &self.state)
            .field("capture", &self.capture)
            .field("synthesis", &self.synthesis)
            .field("transcript", &self.transcript.len())
            .field("reply_pending", &self.pending_reply.is_some())
            .finish()
    }
}
