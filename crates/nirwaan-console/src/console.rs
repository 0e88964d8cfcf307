//! Terminal stand-ins for the platform capture and synthesis capabilities.
//!
//! Typed lines play the role of recognized speech and spoken replies are
//! printed. Speaking takes simulated time so that cancellation and the
//! "no listening while speaking" rule behave as they would with audio.

use nirwaan_types::{SessionState, VoiceOption};
use nirwaan_voice::{
    AttemptId, CaptureCapability, CaptureEvent, ConversationOrchestrator, GuideOrchestrator,
    SynthesisCapability, SynthesisEvent, TaskId, Utterance,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Capture capability fed from stdin.
#[derive(Debug, Clone)]
pub struct ConsoleMicrophone {
    active: Arc<Mutex<Option<AttemptId>>>,
    events: mpsc::UnboundedSender<CaptureEvent>,
}

impl ConsoleMicrophone {
    pub fn new(events: mpsc::UnboundedSender<CaptureEvent>) -> Self {
        Self {
            active: Arc::new(Mutex::new(None)),
            events,
        }
    }

    /// Reports `line` as the final result of the live attempt.
    ///
    /// Returns `false` if nothing is listening.
    pub fn hear(&self, line: &str) -> bool {
        let attempt = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(attempt) = attempt else {
            return false;
        };
        let transcripts = if line.trim().is_empty() {
            Vec::new()
        } else {
            vec![line.to_string()]
        };
        self.events
            .send(CaptureEvent::Result {
                attempt,
                transcripts,
                is_final: true,
            })
            .is_ok()
    }
}

impl CaptureCapability for ConsoleMicrophone {
    fn start(&mut self, attempt: AttemptId, language: &str) {
        debug!(%attempt, language, "console microphone open");
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = Some(attempt);
    }

    fn stop(&mut self, attempt: AttemptId) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if *active == Some(attempt) {
            *active = None;
            let _ = self.events.send(CaptureEvent::Ended { attempt });
        }
    }
}

/// Voices the console pretends the platform offers.
pub fn console_voices() -> Vec<VoiceOption> {
    vec![
        VoiceOption::new("Daniel", "en-GB"),
        VoiceOption::new("Samantha", "en-US"),
        VoiceOption::new("Amelie", "fr-CA"),
    ]
}

/// How long `text` takes to say at `words_per_minute`, scaled by `rate`.
pub fn speaking_time(text: &str, words_per_minute: u32, rate: f32) -> Duration {
    let words = text.split_whitespace().count().max(1) as f64;
    let per_minute = f64::from(words_per_minute.max(1)) * f64::from(rate.max(0.1));
    Duration::from_secs_f64(words * 60.0 / per_minute)
}

/// Synthesis capability that prints utterances.
#[derive(Debug)]
pub struct ConsoleSpeaker {
    label: &'static str,
    events: mpsc::UnboundedSender<SynthesisEvent>,
    words_per_minute: u32,
    playing: Option<JoinHandle<()>>,
}

impl ConsoleSpeaker {
    pub fn new(
        label: &'static str,
        events: mpsc::UnboundedSender<SynthesisEvent>,
        words_per_minute: u32,
    ) -> Self {
        Self {
            label,
            events,
            words_per_minute,
            playing: None,
        }
    }
}

impl SynthesisCapability for ConsoleSpeaker {
    fn speak(&mut self, utterance: &Utterance) {
        self.cancel_all();

        let voice = utterance
            .voice
            .as_ref()
            .map(|v| v.display_name.as_str())
            .unwrap_or("default voice");
        println!("[{} · {}] {}", self.label, voice, utterance.text);

        let id = utterance.id;
        let events = self.events.clone();
        let duration = speaking_time(&utterance.text, self.words_per_minute, utterance.params.rate);
        self.playing = Some(tokio::spawn(async move {
            let _ = events.send(SynthesisEvent::Started(id));
            tokio::time::sleep(duration).await;
            let _ = events.send(SynthesisEvent::Ended(id));
        }));
    }

    fn cancel_all(&mut self) {
        if let Some(playing) = self.playing.take() {
            playing.abort();
        }
    }

    fn voices(&self) -> Vec<VoiceOption> {
        console_voices()
    }
}

impl Drop for ConsoleSpeaker {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

// The companion and the guide share one audio output. The companion's turn
// takes precedence: the guide falls silent when the user starts talking or a
// reply is spoken, and its greetings wait until the turn is over.

fn companion_busy(conversation: &ConversationOrchestrator) -> bool {
    matches!(conversation.state(), SessionState::Listening | SessionState::Speaking)
}

/// Starts a conversation turn, silencing the guide so the companion does not
/// hear it. Returns `false` if the conversation refused the turn.
pub fn start_listening(
    conversation: &mut ConversationOrchestrator,
    guide: &mut GuideOrchestrator,
) -> bool {
    if conversation.state() != SessionState::Idle {
        return false;
    }
    guide.stop();
    conversation.begin_turn()
}

/// Speaks a due reply after taking the output from the guide.
pub fn deliver_reply(
    conversation: &mut ConversationOrchestrator,
    guide: &mut GuideOrchestrator,
    task: TaskId,
) {
    guide.stop();
    conversation.handle_timer(task);
}

/// Speaks a due greeting, or postpones it while the companion holds the
/// output. Returns `true` if the greeting timer was handed to the guide.
pub fn deliver_greeting(
    conversation: &ConversationOrchestrator,
    guide: &mut GuideOrchestrator,
    task: TaskId,
) -> bool {
    if companion_busy(conversation) && guide.postpone_greeting(task) {
        return false;
    }
    guide.handle_timer(task);
    true
}

/// An on-demand request to the guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideRequest {
    Repeat,
    Help,
}

/// Asks the guide to speak, or explains why it will not.
pub fn ask_guide(
    conversation: &ConversationOrchestrator,
    guide: &mut GuideOrchestrator,
    request: GuideRequest,
) -> Result<(), &'static str> {
    if !guide.is_supported() {
        return Err("speech output is not available");
    }
    if !guide.is_enabled() {
        return Err("the guide is off");
    }
    if guide.is_speaking() {
        return Err("the guide is speaking");
    }
    if companion_busy(conversation) {
        return Err("the companion is talking with you");
    }
    let spoke = match request {
        GuideRequest::Repeat => guide.repeat(),
        GuideRequest::Help => guide.request_help(),
    };
    if spoke {
        Ok(())
    } else {
        Err("the guide has nothing to say")
    }
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: say it to the companion.
    Say(String),
    Go { location: String, first_visit: bool },
    ToggleGuide,
    Repeat,
    Help,
    Stop,
    Transcript,
    Quit,
    Usage,
    Unknown(String),
    Empty,
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Say(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match (name, arg) {
        ("go", location) if !location.is_empty() => Command::Go {
            location: location.to_string(),
            first_visit: false,
        },
        ("first", location) if !location.is_empty() => Command::Go {
            location: location.to_string(),
            first_visit: true,
        },
        ("toggle", "") => Command::ToggleGuide,
        ("repeat", "") => Command::Repeat,
        ("help", "") => Command::Help,
        ("stop", "") => Command::Stop,
        ("transcript", "") => Command::Transcript,
        ("quit", "") | ("q", "") => Command::Quit,
        ("?", "") | ("usage", "") => Command::Usage,
        _ => Command::Unknown(line.to_string()),
    }
}

pub const USAGE: &str = "\
Type anything to talk to the companion.
  :go <location>     navigate (e.g. :go /app)
  :first <location>  navigate as a first-time visitor
  :repeat            guide repeats its message
  :help              guide explains the current page
  :toggle            turn the guide on or off
  :stop              silence all speech
  :transcript        print the conversation as JSON
  :quit              leave";
