//! Nirwaan console: drives the voice companion and the page guide from a
//! terminal.
//!
//! Typed lines stand in for recognized speech and replies are printed as
//! they are spoken. Logs go to stderr so they do not interleave with the
//! conversation on stdout.

mod config;
mod console;

use console::{
    ask_guide, deliver_greeting, deliver_reply, parse_command, start_listening, Command,
    ConsoleMicrophone, ConsoleSpeaker, GuideRequest, USAGE,
};
use nirwaan_types::{NavigationContext, Notification, SessionState};
use nirwaan_voice::{
    CaptureCapability, ConversationOrchestrator, GuideOrchestrator, GuideScript,
    SynthesisCapability,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("NIRWAAN_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

fn print_notification(notification: &Notification) {
    println!(
        "[{:?}] {}: {}",
        notification.severity, notification.title, notification.description
    );
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("nirwaan.toml"));

    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration; the console cannot start without valid config");

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("warn"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let (capture_tx, mut capture_rx) = mpsc::unbounded_channel();
    let (chat_voice_tx, mut chat_voice_rx) = mpsc::unbounded_channel();
    let (guide_voice_tx, mut guide_voice_rx) = mpsc::unbounded_channel();
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<Notification>();

    let microphone = ConsoleMicrophone::new(capture_tx);
    let capture: Option<Box<dyn CaptureCapability>> = config
        .console
        .capture
        .then(|| Box::new(microphone.clone()) as Box<dyn CaptureCapability>);
    let (chat_speaker, guide_speaker): (
        Option<Box<dyn SynthesisCapability>>,
        Option<Box<dyn SynthesisCapability>>,
    ) = if config.console.synthesis {
        let wpm = config.console.words_per_minute;
        (
            Some(Box::new(ConsoleSpeaker::new("companion", chat_voice_tx, wpm))),
            Some(Box::new(ConsoleSpeaker::new("guide", guide_voice_tx, wpm))),
        )
    } else {
        (None, None)
    };

    let (mut conversation, mut reply_timers) =
        ConversationOrchestrator::new(&config.voice, capture, chat_speaker, Arc::new(notify_tx))
            .expect("conversation settings were validated at load");
    let (mut guide, mut greeting_timers) =
        GuideOrchestrator::new(&config.voice, guide_speaker, GuideScript::default())
            .expect("guide settings were validated at load");

    tracing::info!(
        capture = conversation.is_supported(),
        synthesis = guide.is_supported(),
        "console ready"
    );
    if conversation.state() == SessionState::Error {
        println!("Speech recognition is not available; the companion cannot listen.");
    }
    println!("{USAGE}");

    guide.on_location_change(
        config.console.start_location.clone(),
        NavigationContext::default(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(err) => {
                        tracing::error!(error = %err, "failed to read stdin");
                        break;
                    }
                };
                match parse_command(&line) {
                    Command::Say(text) => {
                        if start_listening(&mut conversation, &mut guide) {
                            microphone.hear(&text);
                        } else {
                            println!(
                                "(the companion is {}; try again shortly or :stop)",
                                conversation.state()
                            );
                        }
                    }
                    Command::Go { location, first_visit } => {
                        let context = NavigationContext { is_first_time: first_visit };
                        guide.on_location_change(location, context);
                    }
                    Command::ToggleGuide => {
                        let enabled = guide.toggle_enabled();
                        println!("(guide {})", if enabled { "on" } else { "off" });
                    }
                    Command::Repeat => {
                        let asked = ask_guide(&conversation, &mut guide, GuideRequest::Repeat);
                        if let Err(reason) = asked {
                            println!("({reason})");
                        }
                    }
                    Command::Help => {
                        let asked = ask_guide(&conversation, &mut guide, GuideRequest::Help);
                        if let Err(reason) = asked {
                            println!("({reason})");
                        }
                    }
                    Command::Stop => {
                        conversation.cancel_speech();
                        guide.stop();
                    }
                    Command::Transcript => {
                        match serde_json::to_string_pretty(&conversation.snapshot()) {
                            Ok(json) => println!("{json}"),
                            Err(err) => {
                                tracing::error!(error = %err, "failed to serialize transcript")
                            }
                        }
                    }
                    Command::Usage => println!("{USAGE}"),
                    Command::Unknown(input) => {
                        println!("unknown command {input:?}; type :? for help")
                    }
                    Command::Quit => break,
                    Command::Empty => {}
                }
            }
            Some(event) = capture_rx.recv() => conversation.handle_capture_event(event),
            Some(event) = chat_voice_rx.recv() => conversation.handle_synthesis_event(event),
            Some(task) = reply_timers.recv() => deliver_reply(&mut conversation, &mut guide, task),
            Some(event) = guide_voice_rx.recv() => guide.handle_synthesis_event(event),
            Some(task) = greeting_timers.recv() => {
                deliver_greeting(&conversation, &mut guide, task);
            }
            Some(notification) = notify_rx.recv() => print_notification(&notification),
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, shutting down");
                break;
            }
        }
    }

    conversation.shutdown();
    guide.shutdown();
    tracing::info!("console stopped");
}
