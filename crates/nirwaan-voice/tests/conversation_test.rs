mod common;

use common::{FakeCapture, FakeSynthesis};
use nirwaan_types::{Notification, SessionState, Severity, VoiceOption};
use nirwaan_voice::{
    CaptureEvent, ConversationOrchestrator, NotificationSink, ResponseRuleTable, SynthesisEvent,
    TaskId, VoiceConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct Harness {
    orchestrator: ConversationOrchestrator,
    timers: mpsc::UnboundedReceiver<TaskId>,
    notifications: mpsc::UnboundedReceiver<Notification>,
    capture: FakeCapture,
    synthesis: FakeSynthesis,
}

fn harness() -> Harness {
    let capture = FakeCapture::default();
    let synthesis = FakeSynthesis::default();
    let (notify_tx, notifications) = mpsc::unbounded_channel();
    let sink: Arc<dyn NotificationSink> = Arc::new(notify_tx);
    let (orchestrator, timers) = ConversationOrchestrator::new(
        &VoiceConfig::default(),
        Some(Box::new(capture.clone())),
        Some(Box::new(synthesis.clone())),
        sink,
    )
    .expect("default config is valid");
    Harness {
        orchestrator,
        timers,
        notifications,
        capture,
        synthesis,
    }
}

#[tokio::test(start_paused = true)]
async fn anxious_utterance_is_transcribed_then_answered_aloud() {
    let mut h = harness();
    let expected = ResponseRuleTable::default()
        .respond("I feel anxious about exams")
        .to_string();

    assert!(h.orchestrator.begin_turn());
    assert_eq!(h.orchestrator.state(), SessionState::Listening);

    let event = h.capture.heard("I feel anxious about exams");
    h.orchestrator.handle_capture_event(event);

    let transcript = h.orchestrator.transcript();
    assert_eq!(transcript.len(), 2);
    assert!(transcript[0].is_user);
    assert_eq!(transcript[0].text, "I feel anxious about exams");
    assert!(!transcript[1].is_user);
    assert_eq!(transcript[1].text, expected);
    assert!(transcript[0].timestamp <= transcript[1].timestamp);

    // Nothing is spoken until the reply pause elapses.
    assert!(h.synthesis.spoken_texts().is_empty());
    assert_eq!(h.orchestrator.state(), SessionState::Speaking);

    let task = h.timers.recv().await.expect("reply timer fires");
    h.orchestrator.handle_timer(task);
    assert_eq!(h.synthesis.spoken_texts(), vec![expected]);

    let id = h.synthesis.last_utterance();
    h.orchestrator.handle_synthesis_event(SynthesisEvent::Started(id));
    assert_eq!(h.orchestrator.state(), SessionState::Speaking);
    h.orchestrator.handle_synthesis_event(SynthesisEvent::Ended(id));
    assert_eq!(h.orchestrator.state(), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn reply_waits_for_the_configured_pause() {
    let mut h = harness();
    h.orchestrator.begin_turn();
    let event = h.capture.heard("hello");
    h.orchestrator.handle_capture_event(event);

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert!(h.timers.try_recv().is_err());

    let task = h.timers.recv().await.expect("reply timer fires");
    h.orchestrator.handle_timer(task);
    assert_eq!(h.synthesis.spoken_texts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn capture_is_refused_while_reply_pending_or_playing() {
    let mut h = harness();
    h.orchestrator.begin_turn();
    let event = h.capture.heard("I can't sleep");
    h.orchestrator.handle_capture_event(event);

    assert!(!h.orchestrator.begin_turn());

    let task = h.timers.recv().await.unwrap();
    h.orchestrator.handle_timer(task);
    assert!(!h.orchestrator.begin_turn());
    assert_eq!(h.capture.start_count(), 1);

    let id = h.synthesis.last_utterance();
    h.orchestrator.handle_synthesis_event(SynthesisEvent::Failed {
        id,
        reason: "interrupted".to_string(),
    });
    assert_eq!(h.orchestrator.state(), SessionState::Idle);
    assert!(h.notifications.try_recv().is_err(), "synthesis failures stay quiet");

    assert!(h.orchestrator.begin_turn());
    assert_eq!(h.capture.start_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn capture_error_notifies_once_and_leaves_transcript_alone() {
    let mut h = harness();
    h.orchestrator.begin_turn();
    let event = h.capture.failed("network");
    h.orchestrator.handle_capture_event(event.clone());
    h.orchestrator.handle_capture_event(event);

    assert_eq!(h.orchestrator.state(), SessionState::Idle);
    assert!(h.orchestrator.transcript().is_empty());

    let notification = h.notifications.try_recv().expect("one notification");
    assert_eq!(notification.title, "Speech Recognition Error");
    assert_eq!(notification.severity, Severity::Destructive);
    assert!(h.notifications.try_recv().is_err());

    assert!(h.orchestrator.begin_turn(), "user may simply try again");
}

#[tokio::test(start_paused = true)]
async fn ending_the_turn_discards_a_late_result() {
    let mut h = harness();
    h.orchestrator.begin_turn();
    let late = h.capture.heard("hello there");
    h.orchestrator.end_turn();

    assert_eq!(h.orchestrator.state(), SessionState::Idle);
    assert_eq!(h.capture.0.lock().unwrap().stops.len(), 1);

    h.orchestrator.handle_capture_event(late);
    assert!(h.orchestrator.transcript().is_empty());
}

#[tokio::test(start_paused = true)]
async fn platform_ending_recognition_returns_to_idle() {
    let mut h = harness();
    h.orchestrator.begin_turn();
    let attempt = h.capture.last_attempt();
    h.orchestrator.handle_capture_event(CaptureEvent::Ended { attempt });
    assert_eq!(h.orchestrator.state(), SessionState::Idle);
    assert!(h.notifications.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn cancelling_during_the_pause_prevents_speech() {
    let mut h = harness();
    h.orchestrator.begin_turn();
    let event = h.capture.heard("thank you");
    h.orchestrator.handle_capture_event(event);

    h.orchestrator.cancel_speech();
    assert_eq!(h.orchestrator.state(), SessionState::Idle);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(h.timers.try_recv().is_err());
    assert!(h.synthesis.spoken_texts().is_empty());
    assert_eq!(h.orchestrator.transcript().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_speech_stops_playback() {
    let mut h = harness();
    h.orchestrator.begin_turn();
    let event = h.capture.heard("I'm so frustrated");
    h.orchestrator.handle_capture_event(event);
    let task = h.timers.recv().await.unwrap();
    h.orchestrator.handle_timer(task);

    let cancels = h.synthesis.cancels();
    h.orchestrator.cancel_speech();
    assert_eq!(h.synthesis.cancels(), cancels + 1);
    assert_eq!(h.orchestrator.state(), SessionState::Idle);

    // A late end for the stopped utterance changes nothing.
    let id = h.synthesis.last_utterance();
    h.orchestrator.handle_synthesis_event(SynthesisEvent::Ended(id));
    assert_eq!(h.orchestrator.state(), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn stale_timer_is_ignored() {
    let mut h = harness();
    h.orchestrator.handle_timer(TaskId(42));
    assert!(h.synthesis.spoken_texts().is_empty());
    assert_eq!(h.orchestrator.state(), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_orchestrator_cancels_the_pending_reply() {
    let mut h = harness();
    h.orchestrator.begin_turn();
    let event = h.capture.heard("hey");
    h.orchestrator.handle_capture_event(event);

    let Harness {
        orchestrator,
        mut timers,
        synthesis,
        ..
    } = h;
    drop(orchestrator);

    let fired = tokio::time::timeout(Duration::from_secs(5), timers.recv()).await;
    assert!(!matches!(fired, Ok(Some(_))));
    assert!(synthesis.spoken_texts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transcript_keeps_conversation_order_across_turns() {
    let mut h = harness();
    for said in ["hello", "I feel sad", "thanks"] {
        assert!(h.orchestrator.begin_turn());
        let event = h.capture.heard(said);
        h.orchestrator.handle_capture_event(event);
        let task = h.timers.recv().await.unwrap();
        h.orchestrator.handle_timer(task);
        let id = h.synthesis.last_utterance();
        h.orchestrator.handle_synthesis_event(SynthesisEvent::Ended(id));
    }

    let transcript = h.orchestrator.transcript();
    assert_eq!(transcript.len(), 6);
    let users: Vec<&str> = transcript
        .iter()
        .filter(|m| m.is_user)
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(users, vec!["hello", "I feel sad", "thanks"]);
    assert!(transcript.iter().step_by(2).all(|m| m.is_user));
    assert_eq!(h.synthesis.spoken_texts().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn replies_use_the_preferred_voice_and_calm_preset() {
    let capture = FakeCapture::default();
    let synthesis = FakeSynthesis::default();
    synthesis.0.lock().unwrap().voices = vec![
        VoiceOption::new("Alex", "en-US"),
        VoiceOption::new("Samantha", "en-US"),
    ];
    let (mut orchestrator, mut timers) = ConversationOrchestrator::new(
        &VoiceConfig::default(),
        Some(Box::new(capture.clone())),
        Some(Box::new(synthesis.clone())),
        Arc::new(nirwaan_voice::LogSink),
    )
    .unwrap();

    orchestrator.begin_turn();
    orchestrator.handle_capture_event(capture.heard("breathe with me"));
    let task = timers.recv().await.unwrap();
    orchestrator.handle_timer(task);

    let log = synthesis.0.lock().unwrap();
    let utterance = &log.spoken[0];
    assert_eq!(utterance.voice.as_ref().unwrap().display_name, "Samantha");
    assert_eq!(utterance.params.rate, 0.9);
    assert_eq!(utterance.params.volume, 0.8);
}

#[tokio::test]
async fn unsupported_capture_puts_conversation_in_error_state() {
    let (mut orchestrator, _timers) = ConversationOrchestrator::new(
        &VoiceConfig::default(),
        None,
        Some(Box::new(FakeSynthesis::default())),
        Arc::new(nirwaan_voice::LogSink),
    )
    .unwrap();

    assert!(!orchestrator.is_supported());
    assert_eq!(orchestrator.state(), SessionState::Error);
    assert!(!orchestrator.begin_turn());
    orchestrator.end_turn();
    orchestrator.cancel_speech();
    assert_eq!(orchestrator.state(), SessionState::Error);
}

#[tokio::test]
async fn without_synthesis_replies_are_only_written() {
    let capture = FakeCapture::default();
    let (mut orchestrator, _timers) = ConversationOrchestrator::new(
        &VoiceConfig::default(),
        Some(Box::new(capture.clone())),
        None,
        Arc::new(nirwaan_voice::LogSink),
    )
    .unwrap();

    orchestrator.begin_turn();
    orchestrator.handle_capture_event(capture.heard("I feel overwhelmed"));
    assert_eq!(orchestrator.transcript().len(), 2);
    assert_eq!(orchestrator.state(), SessionState::Idle);
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let mut config = VoiceConfig::default();
    config.speech.volume = 3.0;
    let result = ConversationOrchestrator::new(
        &config,
        Some(Box::new(FakeCapture::default())),
        Some(Box::new(FakeSynthesis::default())),
        Arc::new(nirwaan_voice::LogSink),
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn snapshot_serializes_for_the_presentation_layer() {
    let (orchestrator, _timers) = ConversationOrchestrator::new(
        &VoiceConfig::default(),
        Some(Box::new(FakeCapture::default())),
        None,
        Arc::new(nirwaan_voice::LogSink),
    )
    .unwrap();
    let json = serde_json::to_value(orchestrator.snapshot()).unwrap();
    assert_eq!(json["state"], "idle");
    assert_eq!(json["supported"], true);
    assert_eq!(json["transcript"], serde_json::json!([]));
}

#[test]
fn construction_outside_a_runtime_is_an_error() {
    let capture = FakeCapture::default();
    let result = ConversationOrchestrator::new(
        &VoiceConfig::default(),
        Some(Box::new(capture.clone())),
        Some(Box::new(FakeSynthesis::default())),
        Arc::new(nirwaan_voice::LogSink),
    );
    assert!(matches!(result, Err(nirwaan_voice::VoiceError::NoRuntime)));
    assert_eq!(capture.start_count(), 0);
}
