//! Fake platform capabilities shared by the integration tests.
#![allow(dead_code)]

use nirwaan_types::VoiceOption;
use nirwaan_voice::{
    AttemptId, CaptureCapability, CaptureEvent, SynthesisCapability, Utterance, UtteranceId,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct CaptureLog {
    pub starts: Vec<AttemptId>,
    pub stops: Vec<AttemptId>,
}

/// Records start/stop calls; tests deliver events by hand.
#[derive(Clone, Default)]
pub struct FakeCapture(pub Arc<Mutex<CaptureLog>>);

impl FakeCapture {
    pub fn last_attempt(&self) -> AttemptId {
        *self
            .0
            .lock()
            .unwrap()
            .starts
            .last()
            .expect("capture should have been started")
    }

    pub fn start_count(&self) -> usize {
        self.0.lock().unwrap().starts.len()
    }

    /// A final result for the most recent attempt.
    pub fn heard(&self, text: &str) -> CaptureEvent {
        CaptureEvent::Result {
            attempt: self.last_attempt(),
            transcripts: vec![text.to_string()],
            is_final: true,
        }
    }

    pub fn failed(&self, reason: &str) -> CaptureEvent {
        CaptureEvent::Error {
            attempt: self.last_attempt(),
            reason: reason.to_string(),
        }
    }
}

impl CaptureCapability for FakeCapture {
    fn start(&mut self, attempt: AttemptId, _language: &str) {
        self.0.lock().unwrap().starts.push(attempt);
    }

    fn stop(&mut self, attempt: AttemptId) {
        self.0.lock().unwrap().stops.push(attempt);
    }
}

#[derive(Debug, Default)]
pub struct SynthesisLog {
    pub spoken: Vec<Utterance>,
    pub cancels: usize,
    pub voices: Vec<VoiceOption>,
}

/// Records utterances; tests deliver lifecycle events by hand.
#[derive(Clone, Default)]
pub struct FakeSynthesis(pub Arc<Mutex<SynthesisLog>>);

impl FakeSynthesis {
    pub fn spoken_texts(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .spoken
            .iter()
            .map(|u| u.text.clone())
            .collect()
    }

    pub fn last_utterance(&self) -> UtteranceId {
        self.0
            .lock()
            .unwrap()
            .spoken
            .last()
            .expect("something should have been spoken")
            .id
    }

    pub fn cancels(&self) -> usize {
        self.0.lock().unwrap().cancels
    }
}

impl SynthesisCapability for FakeSynthesis {
    fn speak(&mut self, utterance: &Utterance) {
        self.0.lock().unwrap().spoken.push(utterance.clone());
    }

    fn cancel_all(&mut self) {
        self.0.lock().unwrap().cancels += 1;
    }

    fn voices(&self) -> Vec<VoiceOption> {
        self.0.lock().unwrap().voices.clone()
    }
}
