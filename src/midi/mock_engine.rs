use crate::midi::{MidiEngine, MidiError, MidiMessage, Result, TimedMessage};
use std::collections::VecDeque;

/// Replays a scripted message sequence, then reports the input as closed
#[derive(Debug, Default, Clone)]
pub struct MockMidiEngine {
    script: VecDeque<TimedMessage>,
}

impl MockMidiEngine {
    pub fn new(script: impl IntoIterator<Item = TimedMessage>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// `count` clock pulses, `interval` ticks apart, starting at `start`
    pub fn clock_stream(start: u64, interval: u64, count: usize) -> Self {
        Self::new((0..count as u64).map(|i| {
            TimedMessage::new(start + i * interval, MidiMessage::Clock)
        }))
    }

    pub fn push(&mut self, message: TimedMessage) {
        self.script.push_back(message);
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    pub fn list_devices() -> Vec<String> {
        vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()]
    }
}

impl MidiEngine for MockMidiEngine {
    fn recv(&mut self) -> Result<TimedMessage> {
        self.script
            .pop_front()
            .ok_or_else(|| MidiError::RecvError("script exhausted".to_string()))
    }
}
