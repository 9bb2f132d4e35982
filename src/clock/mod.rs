//! Clock activity tracking and the clock core facade
pub mod arbiter;
pub mod core;
pub mod timer;

use crate::midi::MidiMessage;
use crate::tempo::ClockPulse;

pub use self::core::ClockCore;
pub use arbiter::{ArbiterState, ClockActivityArbiter};
pub use timer::{Timer, WatchdogTimer};

/// Represents the MIDI clock messages the core reacts to
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ClockMessage {
    Tick(ClockPulse),
    Start,
    Stop,
    Continue,
}

impl ClockMessage {
    /// Pairs a received MIDI message with its timestamp
    pub fn from_midi(msg: MidiMessage, timestamp: ClockPulse) -> Self {
        match msg {
            MidiMessage::Clock => ClockMessage::Tick(timestamp),
            MidiMessage::Start => ClockMessage::Start,
            MidiMessage::Stop => ClockMessage::Stop,
            MidiMessage::Continue => ClockMessage::Continue,
        }
    }
}
