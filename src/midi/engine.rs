use crate::tempo::ClockPulse;
use std::error::Error;
use std::fmt;

/// Custom error type for MIDI operations
#[derive(Debug)]
pub enum MidiError {
    /// Error when receiving a MIDI message
    RecvError(String),
    /// Error when connecting to a MIDI device
    ConnectionError(String),
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::RecvError(msg) => write!(f, "MIDI receive error: {}", msg),
            MidiError::ConnectionError(msg) => write!(f, "MIDI connection error: {}", msg),
        }
    }
}

impl Error for MidiError {}

impl From<midir::InitError> for MidiError {
    fn from(e: midir::InitError) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

impl<T> From<midir::ConnectError<T>> for MidiError {
    fn from(e: midir::ConnectError<T>) -> Self {
        MidiError::ConnectionError(e.to_string())
    }
}

/// System real-time messages that drive the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// MIDI Clock timing message (0xF8)
    Clock,
    /// MIDI Start message (0xFA)
    Start,
    /// MIDI Stop message (0xFC)
    Stop,
    /// MIDI Continue message (0xFB)
    Continue,
}

impl MidiMessage {
    /// Parses the status byte of a raw message, `None` for anything that is
    /// not a clock or transport message
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data.first()? {
            0xF8 => Some(MidiMessage::Clock),
            0xFA => Some(MidiMessage::Start),
            0xFB => Some(MidiMessage::Continue),
            0xFC => Some(MidiMessage::Stop),
            _ => None,
        }
    }
}

/// A message together with the timestamp it was received at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedMessage {
    pub timestamp: ClockPulse,
    pub message: MidiMessage,
}

impl TimedMessage {
    pub fn new(timestamp: ClockPulse, message: MidiMessage) -> Self {
        Self { timestamp, message }
    }
}

/// Result type for MIDI operations
pub type Result<T> = std::result::Result<T, MidiError>;

/// Trait defining the interface for MIDI input implementations
pub trait MidiEngine: Send {
    /// Blocks until the next clock or transport message arrives
    fn recv(&mut self) -> Result<TimedMessage>;
}
