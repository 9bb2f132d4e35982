//! MIDI input for bpmsyncrs
//!
//! This module feeds the clock core from a MIDI input, including:
//! - Clock and transport message types and error handling
//! - Real MIDI device input via midir
//! - A scripted engine for testing
//!
//! The main components are:
//! - [`MidiEngine`] trait for receiving timestamped messages
//! - [`MidirEngine`] for real MIDI device communication
//! - [`MockMidiEngine`] for testing
//! - [`run_external_clock`] to drive a [`ClockCore`](crate::clock::ClockCore)
//!
mod engine;
mod external_clock;
pub mod midir_engine;
pub mod mock_engine;

pub use engine::{MidiEngine, MidiError, MidiMessage, Result, TimedMessage};

pub use midir_engine::MidirEngine;
pub use mock_engine::MockMidiEngine;

pub use external_clock::run_external_clock;

// Set default engine type
pub type DefaultMidiEngine = MidirEngine;
