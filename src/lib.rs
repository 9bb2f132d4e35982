//! bpmsyncrs derives a stable tempo from incoming MIDI clock pulses and
//! decides whether the local process may act as clock master.
//!
//! [`ClockCore`] is the entry point: feed it pulse timestamps and transport
//! messages, register [`ClockObserver`]s to hear about role changes and tempo
//! updates.

pub mod cli;
pub mod clock;
pub mod config;
pub mod logging;
pub mod midi;
pub mod observer;
pub mod scheduler;
pub mod tempo;
pub mod ui;

// Re-export commonly used items
pub use cli::Args;
pub use clock::{ArbiterState, ClockActivityArbiter, ClockCore, ClockMessage};
pub use config::{ConfigError, EngineConfig};
pub use observer::{ClockObserver, ObserverId, ObserverRegistry};
pub use scheduler::{ChannelScheduler, DispatchQueue, InlineScheduler, Scheduler, ThreadScheduler};
pub use tempo::{BpmEngine, BpmReading, ClockPulse};

#[cfg(not(feature = "test-mock"))]
pub fn handle_device_list() -> Vec<String> {
    midi::MidirEngine::list_devices()
}

#[cfg(feature = "test-mock")]
pub fn handle_device_list() -> Vec<String> {
    midi::MockMidiEngine::list_devices()
}
