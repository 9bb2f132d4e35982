use crate::clock::{ClockCore, ClockMessage};
use crate::midi::MidiEngine;
use log::{error, info};
use std::sync::Arc;

/// Pumps messages from `engine` into `core` until the engine fails.
///
/// Returns the number of messages delivered.
pub fn run_external_clock<T>(mut engine: T, core: Arc<ClockCore>) -> usize
where
    T: MidiEngine,
{
    info!("External MIDI clock initialized and waiting for input");
    let mut delivered = 0;

    loop {
        match engine.recv() {
            Ok(timed) => {
                core.process_message(ClockMessage::from_midi(timed.message, timed.timestamp));
                delivered += 1;
            }
            Err(e) => {
                error!("MIDI engine receive error: {}", e);
                break;
            }
        }
    }

    info!(
        "External MIDI clock stopped after {} messages - shutting down clock thread",
        delivered
    );
    delivered
}
