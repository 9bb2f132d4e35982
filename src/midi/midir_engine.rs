use crate::midi::{MidiEngine, MidiError, MidiMessage, Result, TimedMessage};
use crossbeam::channel::{unbounded, Receiver};
use log::{debug, info, trace};
use midir::{Ignore, MidiInput, MidiInputConnection};

const CLIENT_NAME: &str = "bpmsyncrs-in";

/// MIDI input on a real device through midir.
///
/// Timestamps are midir's microsecond stamps, so pair this engine with
/// [`MicrosecondTimebase`](crate::tempo::MicrosecondTimebase).
pub struct MidirEngine {
    _connection: MidiInputConnection<()>,
    rx: Receiver<(u64, Vec<u8>)>,
}

impl MidirEngine {
    /// Connects to the first input port whose name contains `device_name`
    pub fn connect(device_name: &str) -> Result<Self> {
        let mut midi_in = MidiInput::new(CLIENT_NAME)?;
        // Clock bytes are filtered by default
        midi_in.ignore(Ignore::None);

        let in_ports = midi_in.ports();
        let in_port = in_ports
            .iter()
            .find(|p| {
                let name = midi_in.port_name(p).unwrap_or_default();
                debug!("Checking port: {}", name);
                name.contains(device_name)
            })
            .ok_or_else(|| {
                MidiError::ConnectionError(format!("input device '{}' not found", device_name))
            })?
            .clone();

        let (tx, rx) = unbounded();
        let connection = midi_in.connect(
            &in_port,
            "bpmsyncrs-input",
            move |stamp, message, _| {
                let _ = tx.send((stamp, message.to_vec()));
            },
            (),
        )?;

        info!("Connected to MIDI input device: {}", device_name);
        Ok(Self {
            _connection: connection,
            rx,
        })
    }

    pub fn parse_midi_message(data: &[u8]) -> Option<MidiMessage> {
        MidiMessage::from_bytes(data)
    }

    pub fn list_devices() -> Vec<String> {
        let mut devices = Vec::new();

        if let Ok(midi_in) = MidiInput::new("bpmsyncrs-list") {
            for port in midi_in.ports() {
                if let Ok(name) = midi_in.port_name(&port) {
                    devices.push(name);
                }
            }
        }

        devices
    }
}

impl MidiEngine for MidirEngine {
    fn recv(&mut self) -> Result<TimedMessage> {
        loop {
            let (stamp, data) = self
                .rx
                .recv()
                .map_err(|_| MidiError::RecvError("input connection closed".to_string()))?;

            match Self::parse_midi_message(&data) {
                Some(message) => return Ok(TimedMessage::new(stamp, message)),
                None => trace!("Ignoring MIDI message {:02X?}", data),
            }
        }
    }
}
