use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI input devices
    #[arg(long)]
    pub device_list: bool,

    /// Follow the clock of a specific MIDI device
    #[arg(long)]
    pub bind_to_device: Option<String>,

    /// Settings file (toml, json, yaml, ...)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seconds without a clock pulse before the master role becomes available
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<f64>,

    /// Number of values in the displayed BPM average
    #[arg(long, value_name = "N")]
    pub history: Option<usize>,
}

pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
