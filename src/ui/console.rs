use super::progress::{create_bpm_spinner, style_bpm_spinner, MASTER_PREFIX, SLAVE_PREFIX};
use crate::observer::ClockObserver;
use chrono::Local;
use indicatif::ProgressBar;
use std::time::Duration;

/// Shows the current role and tempo on a terminal spinner
pub struct ConsoleObserver {
    pb: ProgressBar,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        let pb = create_bpm_spinner();
        pb.enable_steady_tick(Duration::from_millis(120));
        Self { pb }
    }

    /// Wraps an existing bar, e.g. a hidden one
    pub fn with_progress(pb: ProgressBar) -> Self {
        style_bpm_spinner(&pb);
        Self { pb }
    }

    pub fn progress(&self) -> &ProgressBar {
        &self.pb
    }

    fn announce(&self, text: &str) {
        self.pb
            .println(format!("[{}] {}", Local::now().format("%H:%M:%S%.3f"), text));
    }
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockObserver for ConsoleObserver {
    fn on_slave_mode_entered(&self) {
        self.pb.set_prefix(SLAVE_PREFIX);
        self.announce("External clock detected, following it");
    }

    fn on_master_eligibility_entered(&self) {
        self.pb.set_prefix(MASTER_PREFIX);
        self.pb.set_message("clock lost");
        self.announce("External clock lost, master role available");
    }

    fn on_bpm_changed(&self, _bpm: f64, formatted: &str) {
        self.pb.set_message(format!("{} BPM", formatted));
    }
}

impl Drop for ConsoleObserver {
    fn drop(&mut self) {
        self.pb.finish_and_clear();
    }
}
