#![allow(dead_code)]

use bpmsyncrs::clock::Timer;
use bpmsyncrs::observer::{ClockObserver, Notifier, ObserverRegistry};
use bpmsyncrs::scheduler::InlineScheduler;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Slave,
    Master,
    Bpm(String),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn slave_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| **e == Event::Slave)
            .count()
    }

    pub fn master_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| **e == Event::Master)
            .count()
    }

    pub fn bpm_updates(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Bpm(formatted) => Some(formatted),
                _ => None,
            })
            .collect()
    }
}

impl ClockObserver for RecordingObserver {
    fn on_slave_mode_entered(&self) {
        self.events.lock().unwrap().push(Event::Slave);
    }

    fn on_master_eligibility_entered(&self) {
        self.events.lock().unwrap().push(Event::Master);
    }

    fn on_bpm_changed(&self, _bpm: f64, formatted: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Bpm(formatted.to_string()));
    }
}

/// Notifier delivering inline to a fresh recording observer
pub fn inline_notifier() -> (Notifier, Arc<RecordingObserver>) {
    let registry = Arc::new(ObserverRegistry::new());
    let recorder = RecordingObserver::new();
    registry.register(recorder.clone());
    (Notifier::new(registry, Arc::new(InlineScheduler)), recorder)
}

/// Timer that never fires on its own, tests call `on_timeout` instead
#[derive(Clone, Default)]
pub struct ManualTimer {
    pub arms: Arc<AtomicUsize>,
    pub cancels: Arc<AtomicUsize>,
}

impl ManualTimer {
    pub fn arm_count(&self) -> usize {
        self.arms.load(Ordering::SeqCst)
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl Timer for ManualTimer {
    fn arm(&self, _interval: Duration) {
        self.arms.fetch_add(1, Ordering::SeqCst);
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Microsecond timestamps of a clock running at `bpm`
pub fn pulse_times(start: u64, bpm: f64, count: usize) -> Vec<u64> {
    let interval = 60_000_000.0 / (bpm * 24.0);
    (0..count)
        .map(|i| start + (i as f64 * interval).round() as u64)
        .collect()
}
