//! Observer registry and notification fan-out

use crate::scheduler::Scheduler;
use log::{debug, trace};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Receives role changes and tempo updates from the clock core.
///
/// Every method has an empty default so an observer only implements the
/// events it cares about. Calls for one event fan out to all observers in an
/// unspecified order.
pub trait ClockObserver: Send + Sync {
    /// An external clock is running, the local process must not act as master
    fn on_slave_mode_entered(&self) {}

    /// The external clock went quiet, the local process may act as master
    fn on_master_eligibility_entered(&self) {}

    /// The displayed tempo changed; `formatted` has exactly two decimals
    fn on_bpm_changed(&self, _bpm: f64, _formatted: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Explicit, synchronized list of observers.
///
/// Notification iterates over a snapshot taken when the notification starts,
/// so observers added or removed from inside a callback only see the change
/// on the next notification.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Mutex<Vec<(ObserverId, Arc<dyn ClockObserver>)>>,
    next_id: AtomicU64,
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn ClockObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut observers) = self.observers.lock() {
            observers.push((id, observer));
        }
        debug!("Registered observer {:?}", id);
        id
    }

    pub fn unregister(&self, id: ObserverId) -> bool {
        let Ok(mut observers) = self.observers.lock() else {
            return false;
        };
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        let removed = observers.len() != before;
        if removed {
            debug!("Unregistered observer {:?}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.observers.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<Arc<dyn ClockObserver>> {
        match self.observers.lock() {
            Ok(observers) => observers.iter().map(|(_, o)| o.clone()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn notify_slave_mode_entered(&self) {
        for observer in self.snapshot() {
            observer.on_slave_mode_entered();
        }
    }

    pub fn notify_master_eligibility_entered(&self) {
        for observer in self.snapshot() {
            observer.on_master_eligibility_entered();
        }
    }

    pub fn notify_bpm_changed(&self, bpm: f64, formatted: &str) {
        for observer in self.snapshot() {
            observer.on_bpm_changed(bpm, formatted);
        }
    }
}

/// Hands registry notifications to the configured [`Scheduler`]
#[derive(Clone)]
pub struct Notifier {
    registry: Arc<ObserverRegistry>,
    scheduler: Arc<dyn Scheduler>,
}

impl Notifier {
    pub fn new(registry: Arc<ObserverRegistry>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            registry,
            scheduler,
        }
    }

    pub fn registry(&self) -> &Arc<ObserverRegistry> {
        &self.registry
    }

    pub fn slave_mode_entered(&self) {
        let registry = self.registry.clone();
        self.scheduler
            .spawn(Box::new(move || registry.notify_slave_mode_entered()));
    }

    pub fn master_eligibility_entered(&self) {
        let registry = self.registry.clone();
        self.scheduler
            .spawn(Box::new(move || registry.notify_master_eligibility_entered()));
    }

    pub fn bpm_changed(&self, bpm: f64, formatted: String) {
        trace!("Dispatching BPM change: {}", formatted);
        let registry = self.registry.clone();
        self.scheduler
            .spawn(Box::new(move || registry.notify_bpm_changed(bpm, &formatted)));
    }
}
