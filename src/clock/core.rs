use super::arbiter::{ArbiterState, ClockActivityArbiter};
use super::timer::Timer;
use super::ClockMessage;
use crate::config::{ConfigError, EngineConfig};
use crate::observer::{ClockObserver, Notifier, ObserverId, ObserverRegistry};
use crate::scheduler::Scheduler;
use crate::tempo::{BpmEngine, BpmReading, ClockPulse, TimebaseSource};
use log::{debug, info};
use std::sync::Arc;

/// Routes clock messages to the arbiter and the BPM engine, and owns the
/// observer registry both of them report to
pub struct ClockCore {
    bpm_engine: BpmEngine,
    arbiter: Arc<ClockActivityArbiter>,
    notifier: Notifier,
}

impl ClockCore {
    pub fn new(
        config: EngineConfig,
        timebase: Arc<dyn TimebaseSource>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, ConfigError> {
        let notifier = Notifier::new(Arc::new(ObserverRegistry::new()), scheduler);
        let bpm_engine = BpmEngine::new(&config, timebase, notifier.clone())?;
        let arbiter = ClockActivityArbiter::new(config.timeout, notifier.clone());
        Ok(Self {
            bpm_engine,
            arbiter,
            notifier,
        })
    }

    /// Like [`new`](Self::new), with the arbiter driven by `timer`
    pub fn with_timer(
        config: EngineConfig,
        timebase: Arc<dyn TimebaseSource>,
        scheduler: Arc<dyn Scheduler>,
        timer: Box<dyn Timer>,
    ) -> Result<Self, ConfigError> {
        let notifier = Notifier::new(Arc::new(ObserverRegistry::new()), scheduler);
        let bpm_engine = BpmEngine::new(&config, timebase, notifier.clone())?;
        let arbiter = ClockActivityArbiter::with_timer(config.timeout, notifier.clone(), timer);
        Ok(Self {
            bpm_engine,
            arbiter,
            notifier,
        })
    }

    pub fn on_system_clock_pulse(&self, timestamp: ClockPulse) -> Option<BpmReading> {
        self.arbiter.on_pulse();
        self.bpm_engine.record_pulse(timestamp)
    }

    pub fn on_transport_stop(&self) {
        info!("Transport stopped, clearing pulse log");
        self.bpm_engine.on_transport_stop();
    }

    pub fn on_transport_start(&self) {
        info!("Transport started");
        self.bpm_engine.on_transport_start();
    }

    pub fn on_transport_continue(&self) {
        info!("Transport resumed");
    }

    pub fn process_message(&self, msg: ClockMessage) -> Option<BpmReading> {
        match msg {
            ClockMessage::Tick(timestamp) => self.on_system_clock_pulse(timestamp),
            ClockMessage::Start => {
                self.on_transport_start();
                None
            }
            ClockMessage::Stop => {
                self.on_transport_stop();
                None
            }
            ClockMessage::Continue => {
                self.on_transport_continue();
                None
            }
        }
    }

    pub fn register_observer(&self, observer: Arc<dyn ClockObserver>) -> ObserverId {
        self.notifier.registry().register(observer)
    }

    pub fn unregister_observer(&self, id: ObserverId) -> bool {
        debug!("Removing observer {:?}", id);
        self.notifier.registry().unregister(id)
    }

    pub fn current_bpm(&self) -> Option<f64> {
        self.bpm_engine.current_bpm()
    }

    pub fn role(&self) -> ArbiterState {
        self.arbiter.state()
    }

    pub fn arbiter(&self) -> &Arc<ClockActivityArbiter> {
        &self.arbiter
    }

    pub fn bpm_engine(&self) -> &BpmEngine {
        &self.bpm_engine
    }
}
