use super::timer::{Timer, WatchdogTimer};
use crate::observer::Notifier;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    /// No external clock seen recently, the local process may act as master
    MasterEnabled,
    /// An external clock is running, the local process must follow it
    SlaveActive,
}

/// Decides between master and slave role from clock pulse activity.
///
/// Every pulse re-arms a timeout. The first pulse while `MasterEnabled`
/// switches to `SlaveActive`; the timeout expiring while `SlaveActive`
/// switches back. Observers hear about each transition exactly once, pulses
/// that do not change the state only push the deadline out.
pub struct ClockActivityArbiter {
    state: Mutex<ArbiterState>,
    timer: Box<dyn Timer>,
    timeout: Duration,
    notifier: Notifier,
}

impl ClockActivityArbiter {
    /// Builds an arbiter driven by a [`WatchdogTimer`], armed immediately
    pub fn new(timeout: Duration, notifier: Notifier) -> Arc<Self> {
        let arbiter = Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let timer = WatchdogTimer::spawn(move || {
                if let Some(arbiter) = weak.upgrade() {
                    arbiter.on_timeout();
                }
            });
            Self::build(timeout, notifier, Box::new(timer))
        });
        arbiter.timer.arm(timeout);
        arbiter
    }

    /// Builds an arbiter on a caller-provided timer, which must call
    /// [`on_timeout`](Self::on_timeout) when it fires
    pub fn with_timer(timeout: Duration, notifier: Notifier, timer: Box<dyn Timer>) -> Arc<Self> {
        let arbiter = Arc::new(Self::build(timeout, notifier, timer));
        arbiter.timer.arm(timeout);
        arbiter
    }

    fn build(timeout: Duration, notifier: Notifier, timer: Box<dyn Timer>) -> Self {
        info!("Clock activity arbiter started, timeout {:?}", timeout);
        Self {
            state: Mutex::new(ArbiterState::MasterEnabled),
            timer,
            timeout,
            notifier,
        }
    }

    /// A clock pulse arrived
    pub fn on_pulse(&self) {
        self.timer.arm(self.timeout);

        let entered_slave = match self.state.lock() {
            Ok(mut state) if *state == ArbiterState::MasterEnabled => {
                *state = ArbiterState::SlaveActive;
                true
            }
            Ok(_) => false,
            Err(_) => {
                warn!("Arbiter state lock poisoned, pulse not evaluated");
                false
            }
        };

        if entered_slave {
            info!("External clock detected, entering slave mode");
            self.notifier.slave_mode_entered();
        }
    }

    /// The timeout elapsed without a pulse
    pub fn on_timeout(&self) {
        let entered_master = match self.state.lock() {
            Ok(mut state) if *state == ArbiterState::SlaveActive => {
                *state = ArbiterState::MasterEnabled;
                true
            }
            Ok(_) => false,
            Err(_) => {
                warn!("Arbiter state lock poisoned, timeout not evaluated");
                return;
            }
        };

        if entered_master {
            info!(
                "No clock pulse for {:?}, master role available",
                self.timeout
            );
            self.notifier.master_eligibility_entered();
        } else {
            debug!("Clock timeout while already master-eligible, ignoring");
        }
    }

    pub fn state(&self) -> ArbiterState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(_) => {
                warn!("Arbiter state lock poisoned, reporting master-eligible");
                ArbiterState::MasterEnabled
            }
        }
    }

    pub fn is_master_eligible(&self) -> bool {
        self.state() == ArbiterState::MasterEnabled
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Drop for ClockActivityArbiter {
    fn drop(&mut self) {
        self.timer.cancel();
    }
}
