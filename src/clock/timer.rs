//! One-shot timeout timers

use crossbeam::channel::{after, never, select, unbounded, Sender};
use log::{debug, trace, warn};
use std::thread;
use std::time::{Duration, Instant};

/// A one-shot timer whose fire callback is fixed when it is built.
///
/// `arm` (re)starts the countdown; arming an armed timer pushes the deadline
/// out. `cancel` drops a pending deadline. After firing the timer stays idle
/// until it is armed again.
pub trait Timer: Send + Sync {
    fn arm(&self, interval: Duration);
    fn cancel(&self);
}

enum Command {
    Arm(Duration),
    Cancel,
}

/// [`Timer`] backed by a background thread waiting on crossbeam channels.
///
/// The thread exits once the timer is dropped.
pub struct WatchdogTimer {
    commands: Sender<Command>,
}

impl WatchdogTimer {
    pub fn spawn<F>(on_fire: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = unbounded::<Command>();

        let spawned = thread::Builder::new()
            .name("clock-watchdog".to_string())
            .spawn(move || {
                let mut deadline: Option<Instant> = None;
                loop {
                    let timeout = match deadline {
                        Some(at) => after(at.saturating_duration_since(Instant::now())),
                        None => never(),
                    };

                    select! {
                        recv(rx) -> command => match command {
                            Ok(Command::Arm(interval)) => {
                                deadline = Some(Instant::now() + interval);
                            }
                            Ok(Command::Cancel) => {
                                trace!("Watchdog cancelled");
                                deadline = None;
                            }
                            Err(_) => break,
                        },
                        recv(timeout) -> _ => {
                            deadline = None;
                            trace!("Watchdog fired");
                            on_fire();
                        }
                    }
                }
                debug!("Watchdog thread exiting");
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn watchdog thread, timeouts disabled: {}", e);
        }

        Self { commands: tx }
    }

    fn send(&self, command: Command) {
        // Only fails when the thread is gone, in which case there is nothing to drive
        let _ = self.commands.send(command);
    }
}

impl Timer for WatchdogTimer {
    fn arm(&self, interval: Duration) {
        self.send(Command::Arm(interval));
    }

    fn cancel(&self) {
        self.send(Command::Cancel);
    }
}
