//! Execution contexts for observer notifications
//!
//! The clock core never decides on its own where observer callbacks run.
//! Whoever builds it passes a [`Scheduler`]: run inline on the thread that
//! produced the event, on a fresh thread, or queued for a thread that drains
//! a [`DispatchQueue`] (typically the UI/main thread).

use crossbeam::channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{debug, warn};
use std::thread;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    fn spawn(&self, task: Task);
}

/// Runs every task immediately on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler {
    fn spawn(&self, task: Task) {
        task();
    }
}

/// Runs every task on its own thread. Tasks may complete in any order.
pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        ThreadScheduler
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadScheduler {
    fn spawn(&self, task: Task) {
        let _ = thread::spawn(task);
    }
}

/// Queues tasks for a [`DispatchQueue`], preserving submission order
#[derive(Clone)]
pub struct ChannelScheduler {
    tx: Sender<Task>,
}

/// Receiving half of a [`ChannelScheduler`]
pub struct DispatchQueue {
    rx: Receiver<Task>,
}

impl ChannelScheduler {
    pub fn new() -> (Self, DispatchQueue) {
        let (tx, rx) = unbounded();
        (ChannelScheduler { tx }, DispatchQueue { rx })
    }
}

impl Scheduler for ChannelScheduler {
    fn spawn(&self, task: Task) {
        if self.tx.send(task).is_err() {
            warn!("Dispatch queue dropped, notification discarded");
        }
    }
}

impl DispatchQueue {
    /// Runs queued tasks until every scheduler handle has been dropped
    pub fn run(self) {
        debug!("Dispatch queue running");
        while let Ok(task) = self.rx.recv() {
            task();
        }
        debug!("Dispatch queue closed");
    }

    /// Runs whatever is queued right now and returns how many tasks ran
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        loop {
            match self.rx.try_recv() {
                Ok(task) => {
                    task();
                    count += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return count,
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
