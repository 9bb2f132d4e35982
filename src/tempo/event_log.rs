use super::ClockPulse;
use log::trace;
use std::collections::VecDeque;

/// Bounded log of the most recent clock pulse timestamps
#[derive(Debug, Clone)]
pub struct ClockEventLog {
    pulses: VecDeque<ClockPulse>,
    capacity: usize,
}

impl ClockEventLog {
    /// Creates a log holding at most `capacity` pulses (at least two are kept,
    /// one delta needs a pair)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            pulses: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a pulse. Pulses older than the newest entry are dropped so the
    /// log stays non-decreasing; returns whether the pulse was kept.
    pub fn record(&mut self, pulse: ClockPulse) -> bool {
        if let Some(&newest) = self.pulses.back() {
            if pulse < newest {
                trace!("Dropping out-of-order pulse {} (newest {})", pulse, newest);
                return false;
            }
        }

        self.pulses.push_back(pulse);
        while self.pulses.len() > self.capacity {
            self.pulses.pop_front();
        }
        true
    }

    /// Ticks between the two most recent pulses, if they are strictly increasing
    pub fn latest_delta(&self) -> Option<u64> {
        let len = self.pulses.len();
        if len < 2 {
            return None;
        }
        let newer = self.pulses[len - 1];
        let older = self.pulses[len - 2];
        (newer > older).then(|| newer - older)
    }

    pub fn newest(&self) -> Option<ClockPulse> {
        self.pulses.back().copied()
    }

    pub fn reset_keeping_newest(&mut self, n: usize) {
        while self.pulses.len() > n {
            self.pulses.pop_front();
        }
    }

    pub fn reset_keeping_newest_half(&mut self) {
        let keep = self.pulses.len() / 2;
        self.reset_keeping_newest(keep);
    }

    pub fn clear(&mut self) {
        self.pulses.clear();
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_needs_two_pulses() {
        let mut log = ClockEventLog::new(2);
        assert_eq!(log.latest_delta(), None);
        log.record(1_000);
        assert_eq!(log.latest_delta(), None);
        log.record(21_833);
        assert_eq!(log.latest_delta(), Some(20_833));
    }

    #[test]
    fn test_equal_timestamps_yield_no_delta() {
        let mut log = ClockEventLog::new(2);
        log.record(500);
        assert!(log.record(500));
        assert_eq!(log.latest_delta(), None);
    }

    #[test]
    fn test_decreasing_timestamp_is_dropped() {
        let mut log = ClockEventLog::new(2);
        log.record(500);
        assert!(!log.record(400));
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest_delta(), None);
    }

    #[test]
    fn test_capacity_bounds_log() {
        let mut log = ClockEventLog::new(3);
        for pulse in [10, 20, 30, 40, 50] {
            log.record(pulse);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.latest_delta(), Some(10));
    }

    #[test]
    fn test_capacity_is_at_least_two() {
        assert_eq!(ClockEventLog::new(0).capacity(), 2);
    }

    #[test]
    fn test_reset_policies() {
        let mut log = ClockEventLog::new(8);
        for pulse in 1..=8 {
            log.record(pulse);
        }

        log.reset_keeping_newest_half();
        assert_eq!(log.len(), 4);
        assert_eq!(log.newest(), Some(8));

        log.reset_keeping_newest(1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.newest(), Some(8));

        log.clear();
        assert!(log.is_empty());
        // An empty log accepts any timestamp again
        assert!(log.record(1));
    }
}
