use crate::config::ConfigError;
use std::collections::VecDeque;

/// Fixed-capacity ring of values with a running arithmetic mean
#[derive(Debug, Clone)]
pub struct MovingAverager {
    values: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl MovingAverager {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidHistoryCapacity(0));
        }
        Ok(Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
        })
    }

    /// Pushes a value, evicting the oldest beyond capacity, and returns the
    /// mean of the retained values
    pub fn record(&mut self, value: f64) -> f64 {
        self.values.push_back(value);
        self.sum += value;
        while self.values.len() > self.capacity {
            if let Some(evicted) = self.values.pop_front() {
                self.sum -= evicted;
            }
        }
        self.sum / self.values.len() as f64
    }

    pub fn average(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.sum / self.values.len() as f64)
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}
