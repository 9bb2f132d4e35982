use log::trace;
use std::collections::VecDeque;

/// One instantaneous BPM measurement at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpmSample {
    pub time_micros: f64,
    pub bpm: f64,
}

impl BpmSample {
    pub fn new(time_micros: f64, bpm: f64) -> Self {
        Self { time_micros, bpm }
    }
}

/// Least-squares line `bpm = mean_bpm + slope * (time - mean_time)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub mean_time: f64,
    pub mean_bpm: f64,
}

impl LinearFit {
    pub fn value_at(&self, time_micros: f64) -> f64 {
        self.mean_bpm + self.slope * (time_micros - self.mean_time)
    }
}

/// Sliding window linear regression over recent BPM samples.
///
/// Adjacent-pulse BPM is dominated by single-tick jitter. Fitting a line over
/// the window and reading it slightly behind the newest sample keeps the
/// trend while dropping most of that jitter.
///
/// The fit is centred on the window means so that large absolute timestamps
/// do not cost precision.
#[derive(Debug, Clone)]
pub struct RegressionEstimator {
    samples: VecDeque<BpmSample>,
    capacity: usize,
    max_span_micros: Option<f64>,
}

impl RegressionEstimator {
    pub fn new(capacity: usize, max_span_micros: Option<f64>) -> Self {
        let capacity = capacity.max(2);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            max_span_micros,
        }
    }

    /// Appends a sample and evicts anything outside the window.
    ///
    /// A sample that does not advance past the newest one means the
    /// timebase restarted, the window starts over from that sample.
    pub fn push(&mut self, sample: BpmSample) {
        if let Some(newest) = self.samples.back() {
            if sample.time_micros <= newest.time_micros {
                trace!(
                    "Sample time {} does not advance past {}, restarting regression window",
                    sample.time_micros,
                    newest.time_micros
                );
                self.samples.clear();
            }
        }

        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }

        if let Some(span) = self.max_span_micros {
            while let Some(oldest) = self.samples.front() {
                if sample.time_micros - oldest.time_micros > span {
                    self.samples.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    pub fn fit(&self) -> Option<LinearFit> {
        let n = self.samples.len();
        if n < 2 {
            return None;
        }

        let count = n as f64;
        let mean_time = self.samples.iter().map(|s| s.time_micros).sum::<f64>() / count;
        let mean_bpm = self.samples.iter().map(|s| s.bpm).sum::<f64>() / count;

        let (sxx, sxy) = self.samples.iter().fold((0.0, 0.0), |(sxx, sxy), s| {
            let dt = s.time_micros - mean_time;
            (sxx + dt * dt, sxy + dt * (s.bpm - mean_bpm))
        });

        if sxx <= f64::EPSILON {
            return None;
        }

        Some(LinearFit {
            slope: sxy / sxx,
            mean_time,
            mean_bpm,
        })
    }

    /// Maps a ratio in [0, 1] to a time between the oldest and newest sample
    pub fn time_at(&self, ratio: f64) -> Option<f64> {
        let oldest = self.samples.front()?.time_micros;
        let newest = self.samples.back()?.time_micros;
        let ratio = if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        };
        Some(oldest + ratio * (newest - oldest))
    }

    /// Regression BPM at `ratio` through the window, `None` when there is no
    /// usable fit
    pub fn estimate(&self, ratio: f64) -> Option<f64> {
        let fit = self.fit()?;
        let value = fit.value_at(self.time_at(ratio)?);
        (value.is_finite() && value > 0.0).then_some(value)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
