use super::{
    BpmSample, ClockEventLog, ClockPulse, ExponentialSmoother, MovingAverager,
    RegressionEstimator, TimebaseConverter, TimebaseSource, TICKS_PER_BEAT,
};
use crate::config::{ConfigError, EngineConfig};
use crate::observer::Notifier;
use log::{debug, info, trace};
use std::sync::{Arc, Mutex};

/// BPM implied by a single inter-pulse interval.
///
/// `(1_000_000 / interval_micros / 24) * 60 + calibration_offset`, or `None`
/// for intervals that are not strictly positive.
pub fn instantaneous_bpm(interval_micros: f64, calibration_offset: f64) -> Option<f64> {
    if !(interval_micros.is_finite() && interval_micros > 0.0) {
        return None;
    }
    let pulses_per_second = 1_000_000.0 / interval_micros;
    Some(pulses_per_second / f64::from(TICKS_PER_BEAT) * 60.0 + calibration_offset)
}

/// A displayed tempo value
#[derive(Debug, Clone, PartialEq)]
pub struct BpmReading {
    pub bpm: f64,
    pub formatted: String,
}

/// Passes a value through only when its two-decimal rendering changes
#[derive(Debug, Default, Clone)]
pub struct EdgeTrigger {
    last: Option<String>,
}

impl EdgeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bpm: f64) -> Option<String> {
        let formatted = format!("{:.2}", bpm);
        if self.last.as_deref() == Some(formatted.as_str()) {
            return None;
        }
        self.last = Some(formatted.clone());
        Some(formatted)
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

#[derive(Debug, Clone, Copy)]
struct Params {
    calibration_offset: f64,
    regression_ratio: f64,
    max_interval_micros: f64,
}

#[derive(Debug)]
struct BpmState {
    converter: TimebaseConverter,
    log: ClockEventLog,
    smoother: Option<ExponentialSmoother>,
    regression: RegressionEstimator,
    history: MovingAverager,
    trigger: EdgeTrigger,
}

impl BpmState {
    fn reset(&mut self) {
        self.log.clear();
        self.regression.clear();
        self.history.clear();
        if let Some(smoother) = self.smoother.as_mut() {
            smoother.reset();
        }
        self.trigger = EdgeTrigger::new();
    }

    fn analyze(&mut self, pulse: ClockPulse, params: Params) -> Option<BpmReading> {
        if !self.log.record(pulse) {
            return None;
        }
        let delta = self.log.latest_delta()?;

        let interval = match self.converter.to_micros(delta) {
            Ok(micros) => micros,
            Err(e) => {
                debug!("Skipping pulse at {}: {}", pulse, e);
                return None;
            }
        };

        if interval > params.max_interval_micros {
            debug!(
                "Pulse gap of {:.0}us exceeds the clock timeout, starting a fresh trend",
                interval
            );
            self.log.reset_keeping_newest(1);
            self.regression.clear();
            return None;
        }

        let raw = instantaneous_bpm(interval, params.calibration_offset)?;
        let raw = match self.smoother.as_mut() {
            Some(smoother) => smoother.apply(raw),
            None => raw,
        };

        let time = self.converter.to_micros(pulse).ok()?;
        self.regression.push(BpmSample::new(time, raw));
        let denoised = self
            .regression
            .estimate(params.regression_ratio)
            .unwrap_or(raw);
        let average = self.history.record(denoised);
        self.log.reset_keeping_newest(1);

        trace!(
            "interval={:.1}us raw={:.3} denoised={:.3} average={:.3}",
            interval,
            raw,
            denoised,
            average
        );

        let formatted = self.trigger.update(average)?;
        Some(BpmReading {
            bpm: average,
            formatted,
        })
    }
}

/// Turns clock pulse timestamps into a denoised, display-ready BPM.
///
/// Observers are told about a new tempo only when the two-decimal value
/// changes, so a steady clock produces a single notification.
pub struct BpmEngine {
    state: Mutex<BpmState>,
    params: Params,
    notifier: Notifier,
}

impl BpmEngine {
    pub fn new(
        config: &EngineConfig,
        timebase: Arc<dyn TimebaseSource>,
        notifier: Notifier,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let smoother = ExponentialSmoother::new(config.smoothing_factor)?;
        let state = BpmState {
            converter: TimebaseConverter::new(timebase),
            log: ClockEventLog::new(config.event_window),
            smoother: config.smooth_raw_bpm.then_some(smoother),
            regression: RegressionEstimator::new(
                config.regression_window,
                config.regression_span.map(|d| d.as_micros() as f64),
            ),
            history: MovingAverager::new(config.history_capacity)?,
            trigger: EdgeTrigger::new(),
        };

        info!(
            "BPM engine ready: history={}, regression window={}, ratio={}",
            config.history_capacity, config.regression_window, config.regression_ratio
        );

        Ok(Self {
            state: Mutex::new(state),
            params: Params {
                calibration_offset: config.calibration_offset,
                regression_ratio: config.regression_ratio,
                max_interval_micros: config.max_pulse_interval().as_micros() as f64,
            },
            notifier,
        })
    }

    /// Records a pulse and returns the new reading if the displayed value changed
    pub fn record_pulse(&self, pulse: ClockPulse) -> Option<BpmReading> {
        let reading = match self.state.lock() {
            Ok(mut state) => state.analyze(pulse, self.params),
            Err(_) => return None,
        };

        if let Some(reading) = &reading {
            debug!("Tempo changed to {} BPM", reading.formatted);
            self.notifier
                .bpm_changed(reading.bpm, reading.formatted.clone());
        }
        reading
    }

    /// Transport stop: forget every pulse and every tempo derived from them
    pub fn on_transport_stop(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.reset();
        }
    }

    /// Transport start: keep only the newest pulse
    pub fn on_transport_start(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.log.reset_keeping_newest(1);
        }
    }

    /// Mean of the BPM history, `None` until the first analysis
    pub fn current_bpm(&self) -> Option<f64> {
        self.state.lock().ok()?.history.average()
    }

    /// The last value handed to observers
    pub fn last_formatted(&self) -> Option<String> {
        let state = self.state.lock().ok()?;
        state.trigger.last().map(str::to_string)
    }

    pub fn pending_pulses(&self) -> usize {
        self.state.lock().map(|s| s.log.len()).unwrap_or(0)
    }
}
