// config.rs

use crate::tempo::DEFAULT_CALIBRATION_OFFSET;
use ::config::{Config as Settings, Environment, File};
use log::{debug, info};
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1_600);
pub const DEFAULT_REGRESSION_RATIO: f64 = 0.8;
pub const DEFAULT_HISTORY_CAPACITY: usize = 24;
pub const DEFAULT_REGRESSION_WINDOW: usize = 24;
pub const DEFAULT_EVENT_WINDOW: usize = 2;
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.5;

const ENV_PREFIX: &str = "BPMSYNC";

#[derive(Debug)]
pub enum ConfigError {
    /// Smoothing factor outside the open interval (0, 1)
    InvalidSmoothingFactor(f64),
    /// BPM history capacity below one
    InvalidHistoryCapacity(i64),
    /// Clock event window below two
    InvalidEventWindow(i64),
    /// Regression window below two
    InvalidRegressionWindow(i64),
    /// Regression evaluation ratio outside [0, 1]
    InvalidRegressionRatio(f64),
    /// Timeout not strictly positive
    InvalidTimeout(f64),
    /// Regression span negative or not finite
    InvalidRegressionSpan(f64),
    /// Calibration offset not finite
    InvalidCalibrationOffset(f64),
    /// The settings file or environment could not be read
    Source(::config::ConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSmoothingFactor(v) => {
                write!(f, "smoothing factor must be in (0, 1), got {}", v)
            }
            ConfigError::InvalidHistoryCapacity(v) => {
                write!(f, "history capacity must be at least 1, got {}", v)
            }
            ConfigError::InvalidEventWindow(v) => {
                write!(f, "clock event window must be at least 2, got {}", v)
            }
            ConfigError::InvalidRegressionWindow(v) => {
                write!(f, "regression window must be at least 2, got {}", v)
            }
            ConfigError::InvalidRegressionRatio(v) => {
                write!(f, "regression ratio must be in [0, 1], got {}", v)
            }
            ConfigError::InvalidTimeout(v) => {
                write!(f, "timeout must be a positive number of seconds, got {}", v)
            }
            ConfigError::InvalidRegressionSpan(v) => {
                write!(f, "regression span must be zero or positive, got {}", v)
            }
            ConfigError::InvalidCalibrationOffset(v) => {
                write!(f, "calibration offset must be finite, got {}", v)
            }
            ConfigError::Source(e) => write!(f, "configuration source error: {}", e),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Source(e) => Some(e),
            _ => None,
        }
    }
}

impl From<::config::ConfigError> for ConfigError {
    fn from(e: ::config::ConfigError) -> Self {
        ConfigError::Source(e)
    }
}

/// Tuning of the BPM pipeline and the clock activity arbiter.
///
/// Fixed once the clock core is built.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Weight of the newest value in the exponential smoother
    pub smoothing_factor: f64,
    /// Run instantaneous BPM through the smoother before the regression
    pub smooth_raw_bpm: bool,
    /// Number of denoised values in the final moving average
    pub history_capacity: usize,
    /// Number of pulse timestamps kept by the event log
    pub event_window: usize,
    /// Silence after which the external clock is considered gone
    pub timeout: Duration,
    /// Where inside the regression window the fitted line is read
    pub regression_ratio: f64,
    /// Number of samples in the regression window
    pub regression_window: usize,
    /// Maximum time span of the regression window, unbounded when `None`
    pub regression_span: Option<Duration>,
    /// Added to every instantaneous BPM value
    pub calibration_offset: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            smooth_raw_bpm: false,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            event_window: DEFAULT_EVENT_WINDOW,
            timeout: DEFAULT_TIMEOUT,
            regression_ratio: DEFAULT_REGRESSION_RATIO,
            regression_window: DEFAULT_REGRESSION_WINDOW,
            regression_span: None,
            calibration_offset: DEFAULT_CALIBRATION_OFFSET,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor < 1.0) {
            return Err(ConfigError::InvalidSmoothingFactor(self.smoothing_factor));
        }
        if self.history_capacity < 1 {
            return Err(ConfigError::InvalidHistoryCapacity(
                self.history_capacity as i64,
            ));
        }
        if self.event_window < 2 {
            return Err(ConfigError::InvalidEventWindow(self.event_window as i64));
        }
        if self.regression_window < 2 {
            return Err(ConfigError::InvalidRegressionWindow(
                self.regression_window as i64,
            ));
        }
        if !(0.0..=1.0).contains(&self.regression_ratio) {
            return Err(ConfigError::InvalidRegressionRatio(self.regression_ratio));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(0.0));
        }
        if !self.calibration_offset.is_finite() {
            return Err(ConfigError::InvalidCalibrationOffset(
                self.calibration_offset,
            ));
        }
        Ok(())
    }

    /// Loads defaults, then the optional settings file, then `BPMSYNC_*`
    /// environment variables, and validates the result
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let mut builder = Settings::builder()
            .set_default("smoothing_factor", defaults.smoothing_factor)?
            .set_default("smooth_raw_bpm", defaults.smooth_raw_bpm)?
            .set_default("history_capacity", defaults.history_capacity as i64)?
            .set_default("event_window", defaults.event_window as i64)?
            .set_default("timeout_secs", defaults.timeout.as_secs_f64())?
            .set_default("regression_ratio", defaults.regression_ratio)?
            .set_default("regression_window", defaults.regression_window as i64)?
            .set_default("regression_span_secs", 0.0)?
            .set_default("calibration_offset", defaults.calibration_offset)?;

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));

        let settings = builder.build()?;
        let config = Self::from_settings(&settings)?;
        config.validate()?;
        debug!("Engine configuration: {:?}", config);
        Ok(config)
    }

    fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let history_capacity = settings.get_int("history_capacity")?;
        if history_capacity < 1 {
            return Err(ConfigError::InvalidHistoryCapacity(history_capacity));
        }
        let event_window = settings.get_int("event_window")?;
        if event_window < 2 {
            return Err(ConfigError::InvalidEventWindow(event_window));
        }
        let regression_window = settings.get_int("regression_window")?;
        if regression_window < 2 {
            return Err(ConfigError::InvalidRegressionWindow(regression_window));
        }
        let timeout_secs = settings.get_float("timeout_secs")?;
        let timeout =
            seconds_to_duration(timeout_secs).ok_or(ConfigError::InvalidTimeout(timeout_secs))?;

        Ok(Self {
            smoothing_factor: settings.get_float("smoothing_factor")?,
            smooth_raw_bpm: settings.get_bool("smooth_raw_bpm")?,
            history_capacity: history_capacity as usize,
            event_window: event_window as usize,
            timeout,
            regression_ratio: settings.get_float("regression_ratio")?,
            regression_window: regression_window as usize,
            regression_span: parse_span(settings.get_float("regression_span_secs")?)?,
            calibration_offset: settings.get_float("calibration_offset")?,
        })
    }

    /// Timeout overridden by a number of seconds, as given on the command line
    pub fn with_timeout_secs(mut self, secs: f64) -> Result<Self, ConfigError> {
        self.timeout = seconds_to_duration(secs).ok_or(ConfigError::InvalidTimeout(secs))?;
        Ok(self)
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// The longest inter-pulse interval still treated as a running clock
    pub fn max_pulse_interval(&self) -> Duration {
        self.timeout
    }
}

fn seconds_to_duration(secs: f64) -> Option<Duration> {
    if secs.is_finite() && secs > 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}

fn parse_span(secs: f64) -> Result<Option<Duration>, ConfigError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ConfigError::InvalidRegressionSpan(secs));
    }
    Ok((secs > 0.0).then(|| Duration::from_secs_f64(secs)))
}
