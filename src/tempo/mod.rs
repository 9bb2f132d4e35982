//! Tempo estimation from MIDI clock pulse timestamps
//!
//! The pipeline runs once per received pulse:
//! - [`ClockEventLog`] turns raw timestamps into an inter-pulse delta
//! - [`TimebaseConverter`] maps the delta to microseconds
//! - [`instantaneous_bpm`] converts the interval to a provisional BPM
//! - [`RegressionEstimator`] fits a trend over recent samples to remove jitter
//! - [`MovingAverager`] averages the denoised values for display
//!
//! [`BpmEngine`] owns all of the above and only reports a reading when its
//! two-decimal rendering changes.

mod averager;
mod engine;
mod event_log;
mod regression;
mod smoother;
mod timebase;

pub use averager::MovingAverager;
pub use engine::{instantaneous_bpm, BpmEngine, BpmReading, EdgeTrigger};
pub use event_log::ClockEventLog;
pub use regression::{BpmSample, LinearFit, RegressionEstimator};
pub use smoother::ExponentialSmoother;
pub use timebase::{
    FixedTimebase, MicrosecondTimebase, TimebaseConverter, TimebaseError, TimebaseRatio,
    TimebaseSource,
};

/// Monotonic tick count (platform timer units) at which a clock byte arrived
pub type ClockPulse = u64;

/// MIDI standard PPQ (Pulses Per Quarter note)
pub const TICKS_PER_BEAT: u32 = 24;

/// Additive correction for the systematic bias of the pulse timer
pub const DEFAULT_CALIBRATION_OFFSET: f64 = 0.055;
