use log::{debug, warn};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Nanoseconds per platform tick, expressed as `numer / denom`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimebaseRatio {
    pub numer: u32,
    pub denom: u32,
}

impl TimebaseRatio {
    pub const UNAVAILABLE: TimebaseRatio = TimebaseRatio { numer: 0, denom: 0 };

    pub fn new(numer: u32, denom: u32) -> Self {
        Self { numer, denom }
    }

    pub fn is_available(&self) -> bool {
        self.numer != 0 && self.denom != 0
    }
}

/// Supplies the tick-to-nanosecond calibration of a platform timer
pub trait TimebaseSource: Send + Sync {
    /// Returns the current ratio; a zero denominator means "not available yet"
    fn query(&self) -> TimebaseRatio;
}

/// Ticks are already microseconds (midir input timestamps)
#[derive(Debug, Default, Clone, Copy)]
pub struct MicrosecondTimebase;

impl TimebaseSource for MicrosecondTimebase {
    fn query(&self) -> TimebaseRatio {
        TimebaseRatio::new(1_000, 1)
    }
}

/// A timebase with an explicitly provided ratio
#[derive(Debug, Clone, Copy)]
pub struct FixedTimebase(pub TimebaseRatio);

impl TimebaseSource for FixedTimebase {
    fn query(&self) -> TimebaseRatio {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimebaseError {
    /// The calibration ratio could not be obtained from the source
    Unavailable,
}

impl fmt::Display for TimebaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimebaseError::Unavailable => write!(f, "timebase calibration unavailable"),
        }
    }
}

impl Error for TimebaseError {}

/// Converts platform tick counts into microseconds.
///
/// The ratio is queried once and cached. While the cached ratio is
/// unavailable every conversion re-queries the source, so a timer that
/// becomes calibrated later is picked up without rebuilding the converter.
pub struct TimebaseConverter {
    source: Arc<dyn TimebaseSource>,
    cached: TimebaseRatio,
}

impl fmt::Debug for TimebaseConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimebaseConverter")
            .field("cached", &self.cached)
            .finish()
    }
}

impl TimebaseConverter {
    pub fn new(source: Arc<dyn TimebaseSource>) -> Self {
        let cached = source.query();
        if !cached.is_available() {
            warn!("Timebase calibration not available yet, will retry on first use");
        }
        Self { source, cached }
    }

    pub fn ratio(&self) -> TimebaseRatio {
        self.cached
    }

    fn ensure_ratio(&mut self) -> Result<TimebaseRatio, TimebaseError> {
        if !self.cached.is_available() {
            self.cached = self.source.query();
            if !self.cached.is_available() {
                debug!("Timebase still unavailable, skipping conversion");
                return Err(TimebaseError::Unavailable);
            }
            debug!(
                "Timebase calibrated: {}/{} ns per tick",
                self.cached.numer, self.cached.denom
            );
        }
        Ok(self.cached)
    }

    /// Converts a tick count (absolute or delta) into microseconds
    pub fn to_micros(&mut self, ticks: u64) -> Result<f64, TimebaseError> {
        let ratio = self.ensure_ratio()?;
        let nanos = ticks as f64 * f64::from(ratio.numer) / f64::from(ratio.denom);
        Ok(nanos / 1_000.0)
    }
}
