use crate::config::ConfigError;

/// Single-value exponential smoothing filter.
///
/// `alpha` weights the newest input: `value = alpha * input + (1 - alpha) * value`.
/// The first input seeds the filter unchanged.
#[derive(Debug, Clone)]
pub struct ExponentialSmoother {
    alpha: f64,
    value: Option<f64>,
}

impl ExponentialSmoother {
    pub fn new(alpha: f64) -> Result<Self, ConfigError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ConfigError::InvalidSmoothingFactor(alpha));
        }
        Ok(Self { alpha, value: None })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn apply(&mut self, input: f64) -> f64 {
        let next = match self.value {
            Some(prev) => self.alpha * input + (1.0 - self.alpha) * prev,
            None => input,
        };
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}
