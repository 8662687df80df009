//! Equalizer Configuration

use contour_dsp::{DEFAULT_TICKS, MAX_FREQ, MIN_FREQ};
use serde::{Deserialize, Serialize};

/// Construction-time configuration of the equalizer engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualizerConfig {
    /// Number of points on the response curve
    pub ticks: usize,

    /// Lowest frequency on the curve in Hz
    pub min_frequency: f32,

    /// Highest frequency on the curve in Hz (None = 22050Hz)
    ///
    /// Always clamped to the context's Nyquist frequency.
    pub max_frequency: Option<f32>,
}

impl Default for EqualizerConfig {
    fn default() -> Self {
        Self {
            ticks: DEFAULT_TICKS,
            min_frequency: MIN_FREQ,
            max_frequency: None,
        }
    }
}

impl EqualizerConfig {
    /// Default bounds with a custom tick count (e.g. one per pixel column)
    pub fn with_ticks(ticks: usize) -> Self {
        Self {
            ticks,
            ..Default::default()
        }
    }

    /// Resolve `(min, max)` curve bounds for a given sample rate
    pub fn frequency_bounds(&self, sample_rate: f32) -> (f32, f32) {
        let max = self.max_frequency.unwrap_or(MAX_FREQ).min(sample_rate / 2.0);
        (self.min_frequency, max)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.ticks == 0 || self.ticks > 65536 {
            return Err(format!("Invalid tick count: {}", self.ticks));
        }
        if !(self.min_frequency > 0.0 && self.min_frequency.is_finite()) {
            return Err(format!("Invalid minimum frequency: {}", self.min_frequency));
        }
        if let Some(max) = self.max_frequency {
            if !(max > self.min_frequency && max.is_finite()) {
                return Err(format!(
                    "Invalid maximum frequency: {} (minimum is {})",
                    max, self.min_frequency
                ));
            }
        }
        Ok(())
    }
}
