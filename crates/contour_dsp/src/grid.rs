//! Logarithmic Frequency Grid
//!
//! The fixed set of query frequencies shared by every filter stage, so that
//! per-stage responses can be summed point-wise. Ticks are evenly spaced in
//! log10 space, giving the curve uniform resolution per octave.

use crate::error::DspError;

/// Lowest frequency shown on the curve (Hz)
pub const MIN_FREQ: f32 = 20.0;

/// Upper frequency bound before Nyquist clamping (Hz)
pub const MAX_FREQ: f32 = 22050.0;

/// Default number of ticks on the grid
pub const DEFAULT_TICKS: usize = 256;

/// Immutable, strictly increasing set of log-spaced frequencies
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyGrid {
    frequencies: Box<[f32]>,
    log_min: f64,
    log_max: f64,
}

impl FrequencyGrid {
    /// Build a grid of `ticks` frequencies from `min_freq` to `max_freq` inclusive
    pub fn new(ticks: usize, min_freq: f32, max_freq: f32) -> Result<Self, DspError> {
        if ticks == 0 {
            return Err(DspError::EmptyGrid);
        }
        if !(min_freq > 0.0 && max_freq > min_freq && max_freq.is_finite()) {
            return Err(DspError::InvalidFrequencyRange {
                min: min_freq,
                max: max_freq,
            });
        }

        let log_min = f64::from(min_freq).log10();
        let log_max = f64::from(max_freq).log10();
        let span = (ticks - 1).max(1) as f64;

        let mut frequencies: Box<[f32]> = (0..ticks)
            .map(|i| {
                let t = i as f64 / span;
                10.0_f64.powf(log_min + (log_max - log_min) * t) as f32
            })
            .collect();

        // Pin endpoints so rounding never moves them off the requested bounds
        frequencies[0] = min_freq;
        if ticks > 1 {
            frequencies[ticks - 1] = max_freq;
        }

        Ok(Self {
            frequencies,
            log_min,
            log_max,
        })
    }

    /// Grid spanning `MIN_FREQ` up to `MAX_FREQ` or Nyquist, whichever is lower
    pub fn audible(ticks: usize, sample_rate: f32) -> Result<Self, DspError> {
        if !(sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(sample_rate));
        }
        Self::new(ticks, MIN_FREQ, MAX_FREQ.min(sample_rate / 2.0))
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Always false: construction rejects empty grids
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.frequencies
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.frequencies.iter().copied()
    }

    pub fn min_frequency(&self) -> f32 {
        self.frequencies[0]
    }

    pub fn max_frequency(&self) -> f32 {
        self.frequencies[self.frequencies.len() - 1]
    }

    /// Normalized log position of `freq` on the grid (0.0 at min, 1.0 at max)
    ///
    /// Not clamped: frequencies outside the grid map outside `[0, 1]`.
    pub fn position(&self, freq: f32) -> f32 {
        let span = self.log_max - self.log_min;
        ((f64::from(freq).log10() - self.log_min) / span) as f32
    }

    /// Index of the tick nearest to `freq` in log space
    pub fn index_of(&self, freq: f32) -> usize {
        let last = self.frequencies.len() - 1;
        if !(freq > 0.0) {
            return 0;
        }
        let scaled = self.position(freq) * last as f32;
        (scaled.round().max(0.0) as usize).min(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_endpoints_and_length() {
        let grid = FrequencyGrid::new(256, 20.0, 20000.0).unwrap();
        assert_eq!(grid.len(), 256);
        assert_eq!(grid.min_frequency(), 20.0);
        assert_eq!(grid.max_frequency(), 20000.0);
    }

    #[test]
    fn test_grid_strictly_increasing() {
        for &(ticks, min, max) in &[
            (2, 20.0, 20000.0),
            (256, 20.0, 22050.0),
            (1024, 10.0, 24000.0),
            (37, 100.0, 101.0),
        ] {
            let grid = FrequencyGrid::new(ticks, min, max).unwrap();
            for pair in grid.as_slice().windows(2) {
                assert!(pair[1] > pair[0], "{} !> {}", pair[1], pair[0]);
            }
        }
    }

    #[test]
    fn test_grid_is_log_spaced() {
        let grid = FrequencyGrid::new(4, 10.0, 10000.0).unwrap();
        let expected = [10.0, 100.0, 1000.0, 10000.0];
        for (f, e) in grid.iter().zip(expected) {
            assert!((f - e).abs() / e < 1e-5, "{} vs {}", f, e);
        }
    }

    #[test]
    fn test_single_tick_grid() {
        let grid = FrequencyGrid::new(1, 20.0, 20000.0).unwrap();
        assert_eq!(grid.as_slice(), &[20.0]);
        assert_eq!(grid.index_of(15000.0), 0);
    }

    #[test]
    fn test_invalid_grids() {
        assert_eq!(FrequencyGrid::new(0, 20.0, 20000.0), Err(DspError::EmptyGrid));
        assert!(FrequencyGrid::new(16, 0.0, 20000.0).is_err());
        assert!(FrequencyGrid::new(16, 200.0, 100.0).is_err());
        assert!(FrequencyGrid::new(16, 100.0, 100.0).is_err());
        assert!(FrequencyGrid::new(16, 20.0, f32::INFINITY).is_err());
        assert!(FrequencyGrid::new(16, f32::NAN, 100.0).is_err());
    }

    #[test]
    fn test_audible_grid_clamps_to_nyquist() {
        let grid = FrequencyGrid::audible(DEFAULT_TICKS, 32000.0).unwrap();
        assert_eq!(grid.max_frequency(), 16000.0);

        let grid = FrequencyGrid::audible(DEFAULT_TICKS, 96000.0).unwrap();
        assert_eq!(grid.max_frequency(), MAX_FREQ);

        assert!(FrequencyGrid::audible(DEFAULT_TICKS, 0.0).is_err());
    }

    #[test]
    fn test_index_of_nearest_tick() {
        let grid = FrequencyGrid::new(256, 20.0, 20000.0).unwrap();
        assert_eq!(grid.index_of(20.0), 0);
        assert_eq!(grid.index_of(5.0), 0);
        assert_eq!(grid.index_of(20000.0), 255);
        assert_eq!(grid.index_of(96000.0), 255);

        let i = grid.index_of(1000.0);
        let f = grid.as_slice()[i];
        // Neighbouring ticks are ~2.7% apart
        assert!((f - 1000.0).abs() / 1000.0 < 0.02, "nearest tick {}", f);
    }

    #[test]
    fn test_position() {
        let grid = FrequencyGrid::new(64, 10.0, 1000.0).unwrap();
        assert!((grid.position(10.0)).abs() < 1e-6);
        assert!((grid.position(100.0) - 0.5).abs() < 1e-6);
        assert!((grid.position(1000.0) - 1.0).abs() < 1e-6);
    }
}
