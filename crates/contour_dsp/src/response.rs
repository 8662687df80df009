//! Frequency Response Math
//!
//! Evaluates a biquad transfer function on the unit circle and accumulates
//! per-stage responses into a decibel curve.
//!
//! Stages in series multiply in linear magnitude, so their responses add in
//! the dB domain. The curve is therefore a plain point-wise sum.

use biquad::Coefficients;
use rustfft::num_complex::Complex;

use crate::error::DspError;

/// Smallest magnitude fed to the logarithm (-200 dB)
pub const MAGNITUDE_FLOOR: f32 = 1e-10;

/// Convert a linear magnitude to decibels
///
/// Zero, negative and NaN magnitudes are clamped to `MAGNITUDE_FLOOR`, so the
/// result is always finite.
#[inline]
pub fn magnitude_to_db(magnitude: f32) -> f32 {
    // f32::max returns the non-NaN operand
    20.0 * magnitude.max(MAGNITUDE_FLOOR).log10()
}

/// Convert dB gain to linear amplitude
/// Formula: amplitude = 10^(dB/20)
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Magnitude (linear) and phase (radians) of one stage over a set of frequencies
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyResponse {
    pub magnitudes: Vec<f32>,
    pub phases: Vec<f32>,
}

impl FrequencyResponse {
    /// Zeroed response buffers for `len` frequencies
    pub fn with_len(len: usize) -> Self {
        Self {
            magnitudes: vec![0.0; len],
            phases: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    fn magnitudes_db(&self) -> impl Iterator<Item = f32> + '_ {
        self.magnitudes.iter().map(|&m| magnitude_to_db(m))
    }
}

/// Evaluate `H(e^jw)` for a normalized biquad at each frequency
///
/// `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)` with
/// `w = 2 pi f / fs`. Computed in f64 and narrowed on store.
pub fn evaluate_biquad(
    coeffs: &Coefficients<f32>,
    sample_rate: f32,
    frequencies: &[f32],
    response: &mut FrequencyResponse,
) -> Result<(), DspError> {
    if response.magnitudes.len() != frequencies.len() {
        return Err(DspError::BufferSizeMismatch {
            expected: frequencies.len(),
            got: response.magnitudes.len(),
        });
    }
    if response.phases.len() != frequencies.len() {
        return Err(DspError::BufferSizeMismatch {
            expected: frequencies.len(),
            got: response.phases.len(),
        });
    }
    if !(sample_rate > 0.0) {
        return Err(DspError::InvalidSampleRate(sample_rate));
    }

    let b0 = f64::from(coeffs.b0);
    let b1 = f64::from(coeffs.b1);
    let b2 = f64::from(coeffs.b2);
    let a1 = f64::from(coeffs.a1);
    let a2 = f64::from(coeffs.a2);
    let fs = f64::from(sample_rate);

    let bins = response.magnitudes.iter_mut().zip(response.phases.iter_mut());
    for (&freq, (magnitude, phase)) in frequencies.iter().zip(bins) {
        let omega = 2.0 * std::f64::consts::PI * f64::from(freq) / fs;
        let z1 = Complex::from_polar(1.0, -omega);
        let z2 = z1 * z1;

        let numerator = z1 * b1 + z2 * b2 + b0;
        let denominator = z1 * a1 + z2 * a2 + 1.0;
        let h = numerator / denominator;

        *magnitude = h.norm() as f32;
        *phase = h.arg() as f32;
    }

    Ok(())
}

/// Aggregate response curve in decibels, one value per grid tick
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    db: Vec<f32>,
}

impl ResponseCurve {
    /// A curve of `len` points at 0 dB
    pub fn flat(len: usize) -> Self {
        Self { db: vec![0.0; len] }
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.db
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.db.iter().copied()
    }

    /// Reset every point to 0 dB
    pub fn clear(&mut self) {
        self.db.fill(0.0);
    }

    /// Add one stage's magnitude response, converted to dB, point-wise
    pub fn accumulate(&mut self, response: &FrequencyResponse) -> Result<(), DspError> {
        if response.len() != self.db.len() {
            return Err(DspError::BufferSizeMismatch {
                expected: self.db.len(),
                got: response.len(),
            });
        }
        for (point, db) in self.db.iter_mut().zip(response.magnitudes_db()) {
            *point += db;
        }
        Ok(())
    }

    /// Largest deviation from 0 dB anywhere on the curve
    pub fn max_deviation(&self) -> f32 {
        self.db.iter().fold(0.0_f32, |acc, v| acc.max(v.abs()))
    }
}

impl std::ops::Index<usize> for ResponseCurve {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.db[index]
    }
}

impl AsRef<[f32]> for ResponseCurve {
    fn as_ref(&self) -> &[f32] {
        &self.db
    }
}
