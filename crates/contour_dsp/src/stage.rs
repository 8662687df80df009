//! Filter Stages
//!
//! A `FilterStage` is one live filter primitive in the equalizer chain. It
//! owns its coefficients and per-channel delay lines, filters audio, and
//! reports its own complex frequency response. The engine only talks to the
//! trait, so it does not care how a stage designs its coefficients.
//!
//! Coefficients follow the RBJ (Robert Bristow-Johnson) Audio EQ Cookbook via
//! the `biquad` crate; the fixed highpass is a first-order bilinear design.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};

use crate::error::DspError;
use crate::filter::{FilterKind, FilterParams};
use crate::response::{evaluate_biquad, FrequencyResponse};

/// Corner frequency of the fixed first-order highpass (Hz)
pub const HIGHPASS_CORNER_HZ: f32 = 80.0;

/// One filter primitive with typed parameters and a response query
///
/// # Real-time Safety
/// `process_sample()` must not allocate. `configure()` may be called between
/// buffers; it swaps coefficients without clearing the delay lines.
pub trait FilterStage: Send {
    fn kind(&self) -> FilterKind;

    fn params(&self) -> FilterParams;

    fn sample_rate(&self) -> f32;

    /// Redesign the stage for `params`
    ///
    /// On error the stage keeps its previous parameters and coefficients.
    fn configure(&mut self, params: FilterParams) -> Result<(), DspError>;

    /// Magnitude and phase at each of `frequencies`
    fn frequency_response(
        &self,
        frequencies: &[f32],
        response: &mut FrequencyResponse,
    ) -> Result<(), DspError>;

    /// Filter one stereo sample pair
    fn process_sample(&mut self, left: f32, right: f32) -> (f32, f32);

    /// Clear delay lines
    fn reset(&mut self);

    fn set_frequency(&mut self, frequency: f32) -> Result<(), DspError> {
        let params = self.params().with_frequency(frequency);
        self.configure(params)
    }

    fn set_gain(&mut self, gain_db: f32) -> Result<(), DspError> {
        let params = self.params().with_gain(gain_db);
        self.configure(params)
    }

    fn set_q(&mut self, q: f32) -> Result<(), DspError> {
        let params = self.params().with_q(q);
        self.configure(params)
    }
}

/// Left/right filter state sharing one coefficient set
struct StereoFilter {
    // DirectForm2Transposed: better numerical stability than DF1
    left: DirectForm2Transposed<f32>,
    right: DirectForm2Transposed<f32>,
}

impl StereoFilter {
    fn new(coeffs: Coefficients<f32>) -> Self {
        Self {
            left: DirectForm2Transposed::<f32>::new(coeffs),
            right: DirectForm2Transposed::<f32>::new(coeffs),
        }
    }

    fn update(&mut self, coeffs: Coefficients<f32>) {
        self.left.update_coefficients(coeffs);
        self.right.update_coefficients(coeffs);
    }

    #[inline]
    fn run(&mut self, left: f32, right: f32) -> (f32, f32) {
        (self.left.run(left), self.right.run(right))
    }

    fn reset(&mut self) {
        self.left.reset_state();
        self.right.reset_state();
    }
}

fn validate_sample_rate(sample_rate: f32) -> Result<(), DspError> {
    if sample_rate > 0.0 && sample_rate.is_finite() {
        Ok(())
    } else {
        Err(DspError::InvalidSampleRate(sample_rate))
    }
}

fn constant(gain: f32) -> Coefficients<f32> {
    Coefficients {
        a1: 0.0,
        a2: 0.0,
        b0: gain,
        b1: 0.0,
        b2: 0.0,
    }
}

/// Second-order stage: shelves, peaking band, lowpass, highpass
pub struct BiquadStage {
    kind: FilterKind,
    params: FilterParams,
    sample_rate: f32,
    coefficients: Coefficients<f32>,
    filter: StereoFilter,
}

impl BiquadStage {
    pub fn new(kind: FilterKind, params: FilterParams, sample_rate: f32) -> Result<Self, DspError> {
        let coefficients = Self::design(kind, params, sample_rate)?;
        Ok(Self {
            kind,
            params,
            sample_rate,
            coefficients,
            filter: StereoFilter::new(coefficients),
        })
    }

    /// Generate BiQuad coefficients for `kind` at `params`
    ///
    /// At or above Nyquist a lowpass degenerates to a pass-through and a
    /// highpass to silence, rather than an unstable design.
    pub fn design(
        kind: FilterKind,
        params: FilterParams,
        sample_rate: f32,
    ) -> Result<Coefficients<f32>, DspError> {
        validate_sample_rate(sample_rate)?;

        let invalid = || DspError::InvalidCoefficients {
            frequency: params.frequency,
            sample_rate,
        };
        if !(params.frequency > 0.0 && params.q > 0.0 && params.gain_db.is_finite()) {
            return Err(invalid());
        }

        if 2.0 * params.frequency >= sample_rate {
            return match kind {
                FilterKind::Lowpass => Ok(constant(1.0)),
                FilterKind::Highpass => Ok(constant(0.0)),
                _ => Err(invalid()),
            };
        }

        let filter = match kind {
            FilterKind::LowShelf => Type::LowShelf(params.gain_db),
            FilterKind::Peaking => Type::PeakingEQ(params.gain_db),
            FilterKind::HighShelf => Type::HighShelf(params.gain_db),
            FilterKind::Lowpass => Type::LowPass,
            FilterKind::Highpass => Type::HighPass,
        };

        Coefficients::<f32>::from_params(filter, sample_rate.hz(), params.frequency.hz(), params.q)
            .map_err(|_| invalid())
    }

    pub fn coefficients(&self) -> &Coefficients<f32> {
        &self.coefficients
    }
}

impl FilterStage for BiquadStage {
    fn kind(&self) -> FilterKind {
        self.kind
    }

    fn params(&self) -> FilterParams {
        self.params
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn configure(&mut self, params: FilterParams) -> Result<(), DspError> {
        let coefficients = Self::design(self.kind, params, self.sample_rate)?;
        self.filter.update(coefficients);
        self.coefficients = coefficients;
        self.params = params;
        Ok(())
    }

    fn frequency_response(
        &self,
        frequencies: &[f32],
        response: &mut FrequencyResponse,
    ) -> Result<(), DspError> {
        evaluate_biquad(&self.coefficients, self.sample_rate, frequencies, response)
    }

    #[inline]
    fn process_sample(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.filter.run(left, right)
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}

/// First-order highpass, the bilinear transform of `H(s) = s / (s + w)`
///
/// Only the corner frequency is meaningful; gain and Q are carried in the
/// parameter set but ignored by the design.
pub struct FirstOrderHighpass {
    params: FilterParams,
    sample_rate: f32,
    coefficients: Coefficients<f32>,
    filter: StereoFilter,
}

impl FirstOrderHighpass {
    pub fn new(corner_hz: f32, sample_rate: f32) -> Result<Self, DspError> {
        let params = FilterParams::at(corner_hz);
        let coefficients = Self::design(corner_hz, sample_rate)?;
        Ok(Self {
            params,
            sample_rate,
            coefficients,
            filter: StereoFilter::new(coefficients),
        })
    }

    /// Coefficients for a corner at `corner_hz`
    ///
    /// `w = 2 pi fc`, `k = w / tan(w / (2 fs))`; numerator `[k, -k]`,
    /// denominator `[k + w, w - k]`, normalized by `a0 = k + w`.
    pub fn design(corner_hz: f32, sample_rate: f32) -> Result<Coefficients<f32>, DspError> {
        validate_sample_rate(sample_rate)?;
        if !(corner_hz > 0.0 && 2.0 * corner_hz < sample_rate) {
            return Err(DspError::InvalidCoefficients {
                frequency: corner_hz,
                sample_rate,
            });
        }

        let omega = 2.0 * std::f64::consts::PI * f64::from(corner_hz);
        let k = omega / (omega / (2.0 * f64::from(sample_rate))).tan();
        let a0 = k + omega;

        Ok(Coefficients {
            a1: ((omega - k) / a0) as f32,
            a2: 0.0,
            b0: (k / a0) as f32,
            b1: (-k / a0) as f32,
            b2: 0.0,
        })
    }

    pub fn coefficients(&self) -> &Coefficients<f32> {
        &self.coefficients
    }
}

impl FilterStage for FirstOrderHighpass {
    fn kind(&self) -> FilterKind {
        FilterKind::Highpass
    }

    fn params(&self) -> FilterParams {
        self.params
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn configure(&mut self, params: FilterParams) -> Result<(), DspError> {
        let coefficients = Self::design(params.frequency, self.sample_rate)?;
        self.filter.update(coefficients);
        self.coefficients = coefficients;
        self.params = params;
        Ok(())
    }

    fn frequency_response(
        &self,
        frequencies: &[f32],
        response: &mut FrequencyResponse,
    ) -> Result<(), DspError> {
        evaluate_biquad(&self.coefficients, self.sample_rate, frequencies, response)
    }

    #[inline]
    fn process_sample(&mut self, left: f32, right: f32) -> (f32, f32) {
        self.filter.run(left, right)
    }

    fn reset(&mut self) {
        self.filter.reset();
    }
}
