//! Contour DSP - Digital Signal Processing Module
//!
//! This crate provides the filter primitives behind the Contour equalizer:
//! - Filter stages (shelves, peaking band, lowpass, first-order highpass)
//!   that filter audio and report their complex frequency response
//! - A shared logarithmic frequency grid for response curves
//! - dB response accumulation with a magnitude floor
//! - FFT spectrum analyzer for real-time visualization
//!
//! # Architecture
//!
//! Every stage implements [`FilterStage`], so an engine can aggregate
//! responses and route audio without knowing how coefficients are designed.
//! Filter coefficients are updated between buffer processing calls.

mod error;
mod filter;
mod grid;
mod processor;
mod response;
mod spectrum;
mod stage;

pub use error::DspError;
pub use filter::{resonance_db_to_q, FilterKind, FilterParams};
pub use grid::{FrequencyGrid, DEFAULT_TICKS, MAX_FREQ, MIN_FREQ};
pub use processor::{AudioProcessor, ProcessContext};
pub use response::{
    db_to_gain, evaluate_biquad, magnitude_to_db, FrequencyResponse, ResponseCurve,
    MAGNITUDE_FLOOR,
};
pub use spectrum::{AnalyzerConfig, SpectrumAnalyzer, FFT_SIZE, MAX_DECIBELS, MIN_DECIBELS, SMOOTHING};
pub use stage::{BiquadStage, FilterStage, FirstOrderHighpass, HIGHPASS_CORNER_HZ};
