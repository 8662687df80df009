//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Invalid filter coefficients for frequency {frequency}Hz at sample rate {sample_rate}Hz")]
    InvalidCoefficients { frequency: f32, sample_rate: f32 },

    #[error("Sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("Invalid frequency range: {min}Hz to {max}Hz (need 0 < min < max)")]
    InvalidFrequencyRange { min: f32, max: f32 },

    #[error("Frequency grid needs at least one tick")]
    EmptyGrid,

    #[error("Buffer size mismatch: expected {expected}, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },

    #[error("Invalid analyzer configuration: {0}")]
    InvalidConfig(String),
}
