//! Filter Kinds and Parameters

use biquad::Q_BUTTERWORTH_F32;

/// The five filter primitives an equalizer chain is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    LowShelf,
    Peaking,
    HighShelf,
    Lowpass,
    Highpass,
}

impl FilterKind {
    /// Human-readable name for debugging/UI
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::LowShelf => "low shelf",
            FilterKind::Peaking => "peaking",
            FilterKind::HighShelf => "high shelf",
            FilterKind::Lowpass => "lowpass",
            FilterKind::Highpass => "highpass",
        }
    }

    /// Whether the gain parameter affects this kind's response
    pub fn uses_gain(self) -> bool {
        matches!(
            self,
            FilterKind::LowShelf | FilterKind::Peaking | FilterKind::HighShelf
        )
    }
}

/// Convert a resonance expressed in dB to a linear Q
///
/// Lowpass/highpass resonance is quoted in dB: 0 dB is Q = 1, negative values
/// soften the corner.
pub fn resonance_db_to_q(resonance_db: f32) -> f32 {
    10.0_f32.powf(resonance_db / 20.0)
}

/// Parameters of a single filter stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Corner / center frequency in Hz
    pub frequency: f32,
    /// Gain in dB (shelf and peaking kinds only)
    pub gain_db: f32,
    /// Linear quality factor
    pub q: f32,
}

impl FilterParams {
    pub fn new(frequency: f32, gain_db: f32, q: f32) -> Self {
        Self {
            frequency,
            gain_db,
            q,
        }
    }

    /// Flat parameters at `frequency` with a Butterworth Q (~0.707)
    pub fn at(frequency: f32) -> Self {
        Self::new(frequency, 0.0, Q_BUTTERWORTH_F32)
    }

    pub fn with_frequency(self, frequency: f32) -> Self {
        Self { frequency, ..self }
    }

    pub fn with_gain(self, gain_db: f32) -> Self {
        Self { gain_db, ..self }
    }

    pub fn with_q(self, q: f32) -> Self {
        Self { q, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resonance_conversion() {
        assert!((resonance_db_to_q(0.0) - 1.0).abs() < 1e-6);
        let q = resonance_db_to_q(-2.0);
        assert!((q - 0.794_328).abs() < 1e-5);
    }

    #[test]
    fn test_params_builders() {
        let params = FilterParams::at(100.0).with_gain(-3.0).with_q(0.5);
        assert_eq!(params.frequency, 100.0);
        assert_eq!(params.gain_db, -3.0);
        assert_eq!(params.q, 0.5);
        assert_eq!(params.with_frequency(200.0).gain_db, -3.0);
    }

    #[test]
    fn test_gain_usage_by_kind() {
        assert!(FilterKind::LowShelf.uses_gain());
        assert!(FilterKind::Peaking.uses_gain());
        assert!(FilterKind::HighShelf.uses_gain());
        assert!(!FilterKind::Lowpass.uses_gain());
        assert!(!FilterKind::Highpass.uses_gain());
    }
}
