//! Control → Stage Parameter Mapping
//!
//! The user-facing controls are a handful of gains; several of them move more
//! than one stage parameter. These rules live here as pure functions so the
//! engine setters stay thin.

use contour_dsp::resonance_db_to_q;

/// Shelf and mid gains are limited to ±15 dB
pub const GAIN_RANGE_DB: f32 = 15.0;

/// Nominal low shelf corner (Hz)
pub const LOW_SHELF_CORNER_HZ: f32 = 100.0;

/// High shelf corner (Hz)
pub const HIGH_SHELF_CORNER_HZ: f32 = 3000.0;

/// Cutoff the paired lowpass reaches at the deepest high shelf cut (Hz)
pub const LOWPASS_FLOOR_HZ: f32 = 8000.0;

/// Lowpass resonance (dB)
pub const LOWPASS_RESONANCE_DB: f32 = -2.0;

/// Default mid band center (Hz)
pub const MID_DEFAULT_HZ: f32 = 1500.0;

/// Fixed mid band Q: a broad bell
pub const MID_Q: f32 = 0.5;

/// Mid frequency slider range (Hz)
pub const MID_FREQUENCY_RANGE: (f32, f32) = (120.0, 7500.0);

/// Clamp a shelf/mid gain into the supported range
pub fn clamp_gain(gain_db: f32) -> f32 {
    gain_db.clamp(-GAIN_RANGE_DB, GAIN_RANGE_DB)
}

/// Low shelf corner for a given shelf gain
///
/// Boosts keep the nominal corner. Cuts follow the original formula,
/// `100 + 100 * gain / -15`, so the corner rises as the cut deepens and
/// reaches 200Hz at -15 dB. It does not move down.
pub fn low_shelf_corner(gain_db: f32) -> f32 {
    if gain_db < 0.0 {
        LOW_SHELF_CORNER_HZ + (LOW_SHELF_CORNER_HZ * gain_db) / -GAIN_RANGE_DB
    } else {
        LOW_SHELF_CORNER_HZ
    }
}

/// Cutoff of the lowpass paired with the high shelf
///
/// Sits at `max_frequency` for boosts and pulls down linearly toward 8kHz as
/// the shelf cuts, reaching it at -15 dB. Never above `max_frequency`.
pub fn lowpass_cutoff(gain_db: f32, max_frequency: f32) -> f32 {
    let cutoff = if gain_db < 0.0 {
        max_frequency - (gain_db * (max_frequency - LOWPASS_FLOOR_HZ)) / -GAIN_RANGE_DB
    } else {
        max_frequency
    };
    cutoff.min(max_frequency)
}

/// Linear Q of the paired lowpass
pub fn lowpass_q() -> f32 {
    resonance_db_to_q(LOWPASS_RESONANCE_DB)
}

/// Mid frequency slider position for `freq` (sliders move in octaves)
pub fn frequency_to_slider(freq: f32) -> f32 {
    freq.log2()
}

/// Frequency for a mid slider position
pub fn slider_to_frequency(position: f32) -> f32 {
    2.0_f32.powf(position)
}

/// Slider bounds as positions
pub fn slider_range() -> (f32, f32) {
    (
        frequency_to_slider(MID_FREQUENCY_RANGE.0),
        frequency_to_slider(MID_FREQUENCY_RANGE.1),
    )
}

/// Label for a frequency readout: "440Hz", "1.50kHz"
pub fn format_frequency(freq: f32) -> String {
    if freq < 1000.0 {
        format!("{}Hz", freq.floor() as i64)
    } else {
        format!("{:.2}kHz", freq / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_clamping() {
        assert_eq!(clamp_gain(100.0), 15.0);
        assert_eq!(clamp_gain(-100.0), -15.0);
        assert_eq!(clamp_gain(3.5), 3.5);
    }

    #[test]
    fn test_low_shelf_corner_continuous_at_zero() {
        assert_eq!(low_shelf_corner(0.0), LOW_SHELF_CORNER_HZ);
        assert!((low_shelf_corner(-1e-4) - LOW_SHELF_CORNER_HZ).abs() < 1e-2);
        assert_eq!(low_shelf_corner(12.0), LOW_SHELF_CORNER_HZ);
    }

    #[test]
    fn test_low_shelf_corner_rises_with_cut_depth() {
        let mut previous = low_shelf_corner(0.0);
        let mut gain = -0.5;
        while gain >= -15.0 {
            let corner = low_shelf_corner(gain);
            assert!(corner > previous, "corner rises as the cut deepens");
            previous = corner;
            gain -= 0.5;
        }
        assert!((low_shelf_corner(-15.0) - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_lowpass_cutoff_continuous_at_zero() {
        assert_eq!(lowpass_cutoff(0.0, 22050.0), 22050.0);
        assert!((lowpass_cutoff(-1e-4, 22050.0) - 22050.0).abs() < 1.0);
        assert_eq!(lowpass_cutoff(6.0, 20000.0), 20000.0);
    }

    #[test]
    fn test_lowpass_cutoff_decreases_with_cut() {
        let mut previous = lowpass_cutoff(0.0, 22050.0);
        let mut gain = -0.5;
        while gain >= -15.0 {
            let cutoff = lowpass_cutoff(gain, 22050.0);
            assert!(cutoff < previous);
            assert!(cutoff >= LOWPASS_FLOOR_HZ - 1e-2);
            previous = cutoff;
            gain -= 0.5;
        }
        assert!((lowpass_cutoff(-15.0, 22050.0) - LOWPASS_FLOOR_HZ).abs() < 1e-2);
    }

    #[test]
    fn test_lowpass_cutoff_below_floor_rate() {
        // Nyquist under 8kHz: the cut must not push the cutoff past the bound
        assert_eq!(lowpass_cutoff(-15.0, 5512.5), 5512.5);
    }

    #[test]
    fn test_lowpass_q_has_no_sharp_peak() {
        let q = lowpass_q();
        assert!(q > 0.7 && q < 0.8, "q = {}", q);
    }

    #[test]
    fn test_slider_mapping() {
        let pos = frequency_to_slider(MID_DEFAULT_HZ);
        assert!((slider_to_frequency(pos) - MID_DEFAULT_HZ).abs() < 0.01);

        let (lo, hi) = slider_range();
        assert!((slider_to_frequency(lo) - 120.0).abs() < 0.01);
        assert!((slider_to_frequency(hi) - 7500.0).abs() < 0.1);
        assert!(lo < pos && pos < hi);
    }

    #[test]
    fn test_format_frequency() {
        assert_eq!(format_frequency(440.7), "440Hz");
        assert_eq!(format_frequency(999.9), "999Hz");
        assert_eq!(format_frequency(1500.0), "1.50kHz");
        assert_eq!(format_frequency(7500.0), "7.50kHz");
    }
}
