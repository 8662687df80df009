//! Control Messages
//!
//! Controls flow from the UI thread to whichever thread owns the engine.
//! Each control maps one-to-one onto an engine setter.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::chain::EntryStage;

/// Default capacity of the control channel
pub const CONTROL_QUEUE_CAPACITY: usize = 32;

/// A single user control change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "control", content = "value", rename_all = "snake_case")]
pub enum Control {
    /// Switch the 80Hz highpass in or out of the signal path
    HighpassEnabled(bool),

    /// Low shelf gain in dB
    LowShelfGain(f32),

    /// Mid band center frequency in Hz
    MidFrequency(f32),

    /// Mid band gain in dB
    MidGain(f32),

    /// High shelf gain in dB (also moves the paired lowpass)
    HighShelfGain(f32),

    /// Post-chain output gain in dB
    OutputGain(f32),
}

/// Snapshot of every control value (for UI state sync)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqualizerState {
    pub entry_stage: EntryStage,
    pub low_shelf_gain_db: f32,
    pub mid_frequency_hz: f32,
    pub mid_gain_db: f32,
    pub high_shelf_gain_db: f32,
    pub output_gain_db: f32,
}

impl EqualizerState {
    pub fn highpass_enabled(&self) -> bool {
        self.entry_stage.highpass_enabled()
    }

    /// Controls that reproduce this state on a fresh engine
    pub fn to_controls(&self) -> [Control; 6] {
        [
            Control::HighpassEnabled(self.highpass_enabled()),
            Control::LowShelfGain(self.low_shelf_gain_db),
            Control::MidFrequency(self.mid_frequency_hz),
            Control::MidGain(self.mid_gain_db),
            Control::HighShelfGain(self.high_shelf_gain_db),
            Control::OutputGain(self.output_gain_db),
        ]
    }
}

/// Bounded channel for controls: UI side sends, engine side drains
pub fn control_channel() -> (Sender<Control>, Receiver<Control>) {
    bounded(CONTROL_QUEUE_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_serialization() {
        let json = serde_json::to_string(&Control::MidGain(3.5)).unwrap();
        assert_eq!(json, r#"{"control":"mid_gain","value":3.5}"#);

        let control: Control =
            serde_json::from_str(r#"{"control":"highpass_enabled","value":true}"#).unwrap();
        assert_eq!(control, Control::HighpassEnabled(true));
    }

    #[test]
    fn test_state_to_controls() {
        let state = EqualizerState {
            entry_stage: EntryStage::Highpass,
            low_shelf_gain_db: 2.0,
            mid_frequency_hz: 800.0,
            mid_gain_db: -1.0,
            high_shelf_gain_db: 0.0,
            output_gain_db: -3.0,
        };
        let controls = state.to_controls();
        assert_eq!(controls[0], Control::HighpassEnabled(true));
        assert_eq!(controls[5], Control::OutputGain(-3.0));
    }

    #[test]
    fn test_channel_delivers_in_order() {
        let (tx, rx) = control_channel();
        tx.send(Control::MidGain(1.0)).unwrap();
        tx.send(Control::MidGain(2.0)).unwrap();
        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received, vec![Control::MidGain(1.0), Control::MidGain(2.0)]);
    }
}
