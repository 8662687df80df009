//! Contour Core - Equalizer Engine
//!
//! This crate wires the filter stages from `contour_dsp` into the equalizer:
//! - Explicit audio context with a suspended/running/closed lifecycle
//! - Signal path routing with a switchable highpass entry stage
//! - Mapping from user controls to stage parameters
//! - Aggregate response curve, recomputed on every control change
//! - Control messages for driving the engine from another thread
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        UI Thread                            │
//! │   controls ──crossbeam──▶ Engine        CurveHandle ──▶ draw│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                           │
//! │   input ──▶ [highpass] ──▶ shelves/peak/lowpass ──▶ output  │
//! │                 (Zero allocation in this path)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod chain;
mod config;
mod context;
mod engine;
mod error;
mod mapping;
mod message;

pub use chain::EntryStage;
pub use config::EqualizerConfig;
pub use context::{AudioContext, ContextState};
pub use engine::{CurveHandle, EqualizerEngine};
pub use error::{EngineError, EngineResult};
pub use mapping::{
    clamp_gain, format_frequency, frequency_to_slider, low_shelf_corner, lowpass_cutoff,
    lowpass_q, slider_range, slider_to_frequency, GAIN_RANGE_DB, HIGH_SHELF_CORNER_HZ,
    LOWPASS_FLOOR_HZ, LOWPASS_RESONANCE_DB, LOW_SHELF_CORNER_HZ, MID_DEFAULT_HZ,
    MID_FREQUENCY_RANGE, MID_Q,
};
pub use message::{control_channel, Control, EqualizerState, CONTROL_QUEUE_CAPACITY};

// Re-export DSP types for convenience
pub use contour_dsp::{
    AnalyzerConfig, AudioProcessor, FilterKind, FilterParams, FilterStage, FrequencyGrid,
    ProcessContext, ResponseCurve, SpectrumAnalyzer,
};
