//! Engine Error Types

use thiserror::Error;

/// Errors that can occur in the equalizer engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("DSP error: {0}")]
    DspError(#[from] contour_dsp::DspError),

    #[error("Audio context is closed")]
    ContextClosed,

    #[error("Invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Channel receive error - sender dropped")]
    ChannelRecvError,
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
