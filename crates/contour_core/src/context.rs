//! Audio Context
//!
//! Process-wide audio state (sample rate, suspended/running) passed around
//! explicitly instead of living in a global. A context starts suspended, is
//! resumed on the first user interaction, and is closed once on shutdown.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

/// Lifecycle state of an audio context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

/// Explicit audio context handed to everything that needs the sample rate
#[derive(Debug)]
pub struct AudioContext {
    sample_rate: f32,
    state: ContextState,
}

impl AudioContext {
    /// Create a suspended context at `sample_rate` Hz
    pub fn new(sample_rate: f32) -> EngineResult<Self> {
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(contour_dsp::DspError::InvalidSampleRate(sample_rate).into());
        }
        info!(sample_rate, "Audio context created (suspended)");
        Ok(Self {
            sample_rate,
            state: ContextState::Suspended,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Half the sample rate
    pub fn nyquist(&self) -> f32 {
        self.sample_rate / 2.0
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Resume a suspended context
    ///
    /// Returns true if the state changed. Resuming a running context is a
    /// no-op; resuming a closed one is an error.
    pub fn resume(&mut self) -> EngineResult<bool> {
        match self.state {
            ContextState::Suspended => {
                self.state = ContextState::Running;
                info!("Audio context resumed");
                Ok(true)
            }
            ContextState::Running => Ok(false),
            ContextState::Closed => Err(EngineError::ContextClosed),
        }
    }

    /// Suspend a running context
    pub fn suspend(&mut self) -> EngineResult<bool> {
        match self.state {
            ContextState::Running => {
                self.state = ContextState::Suspended;
                debug!("Audio context suspended");
                Ok(true)
            }
            ContextState::Suspended => Ok(false),
            ContextState::Closed => Err(EngineError::ContextClosed),
        }
    }

    /// Tear the context down; closing twice is harmless
    pub fn close(&mut self) {
        if self.state != ContextState::Closed {
            self.state = ContextState::Closed;
            info!("Audio context closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_starts_suspended() {
        let ctx = AudioContext::new(48000.0).unwrap();
        assert_eq!(ctx.state(), ContextState::Suspended);
        assert_eq!(ctx.sample_rate(), 48000.0);
        assert_eq!(ctx.nyquist(), 24000.0);
    }

    #[test]
    fn test_invalid_sample_rate() {
        assert!(AudioContext::new(0.0).is_err());
        assert!(AudioContext::new(-44100.0).is_err());
        assert!(AudioContext::new(f32::NAN).is_err());
    }

    #[test]
    fn test_lifecycle() {
        let mut ctx = AudioContext::new(44100.0).unwrap();
        assert!(ctx.resume().unwrap());
        assert!(!ctx.resume().unwrap(), "Second resume is a no-op");
        assert_eq!(ctx.state(), ContextState::Running);

        assert!(ctx.suspend().unwrap());
        assert!(!ctx.suspend().unwrap());

        ctx.close();
        ctx.close();
        assert_eq!(ctx.state(), ContextState::Closed);
        assert!(matches!(ctx.resume(), Err(EngineError::ContextClosed)));
        assert!(matches!(ctx.suspend(), Err(EngineError::ContextClosed)));
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ContextState::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }
}
