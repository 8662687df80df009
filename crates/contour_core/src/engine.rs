//! Equalizer Engine - Main Entry Point
//!
//! The `EqualizerEngine` owns the five filter stages, routes audio through
//! the active ones, and keeps the aggregate response curve up to date.
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────┐
//!  input ──┬▶│ highpass │──┐            (EntryStage::Highpass)
//!          │ └──────────┘  ▼
//!          └──────────▶ low shelf ─▶ peaking ─▶ high shelf ─▶ lowpass ─▶ × output gain ─▶ output
//!                       (EntryStage::LowShelf)
//! ```
//!
//! Every setter reconfigures the live stage and recomputes the curve before
//! returning, so `frequency_response()` is a plain read. The curve is the
//! dB sum of the responses of exactly the stages on the active path; output
//! gain is a flat scalar and never enters it.
//!
//! Readers on other threads get a `CurveHandle`, which hands out immutable
//! `Arc` snapshots swapped in under a short write lock after each recompute.

use std::sync::Arc;

use contour_dsp::{
    db_to_gain, AudioProcessor, BiquadStage, FilterKind, FilterParams, FilterStage,
    FirstOrderHighpass, FrequencyGrid, FrequencyResponse, ProcessContext, ResponseCurve,
    HIGHPASS_CORNER_HZ, MAX_FREQ,
};
use crossbeam_channel::{Receiver, TryRecvError};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::chain::EntryStage;
use crate::config::EqualizerConfig;
use crate::context::{AudioContext, ContextState};
use crate::error::{EngineError, EngineResult};
use crate::mapping::{
    clamp_gain, low_shelf_corner, lowpass_cutoff, lowpass_q, HIGH_SHELF_CORNER_HZ,
    LOW_SHELF_CORNER_HZ, MID_DEFAULT_HZ, MID_Q,
};
use crate::message::{Control, EqualizerState};

/// The fixed set of stages; only their parameters change
struct Stages {
    highpass: FirstOrderHighpass,
    low_shelf: BiquadStage,
    peaking: BiquadStage,
    high_shelf: BiquadStage,
    lowpass: BiquadStage,
}

impl Stages {
    fn new(sample_rate: f32, lowpass_frequency: f32) -> EngineResult<Self> {
        Ok(Self {
            highpass: FirstOrderHighpass::new(HIGHPASS_CORNER_HZ, sample_rate)?,
            low_shelf: BiquadStage::new(
                FilterKind::LowShelf,
                FilterParams::at(LOW_SHELF_CORNER_HZ),
                sample_rate,
            )?,
            peaking: BiquadStage::new(
                FilterKind::Peaking,
                FilterParams::at(MID_DEFAULT_HZ).with_q(MID_Q),
                sample_rate,
            )?,
            high_shelf: BiquadStage::new(
                FilterKind::HighShelf,
                FilterParams::at(HIGH_SHELF_CORNER_HZ),
                sample_rate,
            )?,
            lowpass: BiquadStage::new(
                FilterKind::Lowpass,
                FilterParams::at(lowpass_frequency).with_q(lowpass_q()),
                sample_rate,
            )?,
        })
    }

    fn get(&self, kind: FilterKind) -> &dyn FilterStage {
        match kind {
            FilterKind::Highpass => &self.highpass,
            FilterKind::LowShelf => &self.low_shelf,
            FilterKind::Peaking => &self.peaking,
            FilterKind::HighShelf => &self.high_shelf,
            FilterKind::Lowpass => &self.lowpass,
        }
    }

    fn get_mut(&mut self, kind: FilterKind) -> &mut dyn FilterStage {
        match kind {
            FilterKind::Highpass => &mut self.highpass,
            FilterKind::LowShelf => &mut self.low_shelf,
            FilterKind::Peaking => &mut self.peaking,
            FilterKind::HighShelf => &mut self.high_shelf,
            FilterKind::Lowpass => &mut self.lowpass,
        }
    }

    fn reset(&mut self) {
        // BiquadStage is also an AudioProcessor, so name the trait
        FilterStage::reset(&mut self.highpass);
        FilterStage::reset(&mut self.low_shelf);
        FilterStage::reset(&mut self.peaking);
        FilterStage::reset(&mut self.high_shelf);
        FilterStage::reset(&mut self.lowpass);
    }
}

/// Sum the dB responses of `path` over `frequencies` into `curve`
fn aggregate(
    stages: &Stages,
    path: &[FilterKind],
    frequencies: &[f32],
    scratch: &mut FrequencyResponse,
    curve: &mut ResponseCurve,
) -> EngineResult<()> {
    curve.clear();
    for &kind in path {
        stages.get(kind).frequency_response(frequencies, scratch)?;
        curve.accumulate(scratch)?;
    }
    Ok(())
}

fn require_finite(name: &'static str, value: f32) -> EngineResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        warn!(parameter = name, value, "Rejected non-finite control value");
        Err(EngineError::InvalidParameter { name, value })
    }
}

/// Cloneable, thread-safe reader of the latest response curve
#[derive(Clone)]
pub struct CurveHandle {
    inner: Arc<RwLock<Arc<ResponseCurve>>>,
}

impl CurveHandle {
    fn new(curve: ResponseCurve) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(curve))),
        }
    }

    /// The most recently published curve
    pub fn snapshot(&self) -> Arc<ResponseCurve> {
        Arc::clone(&self.inner.read())
    }

    fn publish(&self, curve: ResponseCurve) {
        *self.inner.write() = Arc::new(curve);
    }
}

/// The parametric equalizer
///
/// Holds the filter stages and the cached response curve.
/// Designed for real-time use: no allocations in `process_*()`.
pub struct EqualizerEngine {
    sample_rate: f32,
    /// Upper bound of the paired lowpass; independent of the curve's grid
    lowpass_ceiling: f32,
    grid: FrequencyGrid,
    stages: Stages,
    entry: EntryStage,
    output_gain_db: f32,
    output_gain: f32,
    scratch: FrequencyResponse,
    curve: ResponseCurve,
    published: CurveHandle,
}

impl EqualizerEngine {
    /// Create an engine with flat settings and the highpass switched out
    pub fn new(context: &AudioContext, config: EqualizerConfig) -> EngineResult<Self> {
        if context.state() == ContextState::Closed {
            return Err(EngineError::ContextClosed);
        }
        config.validate().map_err(EngineError::ConfigError)?;

        let sample_rate = context.sample_rate();
        let (min_frequency, max_frequency) = config.frequency_bounds(sample_rate);
        let grid = FrequencyGrid::new(config.ticks, min_frequency, max_frequency)?;
        let lowpass_ceiling = MAX_FREQ.min(sample_rate / 2.0);
        let stages = Stages::new(sample_rate, lowpass_cutoff(0.0, lowpass_ceiling))?;

        let mut engine = Self {
            sample_rate,
            lowpass_ceiling,
            stages,
            entry: EntryStage::default(),
            output_gain_db: 0.0,
            output_gain: 1.0,
            scratch: FrequencyResponse::with_len(grid.len()),
            curve: ResponseCurve::flat(grid.len()),
            published: CurveHandle::new(ResponseCurve::flat(grid.len())),
            grid,
        };
        engine.update_frequency_response()?;

        info!(
            sample_rate,
            ticks = engine.grid.len(),
            min_frequency,
            max_frequency = engine.grid.max_frequency(),
            "Equalizer engine created"
        );
        Ok(engine)
    }

    /// Switch the highpass in front of the low shelf, or take it out
    pub fn set_highpass_enabled(&mut self, enabled: bool) -> EngineResult<()> {
        let entry = EntryStage::from_highpass_enabled(enabled);
        if entry == self.entry {
            return Ok(());
        }
        if entry == EntryStage::Highpass {
            // Don't replay whatever was left in the delay lines last time
            self.stages.highpass.reset();
        }
        self.entry = entry;
        debug!(?entry, "Rerouted equalizer input");
        self.update_frequency_response()
    }

    /// Set the low shelf gain; cuts also move the shelf corner
    pub fn set_low_shelf_gain(&mut self, gain_db: f32) -> EngineResult<()> {
        let gain_db = clamp_gain(require_finite("low shelf gain", gain_db)?);
        let params = self
            .stages
            .low_shelf
            .params()
            .with_gain(gain_db)
            .with_frequency(low_shelf_corner(gain_db));
        self.stages.low_shelf.configure(params)?;
        self.update_frequency_response()
    }

    /// Set the mid band center frequency
    pub fn set_mid_frequency(&mut self, frequency: f32) -> EngineResult<()> {
        let frequency = require_finite("mid frequency", frequency)?;
        self.stages.peaking.set_frequency(frequency)?;
        self.update_frequency_response()
    }

    /// Set the mid band gain
    pub fn set_mid_gain(&mut self, gain_db: f32) -> EngineResult<()> {
        let gain_db = clamp_gain(require_finite("mid gain", gain_db)?);
        self.stages.peaking.set_gain(gain_db)?;
        self.update_frequency_response()
    }

    /// Set the high shelf gain; cuts also pull the paired lowpass down
    pub fn set_high_shelf_gain(&mut self, gain_db: f32) -> EngineResult<()> {
        let gain_db = clamp_gain(require_finite("high shelf gain", gain_db)?);
        let cutoff = lowpass_cutoff(gain_db, self.lowpass_ceiling);

        // Design both before touching either, so a failure leaves them paired
        let shelf = self.stages.high_shelf.params().with_gain(gain_db);
        let lowpass = self.stages.lowpass.params().with_frequency(cutoff);
        BiquadStage::design(FilterKind::HighShelf, shelf, self.sample_rate)?;
        BiquadStage::design(FilterKind::Lowpass, lowpass, self.sample_rate)?;

        self.stages.high_shelf.configure(shelf)?;
        self.stages.lowpass.configure(lowpass)?;
        self.update_frequency_response()
    }

    /// Set the post-chain output gain
    ///
    /// A flat scalar: it does not touch the response curve.
    pub fn set_output_gain(&mut self, gain_db: f32) -> EngineResult<()> {
        let gain_db = require_finite("output gain", gain_db)?;
        self.output_gain_db = gain_db;
        self.output_gain = db_to_gain(gain_db);
        Ok(())
    }

    /// Apply one control message
    pub fn apply(&mut self, control: Control) -> EngineResult<()> {
        debug!(?control, "Applying control");
        match control {
            Control::HighpassEnabled(enabled) => self.set_highpass_enabled(enabled),
            Control::LowShelfGain(db) => self.set_low_shelf_gain(db),
            Control::MidFrequency(hz) => self.set_mid_frequency(hz),
            Control::MidGain(db) => self.set_mid_gain(db),
            Control::HighShelfGain(db) => self.set_high_shelf_gain(db),
            Control::OutputGain(db) => self.set_output_gain(db),
        }
    }

    /// Apply every control waiting in `receiver`
    ///
    /// Controls that fail are logged and skipped. Returns how many were
    /// applied, or `ChannelRecvError` once the senders are gone and the
    /// queue is empty.
    pub fn apply_pending(&mut self, receiver: &Receiver<Control>) -> EngineResult<usize> {
        let mut applied = 0;
        loop {
            match receiver.try_recv() {
                Ok(control) => match self.apply(control) {
                    Ok(()) => applied += 1,
                    Err(e) => warn!(?control, "Dropped control: {}", e),
                },
                Err(TryRecvError::Empty) => return Ok(applied),
                Err(TryRecvError::Disconnected) if applied == 0 => {
                    return Err(EngineError::ChannelRecvError)
                }
                Err(TryRecvError::Disconnected) => return Ok(applied),
            }
        }
    }

    /// The cached response curve in dB, one value per grid tick
    pub fn frequency_response(&self) -> &ResponseCurve {
        &self.curve
    }

    /// A reader for other threads, updated after every recompute
    pub fn curve_handle(&self) -> CurveHandle {
        self.published.clone()
    }

    /// Response of the active path at arbitrary frequencies
    pub fn evaluate(&self, frequencies: &[f32]) -> EngineResult<ResponseCurve> {
        let mut scratch = FrequencyResponse::with_len(frequencies.len());
        let mut curve = ResponseCurve::flat(frequencies.len());
        aggregate(
            &self.stages,
            self.entry.signal_path(),
            frequencies,
            &mut scratch,
            &mut curve,
        )?;
        Ok(curve)
    }

    fn update_frequency_response(&mut self) -> EngineResult<()> {
        aggregate(
            &self.stages,
            self.entry.signal_path(),
            self.grid.as_slice(),
            &mut self.scratch,
            &mut self.curve,
        )?;
        self.published.publish(self.curve.clone());
        Ok(())
    }

    /// Current control values (for UI state sync)
    pub fn state(&self) -> EqualizerState {
        EqualizerState {
            entry_stage: self.entry,
            low_shelf_gain_db: self.stages.low_shelf.params().gain_db,
            mid_frequency_hz: self.stages.peaking.params().frequency,
            mid_gain_db: self.stages.peaking.params().gain_db,
            high_shelf_gain_db: self.stages.high_shelf.params().gain_db,
            output_gain_db: self.output_gain_db,
        }
    }

    pub fn grid(&self) -> &FrequencyGrid {
        &self.grid
    }

    pub fn entry_stage(&self) -> EntryStage {
        self.entry
    }

    pub fn highpass_enabled(&self) -> bool {
        self.entry.highpass_enabled()
    }

    /// Stages audio currently flows through, in order
    pub fn signal_path(&self) -> &'static [FilterKind] {
        self.entry.signal_path()
    }

    /// Read-only access to a stage, active or not
    pub fn stage(&self, kind: FilterKind) -> &dyn FilterStage {
        self.stages.get(kind)
    }

    /// Linear output gain multiplier
    pub fn output_gain(&self) -> f32 {
        self.output_gain
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Process a stereo sample pair through the active path
    ///
    /// # Real-time Safety
    /// This function performs NO allocations and NO syscalls.
    #[inline]
    pub fn process_sample(&mut self, left: f32, right: f32) -> (f32, f32) {
        let (mut l, mut r) = (left, right);
        for &kind in self.entry.signal_path() {
            (l, r) = self.stages.get_mut(kind).process_sample(l, r);
        }
        (l * self.output_gain, r * self.output_gain)
    }

    /// Process an interleaved stereo buffer in-place
    ///
    /// Buffer format: [L0, R0, L1, R1, L2, R2, ...]
    #[inline]
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        for frame in buffer.chunks_exact_mut(2) {
            let (l, r) = self.process_sample(frame[0], frame[1]);
            frame[0] = l;
            frame[1] = r;
        }
    }

    /// Process separate left/right channel buffers
    ///
    /// # Panics
    /// Panics if buffers have different lengths (debug builds only)
    #[inline]
    pub fn process_planar(&mut self, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len(), "Channel buffers must be same length");

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (new_l, new_r) = self.process_sample(*l, *r);
            *l = new_l;
            *r = new_r;
        }
    }

    /// Reset filter state (clear delay lines)
    ///
    /// Call when switching audio sources to prevent filter ringing
    pub fn reset(&mut self) {
        self.stages.reset();
    }
}

impl AudioProcessor for EqualizerEngine {
    fn process(&mut self, buffer: &mut [f32], _context: &ProcessContext) {
        self.process_interleaved(buffer);
    }

    fn reset(&mut self) {
        EqualizerEngine::reset(self);
    }

    fn name(&self) -> &'static str {
        "Parametric Equalizer"
    }
}
