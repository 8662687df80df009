//! FFT Spectrum Analyzer
//!
//! Provides live FFT magnitude analysis of the equalizer output for drawing
//! underneath the response curve. The audio side pushes samples through
//! `&self`; the UI side calls `update()` once per frame and reads the latest
//! spectrum in decibels or as 0-255 bytes scaled between the configured
//! decibel bounds.
//!
//! # Architecture
//!
//! Samples land in a ring buffer guarded by a short lock. An atomic counter
//! tracks how many arrived since the last transform so `update()` can skip
//! frames with no new data.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::DspError;
use crate::response::magnitude_to_db;

/// Default FFT size (must be power of 2)
/// 2048 samples at 48kHz = ~42ms window, ~23Hz resolution
pub const FFT_SIZE: usize = 2048;

/// Default lower bound of the byte-scaled range
pub const MIN_DECIBELS: f32 = -96.0;

/// Default upper bound of the byte-scaled range
pub const MAX_DECIBELS: f32 = -10.0;

/// Default smoothing between successive frames (0.0 = none)
pub const SMOOTHING: f32 = 0.8;

/// Analyzer settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    pub fft_size: usize,
    pub min_decibels: f32,
    pub max_decibels: f32,
    pub smoothing: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: FFT_SIZE,
            min_decibels: MIN_DECIBELS,
            max_decibels: MAX_DECIBELS,
            smoothing: SMOOTHING,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), DspError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(DspError::InvalidConfig(format!(
                "fft size must be a power of two >= 32, got {}",
                self.fft_size
            )));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(DspError::InvalidConfig(format!(
                "decibel range {}..{} is empty",
                self.min_decibels, self.max_decibels
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(DspError::InvalidConfig(format!(
                "smoothing must be within 0..=1, got {}",
                self.smoothing
            )));
        }
        Ok(())
    }
}

/// Hann window coefficient
/// Hann window reduces spectral leakage in FFT analysis
fn hann_window(n: usize, size: usize) -> f32 {
    0.5 * (1.0 - (2.0 * std::f32::consts::PI * n as f32 / (size - 1) as f32).cos())
}

/// Mono ring buffer of the most recent `fft_size` samples
struct SampleRing {
    samples: Vec<f32>,
    write_pos: usize,
}

impl SampleRing {
    #[inline]
    fn push(&mut self, sample: f32) {
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.samples.len();
    }

    fn clear(&mut self) {
        self.samples.fill(0.0);
        self.write_pos = 0;
    }
}

/// Spectrum analyzer that computes a smoothed FFT magnitude spectrum
///
/// Thread-safe design:
/// - Audio thread writes samples via `push_sample()` / `push_interleaved()`
/// - UI thread calls `update()` and reads the spectrum
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    sample_rate: f32,
    ring: Mutex<SampleRing>,
    /// Number of samples written since last FFT
    samples_since_fft: AtomicU32,
    /// Samples needed before computing next FFT
    samples_per_fft: u32,
    /// Flag indicating new spectrum data is available
    spectrum_ready: AtomicBool,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    /// Working buffer for the in-place FFT
    scratch: Mutex<Vec<Complex<f32>>>,
    /// Smoothed linear magnitudes, one per bin
    magnitudes: RwLock<Vec<f32>>,
    /// Smoothed magnitudes in dB, one per bin
    decibels: RwLock<Vec<f32>>,
}

impl SpectrumAnalyzer {
    /// Create a new spectrum analyzer
    ///
    /// # Arguments
    /// * `config` - FFT size, decibel bounds and smoothing
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fps` - Target update rate for spectrum
    pub fn new(config: AnalyzerConfig, sample_rate: f32, fps: u32) -> Result<Self, DspError> {
        config.validate()?;
        if !(sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(sample_rate));
        }

        let size = config.fft_size;
        let bins = size / 2;
        let samples_per_fft = ((sample_rate / fps.max(1) as f32) as u32).max(1);

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        Ok(Self {
            config,
            sample_rate,
            ring: Mutex::new(SampleRing {
                samples: vec![0.0; size],
                write_pos: 0,
            }),
            samples_since_fft: AtomicU32::new(0),
            samples_per_fft,
            spectrum_ready: AtomicBool::new(false),
            window: (0..size).map(|i| hann_window(i, size)).collect(),
            fft,
            scratch: Mutex::new(vec![Complex::new(0.0, 0.0); size]),
            magnitudes: RwLock::new(vec![0.0; bins]),
            decibels: RwLock::new(vec![magnitude_to_db(0.0); bins]),
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Number of frequency bins (half the FFT size)
    pub fn frequency_bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    /// Center frequency of bin `index` in Hz
    pub fn bin_frequency(&self, index: usize) -> f32 {
        index as f32 * self.sample_rate / self.config.fft_size as f32
    }

    /// Push a stereo sample pair to the analyzer (mixed to mono)
    #[inline]
    pub fn push_sample(&self, left: f32, right: f32) {
        self.ring.lock().push((left + right) * 0.5);
        self.mark_written(1);
    }

    /// Push an interleaved stereo buffer: [L0, R0, L1, R1, ...]
    pub fn push_interleaved(&self, buffer: &[f32]) {
        let mut ring = self.ring.lock();
        let mut frames = 0;
        for frame in buffer.chunks_exact(2) {
            ring.push((frame[0] + frame[1]) * 0.5);
            frames += 1;
        }
        drop(ring);
        self.mark_written(frames);
    }

    fn mark_written(&self, count: u32) {
        let total = self.samples_since_fft.fetch_add(count, Ordering::Relaxed) + count;
        if total >= self.samples_per_fft {
            self.spectrum_ready.store(true, Ordering::Release);
        }
    }

    /// Compute a new spectrum if enough samples arrived since the last one
    ///
    /// Call this from the UI thread at your desired frame rate.
    /// Returns true if spectrum was updated.
    pub fn update(&self) -> bool {
        if !self.spectrum_ready.swap(false, Ordering::Acquire) {
            return false;
        }
        self.samples_since_fft.store(0, Ordering::Relaxed);
        self.analyze();
        true
    }

    /// Transform the current ring contents unconditionally
    pub fn analyze(&self) {
        let size = self.config.fft_size;
        let mut scratch = self.scratch.lock();

        {
            let ring = self.ring.lock();
            // Oldest sample first
            for (i, slot) in scratch.iter_mut().enumerate() {
                let sample = ring.samples[(ring.write_pos + i) % size];
                *slot = Complex::new(sample * self.window[i], 0.0);
            }
        }

        self.fft.process(&mut scratch);

        let tau = self.config.smoothing;
        let scale = 1.0 / size as f32;
        let mut magnitudes = self.magnitudes.write();
        let mut decibels = self.decibels.write();
        for ((smoothed, db), bin) in magnitudes.iter_mut().zip(decibels.iter_mut()).zip(scratch.iter()) {
            let current = bin.norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * current;
            *db = magnitude_to_db(*smoothed);
        }
    }

    /// Copy the spectrum in dB into `out` (up to `frequency_bin_count()` values)
    pub fn float_frequency_data(&self, out: &mut [f32]) {
        let decibels = self.decibels.read();
        let n = out.len().min(decibels.len());
        out[..n].copy_from_slice(&decibels[..n]);
    }

    /// Copy the spectrum scaled to 0-255 between the decibel bounds into `out`
    pub fn byte_frequency_data(&self, out: &mut [u8]) {
        let decibels = self.decibels.read();
        let range = self.config.max_decibels - self.config.min_decibels;
        for (byte, &db) in out.iter_mut().zip(decibels.iter()) {
            let scaled = 255.0 * (db - self.config.min_decibels) / range;
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }
    }

    /// Snapshot of the spectrum in dB
    pub fn decibels(&self) -> Vec<f32> {
        self.decibels.read().clone()
    }

    /// Reset the analyzer state
    pub fn reset(&self) {
        self.ring.lock().clear();
        self.samples_since_fft.store(0, Ordering::Relaxed);
        self.spectrum_ready.store(false, Ordering::Relaxed);
        self.magnitudes.write().fill(0.0);
        self.decibels.write().fill(magnitude_to_db(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(analyzer: &SpectrumAnalyzer, freq: f32, amplitude: f32, count: usize) {
        for i in 0..count {
            let t = i as f32 / 48000.0;
            let sample = (2.0 * std::f32::consts::PI * freq * t).sin() * amplitude;
            analyzer.push_sample(sample, sample);
        }
    }

    fn argmax(values: &[f32]) -> usize {
        values
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
            .0
    }

    #[test]
    fn test_analyzer_creation() {
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default(), 48000.0, 30).unwrap();
        assert_eq!(analyzer.frequency_bin_count(), FFT_SIZE / 2);

        let mut bytes = vec![1u8; analyzer.frequency_bin_count()];
        analyzer.byte_frequency_data(&mut bytes);
        assert!(bytes.iter().all(|&b| b == 0), "Should start silent");
    }

    #[test]
    fn test_invalid_config() {
        let config = AnalyzerConfig {
            fft_size: 1000,
            ..Default::default()
        };
        assert!(SpectrumAnalyzer::new(config, 48000.0, 30).is_err());

        let config = AnalyzerConfig {
            min_decibels: -10.0,
            max_decibels: -96.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyzerConfig {
            smoothing: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(SpectrumAnalyzer::new(AnalyzerConfig::default(), 0.0, 30).is_err());
    }

    #[test]
    fn test_update_waits_for_samples() {
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default(), 48000.0, 30).unwrap();
        assert!(!analyzer.update(), "No samples yet");

        sine(&analyzer, 1000.0, 0.5, 48000 / 30);
        assert!(analyzer.update());
        assert!(!analyzer.update(), "Nothing new since last update");
    }

    #[test]
    fn test_sine_peak_bin() {
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default(), 48000.0, 30).unwrap();
        sine(&analyzer, 1000.0, 0.5, FFT_SIZE * 2);
        analyzer.analyze();

        let mut db = vec![0.0; analyzer.frequency_bin_count()];
        analyzer.float_frequency_data(&mut db);
        let peak = argmax(&db);
        let peak_freq = analyzer.bin_frequency(peak);
        assert!((peak_freq - 1000.0).abs() < 24.0, "peak at {}Hz", peak_freq);
    }

    #[test]
    fn test_byte_scaling() {
        let config = AnalyzerConfig {
            smoothing: 0.0,
            ..Default::default()
        };
        let analyzer = SpectrumAnalyzer::new(config, 48000.0, 30).unwrap();
        sine(&analyzer, 3000.0, 1.0, FFT_SIZE);
        analyzer.analyze();

        let mut bytes = vec![0u8; analyzer.frequency_bin_count()];
        analyzer.byte_frequency_data(&mut bytes);
        // Full-scale sine with a Hann window peaks near -12 dB
        let peak = *bytes.iter().max().unwrap();
        assert!(peak > 200, "peak byte {}", peak);
    }

    #[test]
    fn test_interleaved_push_matches_sample_push() {
        let a = SpectrumAnalyzer::new(AnalyzerConfig::default(), 48000.0, 30).unwrap();
        let b = SpectrumAnalyzer::new(AnalyzerConfig::default(), 48000.0, 30).unwrap();

        let buffer: Vec<f32> = (0..FFT_SIZE * 2).map(|i| (i as f32 * 0.05).sin()).collect();
        a.push_interleaved(&buffer);
        for frame in buffer.chunks_exact(2) {
            b.push_sample(frame[0], frame[1]);
        }
        a.analyze();
        b.analyze();
        assert_eq!(a.decibels(), b.decibels());
    }

    #[test]
    fn test_reset() {
        let analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default(), 48000.0, 30).unwrap();
        sine(&analyzer, 440.0, 0.5, 4000);
        analyzer.update();
        analyzer.reset();

        let mut bytes = vec![0u8; analyzer.frequency_bin_count()];
        analyzer.byte_frequency_data(&mut bytes);
        assert!(bytes.iter().all(|&b| b == 0));
        assert!(!analyzer.update());
    }

    #[test]
    fn test_hann_window() {
        // Hann window should be 0 at edges and 1 at center
        assert!(hann_window(0, FFT_SIZE) < 0.01, "Window should be ~0 at start");
        assert!(hann_window(FFT_SIZE - 1, FFT_SIZE) < 0.01, "Window should be ~0 at end");
        assert!(
            (hann_window(FFT_SIZE / 2, FFT_SIZE) - 1.0).abs() < 0.01,
            "Window should be ~1 at center"
        );
    }
}
