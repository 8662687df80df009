//! Contour CLI - headless front-end for the equalizer engine
//!
//! Renders a noise signal through the equalizer, feeds the output to the
//! spectrum analyser, and draws the response curve over the final spectrum.

mod plot;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use contour_core::{
    control_channel, format_frequency, AudioContext, AudioProcessor, Control, EntryStage,
    EqualizerConfig, EqualizerEngine, EqualizerState, ProcessContext,
};
use contour_dsp::{AnalyzerConfig, SpectrumAnalyzer};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::plot::Plot;

/// Frames per processing block
const BLOCK_SIZE: usize = 512;

/// Peak level of the test noise
const NOISE_LEVEL: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "contour")]
#[command(about = "Parametric equalizer: response curve over a live spectrum", long_about = None)]
struct Cli {
    /// Sample rate in Hz
    #[arg(short, long, default_value = "48000")]
    sample_rate: u32,

    /// Plot width in columns (one response tick per column)
    #[arg(short, long, default_value = "96")]
    width: usize,

    /// Plot height in rows
    #[arg(
        long,
        default_value = "33",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    height: usize,

    /// Low shelf gain in dB (±15)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    low_shelf: f32,

    /// Mid band center frequency in Hz
    #[arg(long, default_value = "1500")]
    mid_frequency: f32,

    /// Mid band gain in dB (±15)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    mid_gain: f32,

    /// High shelf gain in dB (±15); cuts also pull the lowpass down
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    high_shelf: f32,

    /// Output gain in dB
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    output_gain: f32,

    /// Put the 80Hz highpass in front of the chain
    #[arg(long)]
    highpass: bool,

    /// Seconds of noise to run through the equalizer
    #[arg(long, default_value = "1.0")]
    seconds: f32,

    /// Spectrum update rate
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Noise generator seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl Cli {
    fn state(&self) -> EqualizerState {
        EqualizerState {
            entry_stage: EntryStage::from_highpass_enabled(self.highpass),
            low_shelf_gain_db: self.low_shelf,
            mid_frequency_hz: self.mid_frequency,
            mid_gain_db: self.mid_gain,
            high_shelf_gain_db: self.high_shelf,
            output_gain_db: self.output_gain,
        }
    }

    fn controls(&self) -> [Control; 6] {
        self.state().to_controls()
    }
}

/// Machine-readable snapshot of one rendered frame
#[derive(Debug, Serialize)]
struct Report<'a> {
    sample_rate: f32,
    state: EqualizerState,
    frequencies: &'a [f32],
    response_db: &'a [f32],
    spectrum_bin_hz: f32,
    spectrum_db: Vec<f32>,
    spectrum_frames: usize,
}

fn fill_noise(rng: &mut StdRng, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = rng.gen_range(-NOISE_LEVEL..NOISE_LEVEL);
    }
}

fn describe(state: &EqualizerState) -> String {
    format!(
        "highpass {} | low shelf {:+.1} dB | mid {} {:+.1} dB | high shelf {:+.1} dB | output {:+.1} dB",
        if state.highpass_enabled() { "on" } else { "off" },
        state.low_shelf_gain_db,
        format_frequency(state.mid_frequency_hz),
        state.mid_gain_db,
        state.high_shelf_gain_db,
        state.output_gain_db,
    )
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("contour=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Starting Contour");

    let sample_rate = cli.sample_rate as f32;
    let mut context = AudioContext::new(sample_rate)?;
    // Running the command is the user gesture that unlocks audio
    context.resume()?;

    let mut engine = EqualizerEngine::new(&context, EqualizerConfig::with_ticks(cli.width))
        .context("failed to build equalizer")?;

    let (controls, receiver) = control_channel();
    let requested = cli.controls();
    for control in requested {
        controls.send(control)?;
    }
    let applied = engine.apply_pending(&receiver)?;
    if applied < requested.len() {
        bail!(
            "{} of {} controls rejected (run with RUST_LOG=contour=warn for details)",
            requested.len() - applied,
            requested.len()
        );
    }
    debug!(applied, "Applied startup controls");

    let analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default(), sample_rate, cli.fps)?;
    let process_context = ProcessContext::new(sample_rate, 2, BLOCK_SIZE);
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut buffer = vec![0.0_f32; BLOCK_SIZE * 2];
    let mut spectrum_frames = 0;

    let mut remaining = (cli.seconds.max(0.0) * sample_rate) as usize;
    while remaining > 0 {
        let frames = remaining.min(BLOCK_SIZE);
        let block = &mut buffer[..frames * 2];
        fill_noise(&mut rng, block);
        engine.process(block, &process_context);
        analyzer.push_interleaved(block);
        if analyzer.update() {
            spectrum_frames += 1;
        }
        remaining -= frames;
    }
    info!(spectrum_frames, "Rendered test signal");

    // Draw from the published snapshot, as a UI thread would
    let curve = engine.curve_handle().snapshot();
    let grid = engine.grid();
    let bin_width = analyzer.bin_frequency(1);

    match cli.format {
        OutputFormat::Text => {
            let mut bytes = vec![0_u8; analyzer.frequency_bin_count()];
            analyzer.byte_frequency_data(&mut bytes);

            let mut plot = Plot::new(grid, cli.height);
            plot.draw_spectrum(&bytes, bin_width);
            plot.draw_curve(&curve);
            print!("{}", plot.render());
            println!("{}", describe(&engine.state()));
        }
        OutputFormat::Json => {
            let report = Report {
                sample_rate,
                state: engine.state(),
                frequencies: grid.as_slice(),
                response_db: curve.as_slice(),
                spectrum_bin_hz: bin_width,
                spectrum_db: analyzer.decibels(),
                spectrum_frames,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    context.close();
    Ok(())
}
