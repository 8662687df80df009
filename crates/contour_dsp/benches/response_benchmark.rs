//! Performance benchmarks for the DSP module
//!
//! Run with: cargo bench -p contour_dsp

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use contour_dsp::{
    BiquadStage, FilterKind, FilterParams, FilterStage, FrequencyGrid, FrequencyResponse,
    ResponseCurve,
};

fn benchmark_stage_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("frequency_response");

    // Typical curve widths
    let tick_counts = [128, 256, 512, 1024];

    for ticks in tick_counts {
        group.throughput(Throughput::Elements(ticks as u64));

        group.bench_function(format!("peaking_{}_ticks", ticks), |b| {
            let grid = FrequencyGrid::audible(ticks, 48000.0).unwrap();
            let stage =
                BiquadStage::new(FilterKind::Peaking, FilterParams::new(1500.0, 6.0, 0.5), 48000.0)
                    .unwrap();
            let mut response = FrequencyResponse::with_len(ticks);

            b.iter(|| {
                stage
                    .frequency_response(black_box(grid.as_slice()), &mut response)
                    .unwrap();
            });
        });

        group.bench_function(format!("accumulate_{}_ticks", ticks), |b| {
            let response = FrequencyResponse {
                magnitudes: vec![0.9; ticks],
                phases: vec![0.0; ticks],
            };
            let mut curve = ResponseCurve::flat(ticks);

            b.iter(|| {
                curve.clear();
                curve.accumulate(black_box(&response)).unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_stage_configure(c: &mut Criterion) {
    c.bench_function("stage_set_gain", |b| {
        let mut stage =
            BiquadStage::new(FilterKind::LowShelf, FilterParams::at(100.0), 48000.0).unwrap();
        let mut gain = -15.0_f32;

        b.iter(|| {
            // Simulate dragging a slider
            stage.set_gain(black_box(gain)).unwrap();
            gain = if gain >= 15.0 { -15.0 } else { gain + 0.5 };
        });
    });
}

fn benchmark_stage_sample(c: &mut Criterion) {
    c.bench_function("stage_process_single_sample", |b| {
        let mut stage =
            BiquadStage::new(FilterKind::HighShelf, FilterParams::at(3000.0).with_gain(3.0), 48000.0)
                .unwrap();

        b.iter(|| {
            black_box(stage.process_sample(black_box(0.5), black_box(-0.5)));
        });
    });
}

criterion_group!(
    benches,
    benchmark_stage_response,
    benchmark_stage_configure,
    benchmark_stage_sample
);

criterion_main!(benches);
