use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use casinos_erp::{
    apply_fir_zero_phase, design_bandpass, welch, Ica, PipelineConfig, RawRecording, ReferenceMode,
    run_pipeline, Annotation,
};
use ndarray::Array2;
use std::f64::consts::PI;

/// 8 channels × 30 s @ 500 Hz with a 2 Hz artifact on the frontal pair.
fn recording() -> RawRecording {
    let names = ["Fp1", "Fp2", "F3", "F4", "C3", "C4", "P3", "P4"];
    let sf = 500.0;
    let data = Array2::from_shape_fn((8, 15_000), |(c, i)| {
        let t = i as f64 / sf;
        let blink = (if c < 2 { 80.0 } else { 5.0 }) * (2.0 * PI * 2.0 * t).sin();
        let alpha = 10.0 * (2.0 * PI * 10.0 * t + c as f64).sin();
        let slow = 4.0 * (2.0 * PI * 0.7 * t * (c + 1) as f64).cos();
        1e-6 * (blink + alpha + slow)
    });
    let annotations = (1..29).step_by(2).map(|s| Annotation::new(s * 500, "Stimulus/S 11")).collect();
    RawRecording::new(data, sf, names.iter().map(|s| s.to_string()).collect(), annotations).unwrap()
}

fn bench_bandpass(c: &mut Criterion) {
    let raw = recording();
    let h = design_bandpass(0.1, 30.0, raw.sfreq).unwrap();
    c.bench_function("band-pass 0.1–30 Hz [8×15000]", |b| {
        b.iter(|| {
            let mut data = raw.data.clone();
            apply_fir_zero_phase(&mut data, black_box(&h)).unwrap();
            black_box(data[[0, 0]])
        })
    });
}

fn bench_ica_fit(c: &mut Criterion) {
    let raw = recording();
    c.bench_function("FastICA fit, 8 components", |b| {
        b.iter(|| {
            let model = Ica::new(8, 42).fit(black_box(&raw)).unwrap();
            black_box(model.n_components())
        })
    });
}

fn bench_welch(c: &mut Criterion) {
    let raw = recording();
    c.bench_function("Welch PSD ≤ 50 Hz", |b| {
        b.iter(|| black_box(welch(black_box(&raw), 0.0, 50.0).unwrap().freqs.len()))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let raw = recording();
    let cfg = PipelineConfig { reference: ReferenceMode::Average, n_components: 7, ..PipelineConfig::default() };
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    group.bench_function("run_pipeline (no plots)", |b| {
        b.iter(|| black_box(run_pipeline(black_box(&raw), &cfg).unwrap().epochs.len()))
    });
    group.finish();
}

criterion_group!(benches, bench_bandpass, bench_ica_fit, bench_welch, bench_pipeline);
criterion_main!(benches);
