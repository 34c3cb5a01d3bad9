mod common;
use common::erp_recording;

use casinos_erp::{
    pearson, ArtifactDetector, CorrelationDetector, EogScoreDetector, Ica, RawRecording,
};
use ndarray::{Array2, Axis};
use std::f64::consts::PI;

const HEAD: [&str; 24] = [
    "Fp1", "Fp2", "F7", "F3", "Fz", "F4", "F8", "FC5", "FC1", "FC2", "FC6", "T7", "C3", "Cz",
    "C4", "T8", "CP5", "CP1", "CP2", "CP6", "P7", "P3", "Pz", "P4",
];

/// Gaussian pulses (σ = 50 ms) at `onsets` seconds.
fn pulse_train(t: f64, onsets: &[f64]) -> f64 {
    onsets.iter().map(|&o| (-0.5 * ((t - o) / 0.05).powi(2)).exp()).sum()
}

/// 24 channels, 60 s @ 250 Hz: a blink train and a weaker second ocular
/// train load on Fp1/Fp2, 22 uniform-noise sources fill the rest.
/// Returns the recording and the two ocular source time courses.
fn frontal_blinks() -> (RawRecording, Array2<f64>) {
    let (sf, n, k) = (250.0, 15_000, HEAD.len());
    let blinks: Vec<f64> = (0..28).map(|i| 1.0 + 2.1 * i as f64 + 0.3 * (1.3 * i as f64).sin()).collect();
    let saccades: Vec<f64> = (0..28).map(|i| 2.0 + 2.1 * i as f64 + 0.25 * (0.9 * i as f64).cos()).collect();

    let mut state = 11u64;
    let mut uniform = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        2.0 * ((state >> 11) as f64 / (1u64 << 53) as f64) - 1.0
    };
    let mut sources = Array2::<f64>::zeros((k, n));
    for i in 0..n {
        let t = i as f64 / sf;
        sources[[0, i]] = pulse_train(t, &blinks);
        sources[[1, i]] = pulse_train(t, &saccades);
        for j in 2..k {
            sources[[j, i]] = uniform();
        }
    }

    let mixing = Array2::from_shape_fn((k, k), |(i, j)| {
        let (fi, fj) = (i as f64, j as f64);
        match (i, j) {
            (0, 0) => 4.0,
            (0, 1) => 2.0,
            (1, 0) => 3.0,
            (1, 1) => 0.5,
            (0 | 1, _) => 0.1 * (1.7 * fi + 2.3 * fj).sin(),
            _ if i == j => 1.0,
            _ => 0.15 * (1.7 * fi + 2.3 * fj + 0.4 * fi * fj).sin(),
        }
    });
    let data = mixing.dot(&sources) * 1e-5;
    let names = HEAD.iter().map(|s| s.to_string()).collect();
    let raw = RawRecording::new(data, sf, names, vec![]).unwrap();
    (raw, sources.slice(ndarray::s![..2, ..]).to_owned())
}

/// Index of the estimated source best matching `truth`.
fn best_match(est: &Array2<f64>, truth: ndarray::ArrayView1<f64>) -> usize {
    est.rows()
        .into_iter()
        .map(|e| pearson(e, truth).abs())
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
        .unwrap()
}

/// Sine + square wave mixed into three channels (rank 2).
fn square_and_sine() -> (RawRecording, Array2<f64>) {
    let n = 5000;
    let sources = Array2::from_shape_fn((2, n), |(s, i)| {
        let t = i as f64 / 250.0;
        match s {
            0 => (2.0 * PI * 1.3 * t).sin(),
            _ => if (t * 0.7).fract() < 0.5 { 1.0 } else { -1.0 },
        }
    });
    let mixing = Array2::from_shape_vec((3, 2), vec![1.0, 0.4, 0.6, -0.8, 0.2, 1.0]).unwrap();
    let data = mixing.dot(&sources) * 1e-5;
    let raw = RawRecording::new(data, 250.0, vec!["Fp1".into(), "Cz".into(), "Oz".into()], vec![]).unwrap();
    (raw, sources)
}

// ── Determinism ───────────────────────────────────────────────────────────────

#[test]
fn same_seed_same_model() {
    let (raw, _) = square_and_sine();
    let a = Ica::new(2, 42).fit(&raw).unwrap();
    let b = Ica::new(2, 42).fit(&raw).unwrap();
    assert_eq!(a.mixing_matrix(), b.mixing_matrix());
    assert_eq!(a.unmixing_matrix(), b.unmixing_matrix());
}

// ── Separation ────────────────────────────────────────────────────────────────

#[test]
fn recovers_mixed_square_wave_and_sine() {
    let (raw, truth) = square_and_sine();
    let model = Ica::new(3, 7).fit(&raw).unwrap();
    assert_eq!(model.n_components(), 2);

    let est = model.sources(&raw).unwrap();
    for true_src in truth.rows() {
        let best = est
            .rows()
            .into_iter()
            .map(|e| pearson(e, true_src).abs())
            .fold(0.0, f64::max);
        assert!(best > 0.99, "best |r| = {best:.4}");
    }
}

#[test]
fn exclude_nothing_is_identity() {
    let raw = erp_recording();
    let model = Ica::new(2, 42).fit(&raw).unwrap();
    let out = model.apply(&raw, &[]).unwrap();
    assert_eq!(out.data, raw.data);
    assert_eq!(out.annotations, raw.annotations);
}

#[test]
fn excluding_a_component_removes_its_projection() {
    let (raw, _) = square_and_sine();
    let model = Ica::new(2, 3).fit(&raw).unwrap();
    let clean = model.apply(&raw, &[0]).unwrap();
    let src = model.sources(&clean).unwrap();
    // The excluded source is flat (its mean, which sources() centres away, aside).
    let std0 = src.row(0).std(0.0);
    let std1 = src.row(1).std(0.0);
    assert!(std0 < 1e-8, "excluded source std {std0:.2e}");
    approx::assert_relative_eq!(std1, 1.0, max_relative = 1e-3);
}

// ── Flagging ──────────────────────────────────────────────────────────────────

#[test]
fn correlation_flags_the_blink_component() {
    let raw = erp_recording();
    let model = Ica::new(2, 42).fit(&raw).unwrap();
    let found = CorrelationDetector::default().detect(&model, &raw).unwrap();
    assert_eq!(found.excluded.len(), 1);
    let idx = found.excluded[0];
    assert!(found.scores[idx].abs() > 0.9);
    assert!(found.scores[1 - idx].abs() < 0.3);
}

#[test]
fn correlation_flagging_ignores_proxy_sign() {
    // Third channel is -Fp1: same rank, opposite-sign proxy.
    let raw = erp_recording();
    let mut data = Array2::zeros((3, raw.n_times()));
    data.slice_mut(ndarray::s![..2, ..]).assign(&raw.data);
    data.row_mut(2).assign(&raw.data.row(0).mapv(|v| -v));
    let raw3 = RawRecording::new(data, raw.sfreq, vec!["Fp1".into(), "Cz".into(), "NegFp1".into()], vec![])
        .unwrap();
    let model = Ica::new(3, 42).fit(&raw3).unwrap();

    let pos = CorrelationDetector { proxy_channels: vec!["Fp1".into()], threshold: 0.3 }
        .detect(&model, &raw3)
        .unwrap();
    let neg = CorrelationDetector { proxy_channels: vec!["NegFp1".into()], threshold: 0.3 }
        .detect(&model, &raw3)
        .unwrap();

    assert_eq!(pos.excluded, neg.excluded);
    for (p, n) in pos.scores.iter().zip(&neg.scores) {
        approx::assert_abs_diff_eq!(*p, -*n, epsilon = 1e-9);
    }
}

#[test]
fn sources_have_zero_mean_on_fit_data() {
    let raw = erp_recording();
    let model = Ica::new(2, 42).fit(&raw).unwrap();
    let s = model.sources(&raw).unwrap();
    for m in s.mean_axis(Axis(1)).unwrap().iter() {
        approx::assert_abs_diff_eq!(*m, 0.0, epsilon = 1e-9);
    }
}

#[test]
fn eog_score_flags_frontal_components_strongest_first() {
    let (raw, ocular) = frontal_blinks();
    let model = Ica::new(24, 97).fit(&raw).unwrap();
    assert_eq!(model.n_components(), 24);

    let est = model.sources(&raw).unwrap();
    let blink = best_match(&est, ocular.row(0));
    let saccade = best_match(&est, ocular.row(1));
    assert_ne!(blink, saccade);

    let found = EogScoreDetector::default().detect(&model, &raw).unwrap();
    assert_eq!(found.scores.len(), 24);
    assert_eq!(found.excluded, vec![blink, saccade], "scores: {:?}", found.scores);
    assert!(found.scores[blink].abs() > found.scores[saccade].abs());
    assert!(found.scores[blink].abs() > 0.8);
}

#[test]
fn eog_score_needs_the_proxy_channel() {
    let (raw, _) = frontal_blinks();
    let model = Ica::new(24, 97).fit(&raw).unwrap();
    let missing = EogScoreDetector { proxy_channel: "VEOG".into(), ..EogScoreDetector::default() };
    assert!(matches!(
        missing.detect(&model, &raw),
        Err(casinos_erp::PipelineError::MissingChannel { .. })
    ));
}
