//! Welch power spectral density.
//!
//! Matches `raw.compute_psd(method='welch', fmax=…)` defaults:
//! periodic Hamming window, `n_fft = min(256, n_times)`, no overlap, mean
//! over segments, one-sided density in V²/Hz.
use ndarray::{s, Array2};
use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{PipelineError, Result};
use crate::recording::RawRecording;

pub const DEFAULT_N_FFT: usize = 256;

/// Periodic Hamming window: `0.54 − 0.46·cos(2πi/n)`.
pub fn periodic_hamming(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos())
        .collect()
}

#[derive(Debug, Clone)]
pub struct Spectrum {
    pub freqs: Vec<f64>,
    /// [n_channels, n_freqs]
    pub psd: Array2<f64>,
    pub ch_names: Vec<String>,
}

impl Spectrum {
    /// Mean density of channel `ch` over `lo <= f <= hi`.
    pub fn band_mean(&self, ch: usize, lo: f64, hi: f64) -> Option<f64> {
        let vals: Vec<f64> = self
            .freqs
            .iter()
            .zip(self.psd.row(ch).iter())
            .filter(|&(&f, _)| f >= lo && f <= hi)
            .map(|(_, &p)| p)
            .collect();
        (!vals.is_empty()).then(|| vals.iter().sum::<f64>() / vals.len() as f64)
    }
}

pub fn welch(raw: &RawRecording, fmin: f64, fmax: f64) -> Result<Spectrum> {
    let (freqs, psd) = welch_array(&raw.data, raw.sfreq, DEFAULT_N_FFT, fmin, fmax)?;
    log::debug!("Welch PSD: {} ch, {} bins in [{fmin}, {fmax}] Hz", psd.nrows(), freqs.len());
    Ok(Spectrum { freqs, psd, ch_names: raw.ch_names.clone() })
}

/// Welch estimate over the rows of `data` ([C, T]), restricted to `[fmin, fmax]`.
pub fn welch_array(
    data: &Array2<f64>,
    sfreq: f64,
    n_fft: usize,
    fmin: f64,
    fmax: f64,
) -> Result<(Vec<f64>, Array2<f64>)> {
    let (n_ch, n_t) = data.dim();
    let n_fft = n_fft.min(n_t);
    if n_fft < 2 {
        return Err(PipelineError::InvalidParameter(format!(
            "need at least 2 samples for a PSD, got {n_t}"
        )));
    }
    if fmin > fmax {
        return Err(PipelineError::InvalidParameter(format!("fmin {fmin} > fmax {fmax}")));
    }

    let window = periodic_hamming(n_fft);
    let win_power: f64 = window.iter().map(|w| w * w).sum();
    let scale = 1.0 / (sfreq * win_power);
    let n_segments = n_t / n_fft;
    let n_freqs = n_fft / 2 + 1;

    let all_freqs: Vec<f64> = (0..n_freqs).map(|k| k as f64 * sfreq / n_fft as f64).collect();
    let keep: Vec<usize> = (0..n_freqs)
        .filter(|&k| all_freqs[k] >= fmin && all_freqs[k] <= fmax)
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut buf = vec![Complex::new(0.0, 0.0); n_fft];
    let mut acc = vec![0.0; n_freqs];
    let mut psd = Array2::<f64>::zeros((n_ch, keep.len()));

    for c in 0..n_ch {
        acc.iter_mut().for_each(|v| *v = 0.0);
        for seg in 0..n_segments {
            let x = data.slice(s![c, seg * n_fft..(seg + 1) * n_fft]);
            for ((b, &v), &w) in buf.iter_mut().zip(x.iter()).zip(window.iter()) {
                *b = Complex::new(v * w, 0.0);
            }
            fft.process(&mut buf);
            for (k, a) in acc.iter_mut().enumerate() {
                *a += buf[k].norm_sqr();
            }
        }
        for (j, &k) in keep.iter().enumerate() {
            // One-sided: double everything except DC and (even n_fft) Nyquist.
            let one_sided = if k == 0 || (n_fft % 2 == 0 && k == n_fft / 2) { 1.0 } else { 2.0 };
            psd[[c, j]] = acc[k] / n_segments as f64 * scale * one_sided;
        }
    }

    Ok((keep.iter().map(|&k| all_freqs[k]).collect(), psd))
}
