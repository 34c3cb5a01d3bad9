//! FIR filter design matching MNE / `scipy.signal.firwin`.
//!
//! For a band-pass `[l_freq, h_freq]` at sampling rate `sfreq`:
//!   • lower transition bandwidth  = min(max(0.25 · l_freq, 2.0), l_freq)
//!   • upper transition bandwidth  = min(max(0.25 · h_freq, 2.0), sfreq/2 − h_freq)
//!   • filter length N             = ceil(3.3 / min(l_tb, h_tb) · sfreq), rounded to odd
//!   • cutoffs at the centre of each transition band
//!   • windowed-sinc design (Hamming window); band-pass = lowpass(hi) − lowpass(lo)
use std::f64::consts::PI;

use crate::error::{PipelineError, Result};

/// MNE-compatible transition bandwidth for the lower (highpass) edge.
///
/// Rule: `min(max(0.25 * l_freq, 2.0), l_freq)`
pub fn auto_trans_bandwidth(l_freq: f64) -> f64 {
    (0.25 * l_freq).max(2.0).min(l_freq)
}

/// MNE-compatible transition bandwidth for the upper (lowpass) edge.
///
/// Rule: `min(max(0.25 * h_freq, 2.0), sfreq / 2 - h_freq)`
pub fn auto_h_trans_bandwidth(h_freq: f64, sfreq: f64) -> f64 {
    (0.25 * h_freq).max(2.0).min(sfreq / 2.0 - h_freq)
}

/// Compute the number of FIR taps for a given transition bandwidth.
/// Returns an odd integer (required for zero-phase linear-phase FIR).
///
/// Formula: `ceil(3.3 / trans_bw * sfreq)` rounded up to odd.
pub fn auto_filter_length(trans_bw: f64, sfreq: f64) -> usize {
    let n_raw = (3.3 / trans_bw * sfreq).ceil() as usize;
    if n_raw % 2 == 0 { n_raw + 1 } else { n_raw }
}

fn check_edges(l_freq: Option<f64>, h_freq: Option<f64>, sfreq: f64) -> Result<()> {
    let nyq = sfreq / 2.0;
    if let Some(l) = l_freq {
        if !(l > 0.0 && l < nyq) {
            return Err(PipelineError::InvalidParameter(format!(
                "l_freq must be in (0, {nyq}), got {l}"
            )));
        }
    }
    if let Some(h) = h_freq {
        if !(h > 0.0 && h < nyq) {
            return Err(PipelineError::InvalidParameter(format!(
                "h_freq must be in (0, {nyq}), got {h}"
            )));
        }
    }
    if let (Some(l), Some(h)) = (l_freq, h_freq) {
        if l >= h {
            return Err(PipelineError::InvalidParameter(format!(
                "l_freq ({l}) must be below h_freq ({h})"
            )));
        }
    }
    Ok(())
}

/// Design a zero-phase highpass FIR filter using a Hamming-windowed sinc.
///
/// Matches `mne.filter.create_filter(None, sfreq, l_freq=l_freq, h_freq=None,
///   filter_length='auto', fir_window='hamming', fir_design='firwin', phase='zero')`.
pub fn design_highpass(l_freq: f64, sfreq: f64) -> Result<Vec<f64>> {
    check_edges(Some(l_freq), None, sfreq)?;
    let trans_bw = auto_trans_bandwidth(l_freq);
    let n = auto_filter_length(trans_bw, sfreq);
    let cutoff_hz = l_freq - trans_bw / 2.0;

    // Spectral inversion: highpass = delta[n=N/2] - lowpass
    Ok(firwin(n, cutoff_hz, sfreq, false))
}

/// Design a zero-phase lowpass FIR filter at `h_freq`.
pub fn design_lowpass(h_freq: f64, sfreq: f64) -> Result<Vec<f64>> {
    check_edges(None, Some(h_freq), sfreq)?;
    let trans_bw = auto_h_trans_bandwidth(h_freq, sfreq);
    let n = auto_filter_length(trans_bw, sfreq);
    Ok(firwin(n, h_freq + trans_bw / 2.0, sfreq, true))
}

/// Design a zero-phase band-pass FIR filter passing `[l_freq, h_freq]`.
pub fn design_bandpass(l_freq: f64, h_freq: f64, sfreq: f64) -> Result<Vec<f64>> {
    check_edges(Some(l_freq), Some(h_freq), sfreq)?;
    let l_tb = auto_trans_bandwidth(l_freq);
    let h_tb = auto_h_trans_bandwidth(h_freq, sfreq);
    let n = auto_filter_length(l_tb.min(h_tb), sfreq);

    let hi = firwin(n, h_freq + h_tb / 2.0, sfreq, true);
    let lo = firwin(n, l_freq - l_tb / 2.0, sfreq, true);
    log::debug!(
        "band-pass {l_freq}-{h_freq} Hz @ {sfreq} Hz: {n} taps (l_tb={l_tb}, h_tb={h_tb})"
    );
    Ok(hi.iter().zip(lo.iter()).map(|(a, b)| a - b).collect())
}

/// Design a lowpass FIR filter using a Hamming-windowed sinc.
///
/// `pass_zero=true` means the DC component passes (lowpass); otherwise the
/// lowpass is spectrally inverted into a highpass.
/// `cutoff_hz` is the -6 dB point.
pub fn firwin(n: usize, cutoff_hz: f64, sfreq: f64, pass_zero: bool) -> Vec<f64> {
    assert!(n % 2 == 1, "firwin requires odd N for linear-phase filter");
    let alpha = (n - 1) as f64 / 2.0;
    let nyq = sfreq / 2.0;
    let fc = cutoff_hz / nyq; // normalised [0, 1]

    let win = hamming(n);

    let mut h: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - alpha;
            // f(x) = sin(π·fc·x) / (π·x);  lim_{x→0} f(x) = fc
            let sinc = if x == 0.0 { fc } else { (PI * fc * x).sin() / (PI * x) };
            sinc * win[i]
        })
        .collect();

    // Unit DC gain.
    let s: f64 = h.iter().sum();
    if s != 0.0 {
        h.iter_mut().for_each(|v| *v /= s);
    }

    if !pass_zero {
        h.iter_mut().for_each(|v| *v = -*v);
        h[n / 2] += 1.0;
    }

    h
}

/// Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Magnitude response of `h` at `freq` Hz.
pub fn freq_response(h: &[f64], freq: f64, sfreq: f64) -> f64 {
    let w = 2.0 * PI * freq / sfreq;
    let (re, im) = h.iter().enumerate().fold((0.0, 0.0), |(re, im), (k, &v)| {
        (re + v * (w * k as f64).cos(), im - v * (w * k as f64).sin())
    });
    (re * re + im * im).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_length_is_odd() {
        for l_freq in [0.1, 0.5, 1.0, 2.0, 5.0] {
            let tb = auto_trans_bandwidth(l_freq);
            let n = auto_filter_length(tb, 256.0);
            assert!(n % 2 == 1, "N={n} is even for l_freq={l_freq}");
        }
    }

    #[test]
    fn highpass_sum_near_zero() {
        let h = design_highpass(0.5, 256.0).unwrap();
        let s: f64 = h.iter().sum();
        assert!(s.abs() < 1e-9, "highpass sum = {s}");
    }

    #[test]
    fn highpass_known_length_256hz() {
        // At 256 Hz / 0.5 Hz: MNE produces 1691 taps.
        let h = design_highpass(0.5, 256.0).unwrap();
        assert_eq!(h.len(), 1691, "expected 1691 taps, got {}", h.len());
    }

    #[test]
    fn bandpass_is_symmetric_with_zero_dc() {
        let h = design_bandpass(1.0, 30.0, 250.0).unwrap();
        let n = h.len();
        for i in 0..n / 2 {
            approx::assert_abs_diff_eq!(h[i], h[n - 1 - i], epsilon = 1e-12);
        }
        let dc: f64 = h.iter().sum();
        approx::assert_abs_diff_eq!(dc, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn bandpass_response() {
        let sfreq = 250.0;
        let h = design_bandpass(1.0, 30.0, sfreq).unwrap();
        assert!((freq_response(&h, 10.0, sfreq) - 1.0).abs() < 0.01);
        assert!(freq_response(&h, 60.0, sfreq) < 0.01);
    }

    #[test]
    fn bandpass_length_follows_narrowest_band() {
        // l_tb = 0.1 Hz dominates: ceil(3.3 / 0.1 * 500) = 16500 → 16501.
        let h = design_bandpass(0.1, 30.0, 500.0).unwrap();
        assert_eq!(h.len(), 16501);
    }

    #[test]
    fn lowpass_dc_gain_unity() {
        let h = firwin(101, 10.0, 256.0, true);
        let dc: f64 = h.iter().sum();
        approx::assert_abs_diff_eq!(dc, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_band_is_rejected() {
        assert!(design_bandpass(30.0, 1.0, 250.0).is_err());
        assert!(design_bandpass(1.0, 200.0, 250.0).is_err());
        assert!(design_lowpass(0.0, 250.0).is_err());
    }
}
