//! FIR filter design and application.
//!
//! - [`design`]: Hamming-windowed sinc highpass / lowpass / band-pass design,
//!   matching `mne.filter.create_filter(fir_window='hamming', phase='zero')`.
//! - [`apply`]: Overlap-add zero-phase convolution, matching MNE's
//!   `_overlap_add_filter` / `_1d_overlap_filter`.

pub mod apply;
pub mod design;

pub use apply::{apply_fir_zero_phase, filter_1d};
pub use design::{
    auto_filter_length, auto_h_trans_bandwidth, auto_trans_bandwidth, design_bandpass,
    design_highpass, design_lowpass, firwin, freq_response, hamming,
};

use crate::error::{PipelineError, Result};
use crate::recording::RawRecording;

/// Design the FIR kernel for `raw.filter(l_freq, h_freq)`.
///
/// `None` on one side gives a highpass or lowpass; both `None` is an error.
pub fn design_for(l_freq: Option<f64>, h_freq: Option<f64>, sfreq: f64) -> Result<Vec<f64>> {
    match (l_freq, h_freq) {
        (Some(l), Some(h)) => design_bandpass(l, h, sfreq),
        (Some(l), None) => design_highpass(l, sfreq),
        (None, Some(h)) => design_lowpass(h, sfreq),
        (None, None) => Err(PipelineError::InvalidParameter(
            "filter needs at least one of l_freq / h_freq".into(),
        )),
    }
}

/// Filter a copy of `raw`; the input is left untouched.
///
/// Mirrors `raw.copy().filter(l_freq=…, h_freq=…)`.
pub fn filter_recording(
    raw: &RawRecording,
    l_freq: Option<f64>,
    h_freq: Option<f64>,
) -> Result<RawRecording> {
    let h = design_for(l_freq, h_freq, raw.sfreq)?;
    let mut data = raw.data.clone();
    apply_fir_zero_phase(&mut data, &h)?;
    log::info!(
        "Filtered {} ch: l_freq={:?} h_freq={:?} ({} taps)",
        raw.n_channels(),
        l_freq,
        h_freq,
        h.len()
    );
    raw.with_data(data)
}
