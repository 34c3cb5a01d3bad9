//! Event-locked epoching.
//!
//! Cuts `[tmin, tmax]` windows (both ends inclusive) around every event with
//! the requested code, drops windows that run past either end of the
//! recording, and applies baseline correction.
use ndarray::{s, Array1, Array3};

use crate::annotations::Event;
use crate::baseline::{baseline_range, rescale_mean_inplace, Baseline};
use crate::error::{PipelineError, Result};
use crate::evoked::Evoked;
use crate::recording::RawRecording;

#[derive(Debug, Clone)]
pub struct Epochs {
    /// [n_epochs, n_channels, n_times]
    pub data: Array3<f64>,
    /// Time axis in seconds relative to the event (0 = onset).
    pub times: Array1<f64>,
    pub ch_names: Vec<String>,
    pub positions: Vec<Option<[f64; 3]>>,
    pub sfreq: f64,
    pub tmin: f64,
    pub baseline: Baseline,
    /// Events that produced an epoch, in order.
    pub events: Vec<Event>,
    /// Occurrences whose window fell outside the recording.
    pub n_dropped: usize,
    /// Label the epochs were cut for (used in messages).
    pub label: String,
}

impl Epochs {
    /// Mirrors `mne.Epochs(raw, events, {label: code}, tmin, tmax, baseline, preload=True)`.
    pub fn new(
        raw: &RawRecording,
        events: &[Event],
        label: &str,
        code: i32,
        tmin: f64,
        tmax: f64,
        baseline: Baseline,
    ) -> Result<Self> {
        if tmax < tmin {
            return Err(PipelineError::InvalidParameter(format!(
                "tmax ({tmax}) must not be below tmin ({tmin})"
            )));
        }
        let start_off = (tmin * raw.sfreq).round() as i64;
        let stop_off = (tmax * raw.sfreq).round() as i64;
        let n_times = (stop_off - start_off + 1) as usize;
        let times = Array1::from_shape_fn(n_times, |i| (start_off + i as i64) as f64 / raw.sfreq);
        let range = baseline_range(times.as_slice().unwrap_or(&[]), baseline)?;

        let total = raw.n_times() as i64;
        let mut kept = Vec::new();
        let mut n_dropped = 0usize;
        for ev in events.iter().filter(|e| e.code == code) {
            let first = ev.sample as i64 + start_off;
            let last = ev.sample as i64 + stop_off;
            if first < 0 || last >= total {
                n_dropped += 1;
                continue;
            }
            kept.push(*ev);
        }

        let n_ch = raw.n_channels();
        let mut data = Array3::<f64>::zeros((kept.len(), n_ch, n_times));
        for (e, ev) in kept.iter().enumerate() {
            let first = (ev.sample as i64 + start_off) as usize;
            data.slice_mut(s![e, .., ..])
                .assign(&raw.data.slice(s![.., first..first + n_times]));
        }
        rescale_mean_inplace(&mut data, range);

        log::info!(
            "{} epochs for {label:?} (code {code}), {n_dropped} dropped as out of bounds, {} samples each",
            kept.len(),
            n_times
        );

        Ok(Self {
            data,
            times,
            ch_names: raw.ch_names.clone(),
            positions: raw.positions.clone(),
            sfreq: raw.sfreq,
            tmin: start_off as f64 / raw.sfreq,
            baseline,
            events: kept,
            n_dropped,
            label: label.to_string(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.shape()[0]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample-wise mean over epochs (`epochs.average()`).
    pub fn average(&self) -> Result<Evoked> {
        crate::evoked::average(self)
    }
}
