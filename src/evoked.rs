//! Averaged event-related potential.
use ndarray::{Array1, Array2, Axis};

use crate::epochs::Epochs;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct Evoked {
    /// [n_channels, n_times]
    pub data: Array2<f64>,
    pub times: Array1<f64>,
    pub ch_names: Vec<String>,
    pub positions: Vec<Option<[f64; 3]>>,
    pub sfreq: f64,
    /// Number of epochs averaged.
    pub nave: usize,
}

/// Sample-wise mean over all epochs.
///
/// An empty epoch set is a precondition violation and fails with
/// [`PipelineError::EmptyEpochs`].
pub fn average(epochs: &Epochs) -> Result<Evoked> {
    let data = epochs
        .data
        .mean_axis(Axis(0))
        .filter(|_| !epochs.is_empty())
        .ok_or_else(|| PipelineError::EmptyEpochs {
            label: epochs.label.clone(),
            n_dropped: epochs.n_dropped,
        })?;
    log::info!("Averaged {} epochs into evoked [{} × {}]", epochs.len(), data.nrows(), data.ncols());
    Ok(Evoked {
        data,
        times: epochs.times.clone(),
        ch_names: epochs.ch_names.clone(),
        positions: epochs.positions.clone(),
        sfreq: epochs.sfreq,
        nave: epochs.len(),
    })
}

impl Evoked {
    /// Channel with the largest peak-to-peak amplitude.
    pub fn peak_channel(&self) -> Option<(usize, f64)> {
        self.data
            .rows()
            .into_iter()
            .map(|r| {
                let max = r.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let min = r.iter().cloned().fold(f64::INFINITY, f64::min);
                max - min
            })
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}
