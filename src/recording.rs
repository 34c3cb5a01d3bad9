//! Continuous multi-channel recording.
use ndarray::{Array1, Array2, Axis};

use crate::annotations::Annotation;
use crate::error::{PipelineError, Result};
use crate::montage::Montage;

/// A continuous recording held in memory (`preload=True` semantics).
///
/// `data` is `[n_channels, n_times]` in volts. Channel count and sampling
/// rate are fixed for the lifetime of the value; processing stages return a
/// new `RawRecording` through [`RawRecording::with_data`].
#[derive(Debug, Clone)]
pub struct RawRecording {
    pub data: Array2<f64>,
    pub sfreq: f64,
    pub ch_names: Vec<String>,
    /// Unit-sphere electrode positions, `None` where the montage had no entry.
    pub positions: Vec<Option<[f64; 3]>>,
    pub annotations: Vec<Annotation>,
}

fn normalise_name(s: &str) -> String {
    s.replace(' ', "").to_lowercase()
}

impl RawRecording {
    pub fn new(
        data: Array2<f64>,
        sfreq: f64,
        ch_names: Vec<String>,
        annotations: Vec<Annotation>,
    ) -> Result<Self> {
        if ch_names.len() != data.nrows() {
            return Err(PipelineError::InvalidParameter(format!(
                "{} channel names for {} data rows",
                ch_names.len(),
                data.nrows()
            )));
        }
        if sfreq.is_nan() || sfreq <= 0.0 {
            return Err(PipelineError::InvalidParameter(format!("sfreq must be > 0, got {sfreq}")));
        }
        let positions = vec![None; ch_names.len()];
        Ok(Self { data, sfreq, ch_names, positions, annotations })
    }

    #[inline]
    pub fn n_channels(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn n_times(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.n_times() as f64 / self.sfreq
    }

    /// Time axis in seconds, starting at 0.
    pub fn times(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.n_times(), |i| i as f64 / self.sfreq)
    }

    /// Index of `name`: exact match first, then ignoring case and spaces.
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.ch_names.iter().position(|n| n == name).or_else(|| {
            let key = normalise_name(name);
            self.ch_names.iter().position(|n| normalise_name(n) == key)
        })
    }

    /// Rows for `names`, in the requested order.
    pub fn pick_channels(&self, names: &[&str]) -> Result<Array2<f64>> {
        let mut missing = Vec::new();
        let mut idx = Vec::with_capacity(names.len());
        for &n in names {
            match self.channel_index(n) {
                Some(i) => idx.push(i),
                None => missing.push(n.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(PipelineError::MissingChannel {
                channels: missing,
                available: self.ch_names.clone(),
            });
        }
        Ok(self.data.select(Axis(0), &idx))
    }

    /// Same metadata, new samples. The shape must match.
    pub fn with_data(&self, data: Array2<f64>) -> Result<Self> {
        if data.dim() != self.data.dim() {
            return Err(PipelineError::InvalidParameter(format!(
                "replacement data has shape {:?}, expected {:?}",
                data.dim(),
                self.data.dim()
            )));
        }
        Ok(Self {
            data,
            sfreq: self.sfreq,
            ch_names: self.ch_names.clone(),
            positions: self.positions.clone(),
            annotations: self.annotations.clone(),
        })
    }

    /// Attach positions from `montage`; unknown channels are left without one.
    ///
    /// Returns the number of channels that received a position.
    pub fn set_montage(&mut self, montage: &Montage) -> usize {
        let mut missing = Vec::new();
        for (name, pos) in self.ch_names.iter().zip(self.positions.iter_mut()) {
            *pos = montage.get(name);
            if pos.is_none() {
                missing.push(name.as_str());
            }
        }
        if !missing.is_empty() {
            log::debug!(
                "{} channel(s) not in montage {}: {:?}",
                missing.len(),
                montage.name,
                missing
            );
        }
        self.n_channels() - missing.len()
    }
}
