//! Flagging ICA components that track eye blinks.
//!
//! Two strategies sit behind [`ArtifactDetector`]:
//!
//! * [`CorrelationDetector`]: Pearson r against the mean of the frontal
//!   channels, fixed `|r|` threshold;
//! * [`EogScoreDetector`]: band-limited correlation against one frontal
//!   channel with iterative z-score outlier detection, as in
//!   `ica.find_bads_eog(raw, ch_name=…)`.
use ndarray::{Array1, ArrayView1, Axis};

use super::IcaModel;
use crate::error::{PipelineError, Result};
use crate::filter::{design_bandpass, filter_1d};
use crate::recording::RawRecording;

/// Components to remove plus the per-component score they were chosen on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    pub excluded: Vec<usize>,
    /// One Pearson r per component, in component order.
    pub scores: Vec<f64>,
}

pub trait ArtifactDetector {
    fn name(&self) -> &'static str;
    fn detect(&self, model: &IcaModel, raw: &RawRecording) -> Result<Detection>;
}

/// Which detector the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactStrategy {
    #[default]
    Correlation,
    EogScore,
}

impl ArtifactStrategy {
    pub fn detector(&self, cfg: &crate::config::PipelineConfig) -> Box<dyn ArtifactDetector> {
        match self {
            Self::Correlation => Box::new(CorrelationDetector {
                proxy_channels: cfg.proxy_channels.clone(),
                threshold: cfg.corr_threshold,
            }),
            Self::EogScore => Box::new(EogScoreDetector {
                proxy_channel: cfg.eog_channel.clone(),
                ..EogScoreDetector::default()
            }),
        }
    }
}

impl std::str::FromStr for ArtifactStrategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "correlation" | "corr" => Ok(Self::Correlation),
            "eog-score" | "eog_score" | "eog" => Ok(Self::EogScore),
            other => Err(PipelineError::InvalidParameter(format!(
                "unknown artifact strategy {other:?} (expected correlation or eog-score)"
            ))),
        }
    }
}

/// Pearson correlation; 0.0 when either side has zero variance.
pub fn pearson(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let (a, b) = (a.slice(ndarray::s![..n]), b.slice(ndarray::s![..n]));
    let ma = a.sum() / n as f64;
    let mb = b.sum() / n as f64;
    let (mut sab, mut saa, mut sbb) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (dx, dy) = (x - ma, y - mb);
        sab += dx * dy;
        saa += dx * dx;
        sbb += dy * dy;
    }
    let denom = (saa * sbb).sqrt();
    if denom > 0.0 { sab / denom } else { 0.0 }
}

/// Mean of the proxy channels vs. every source, `|r| > threshold`.
#[derive(Debug, Clone)]
pub struct CorrelationDetector {
    pub proxy_channels: Vec<String>,
    pub threshold: f64,
}

impl Default for CorrelationDetector {
    fn default() -> Self {
        Self { proxy_channels: vec!["Fp1".into(), "Fp2".into()], threshold: 0.3 }
    }
}

impl ArtifactDetector for CorrelationDetector {
    fn name(&self) -> &'static str {
        "correlation"
    }

    fn detect(&self, model: &IcaModel, raw: &RawRecording) -> Result<Detection> {
        let mut rows = Vec::new();
        for name in &self.proxy_channels {
            match raw.channel_index(name) {
                Some(i) => rows.push(i),
                None => log::warn!("blink proxy channel {name} not in recording; skipping it"),
            }
        }
        if rows.is_empty() {
            return Err(PipelineError::MissingChannel {
                channels: self.proxy_channels.clone(),
                available: raw.ch_names.clone(),
            });
        }
        let proxy = raw
            .data
            .select(Axis(0), &rows)
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(raw.n_times()));

        let sources = model.sources(raw)?;
        let scores: Vec<f64> = sources.rows().into_iter().map(|s| pearson(s, proxy.view())).collect();
        let excluded: Vec<usize> = scores
            .iter()
            .enumerate()
            .filter(|(_, r)| r.abs() > self.threshold)
            .map(|(i, _)| i)
            .collect();

        log::info!("Blink-like ICA components (|r| > {}): {excluded:?}", self.threshold);
        Ok(Detection { excluded, scores })
    }
}

/// Band-passed proxy correlation with z-score outlier rejection.
#[derive(Debug, Clone)]
pub struct EogScoreDetector {
    pub proxy_channel: String,
    pub l_freq: f64,
    pub h_freq: f64,
    pub threshold: f64,
    pub max_iter: usize,
}

impl Default for EogScoreDetector {
    fn default() -> Self {
        Self { proxy_channel: "Fp1".into(), l_freq: 1.0, h_freq: 10.0, threshold: 3.0, max_iter: 2 }
    }
}

/// Iteratively z-score `values`, masking what exceeded `threshold` so far.
///
/// Returns a mask of outliers. Stops early once a pass adds nothing.
pub fn find_outliers(values: &[f64], threshold: f64, max_iter: usize) -> Vec<bool> {
    let mut mask = vec![false; values.len()];
    for _ in 0..max_iter {
        let kept: Vec<f64> = values.iter().zip(&mask).filter(|&(_, &m)| !m).map(|(&v, _)| v).collect();
        if kept.is_empty() {
            break;
        }
        let mean = kept.iter().sum::<f64>() / kept.len() as f64;
        let sd = (kept.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / kept.len() as f64).sqrt();
        if sd == 0.0 {
            break;
        }
        let mut added = false;
        for (v, m) in values.iter().zip(mask.iter_mut()) {
            if !*m && ((v - mean) / sd).abs() > threshold {
                *m = true;
                added = true;
            }
        }
        if !added {
            break;
        }
    }
    mask
}

impl ArtifactDetector for EogScoreDetector {
    fn name(&self) -> &'static str {
        "eog-score"
    }

    fn detect(&self, model: &IcaModel, raw: &RawRecording) -> Result<Detection> {
        let idx = raw.channel_index(&self.proxy_channel).ok_or_else(|| PipelineError::MissingChannel {
            channels: vec![self.proxy_channel.clone()],
            available: raw.ch_names.clone(),
        })?;
        let h = design_bandpass(self.l_freq, self.h_freq, raw.sfreq)?;
        let band = |x: ArrayView1<f64>| Array1::from(filter_1d(&x.to_vec(), &h));

        let proxy = band(raw.data.row(idx));
        let sources = model.sources(raw)?;
        let scores: Vec<f64> = sources
            .rows()
            .into_iter()
            .map(|s| pearson(band(s).view(), proxy.view()))
            .collect();

        let abs: Vec<f64> = scores.iter().map(|r| r.abs()).collect();
        let mask = find_outliers(&abs, self.threshold, self.max_iter);
        let mut excluded: Vec<usize> = (0..scores.len()).filter(|&i| mask[i]).collect();
        excluded.sort_by(|&a, &b| abs[b].total_cmp(&abs[a]));

        log::info!(
            "EOG-scored ICA components ({}, z > {}): {excluded:?}",
            self.proxy_channel,
            self.threshold
        );
        Ok(Detection { excluded, scores })
    }
}
