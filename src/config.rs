//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every tunable parameter of the ERP pipeline. The
//! defaults reproduce the casinos-task analysis for a single subject.
use std::path::PathBuf;

use crate::baseline::Baseline;
use crate::ica::{ArtifactDetector, ArtifactStrategy};
use crate::reference::ReferenceMode;

/// Configuration for the full ERP pipeline.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use casinos_erp::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     subject_id: "sub-05".into(),
///     n_components: 15,
///     ..PipelineConfig::default()
/// };
/// assert!(cfg.vhdr_path().ends_with("sub-05/eeg/sub-05_task-casinos_eeg.vhdr"));
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Dataset root containing one directory per subject.
    ///
    /// Default: `"."`.
    pub data_root: PathBuf,

    /// Subject directory name, e.g. `"sub-28"`.
    ///
    /// Default: `"sub-28"`.
    pub subject_id: String,

    /// High-pass edge of the band-pass FIR in Hz.
    ///
    /// Transition bandwidth is `min(max(0.25 · l_freq, 2), l_freq)`, so at
    /// 0.1 Hz the kernel is long (`⌈3.3 / 0.1 · sfreq⌉` taps).
    ///
    /// Default: `0.1` Hz.
    pub l_freq: f64,

    /// Low-pass edge of the band-pass FIR in Hz.
    ///
    /// Default: `30.0` Hz.
    pub h_freq: f64,

    /// Reference applied after filtering.
    ///
    /// Default: [`ReferenceMode::Average`].
    pub reference: ReferenceMode,

    /// Requested number of ICA components; capped by channel count and rank.
    ///
    /// Default: `20`.
    pub n_components: usize,

    /// Seed for the FastICA initial unmixing matrix.
    ///
    /// Default: `42`.
    pub random_state: u64,

    /// FastICA iteration cap.
    ///
    /// Default: `1000`.
    pub ica_max_iter: usize,

    /// How blink components are flagged.
    ///
    /// Default: [`ArtifactStrategy::Correlation`].
    pub strategy: ArtifactStrategy,

    /// Channels averaged into the blink proxy (correlation strategy).
    /// Missing ones are skipped with a warning.
    ///
    /// Default: `["Fp1", "Fp2"]`.
    pub proxy_channels: Vec<String>,

    /// Components with `|r| >` this are flagged (correlation strategy).
    ///
    /// Default: `0.3`.
    pub corr_threshold: f64,

    /// Proxy channel for the EOG-score strategy.
    ///
    /// Default: `"Fp1"`.
    pub eog_channel: String,

    /// Annotation label epochs are locked to.
    ///
    /// Default: `"Stimulus/S 11"` (code 11).
    pub target_label: String,

    /// Epoch start relative to the event, seconds.
    ///
    /// Default: `-0.2`.
    pub tmin: f64,

    /// Epoch end relative to the event, seconds (inclusive).
    ///
    /// Default: `0.8`.
    pub tmax: f64,

    /// Baseline window in seconds; `None` means the epoch edge.
    ///
    /// Default: `(Some(-0.2), Some(0.0))`.
    pub baseline: Baseline,

    /// Directory the seven PNG figures are written to. Created if missing.
    ///
    /// Default: `"milestone4_outputs"`.
    pub out_dir: PathBuf,

    /// Upper frequency of the PSD figures.
    ///
    /// Default: `50.0` Hz.
    pub psd_fmax: f64,

    /// Samples shown in the raw / clean trace figures.
    ///
    /// Default: `5000`.
    pub static_samples: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            subject_id: "sub-28".into(),
            l_freq: 0.1,
            h_freq: 30.0,
            reference: ReferenceMode::Average,
            n_components: 20,
            random_state: 42,
            ica_max_iter: 1000,
            strategy: ArtifactStrategy::Correlation,
            proxy_channels: vec!["Fp1".into(), "Fp2".into()],
            corr_threshold: 0.3,
            eog_channel: "Fp1".into(),
            target_label: "Stimulus/S 11".into(),
            tmin: -0.2,
            tmax: 0.8,
            baseline: (Some(-0.2), Some(0.0)),
            out_dir: PathBuf::from("milestone4_outputs"),
            psd_fmax: 50.0,
            static_samples: 5000,
        }
    }
}

impl PipelineConfig {
    /// `<data_root>/<subject>/eeg/<subject>_task-casinos_eeg.vhdr`
    pub fn vhdr_path(&self) -> PathBuf {
        self.data_root
            .join(&self.subject_id)
            .join("eeg")
            .join(format!("{}_task-casinos_eeg.vhdr", self.subject_id))
    }

    /// Detector for the configured [`strategy`](Self::strategy).
    pub fn detector(&self) -> Box<dyn ArtifactDetector> {
        self.strategy.detector(self)
    }
}
