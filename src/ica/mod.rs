//! Independent component analysis for artifact removal.
//!
//! Fitting follows `mne.preprocessing.ICA(method='fastica')`:
//!
//! 1. pre-whiten: `X' = (X − mean_c) / std(X)` (one global scale for EEG);
//! 2. PCA-whiten to the top `k` components;
//! 3. FastICA (`linfa-ica`) in whitened space, seeded by `random_state`.
//!
//! Removing components keeps everything the PCA step discarded:
//!
//! ```text
//! X_clean = X − scale · M[:, excl] · S[excl, :]
//! ```
//!
//! where `M` is the `[C, k]` mixing matrix in pre-whitened units and `S` the
//! `[k, T]` sources.

pub mod detect;
pub mod fastica;

pub use detect::{
    pearson, ArtifactDetector, ArtifactStrategy, CorrelationDetector, Detection, EogScoreDetector,
};

use ndarray::{Array1, Array2, Axis};

use crate::error::{PipelineError, Result};
use crate::recording::RawRecording;
use fastica::{fit_unmixing, pca_whitening, pinv};

/// FastICA configuration (builder).
#[derive(Debug, Clone)]
pub struct Ica {
    pub n_components: usize,
    pub random_state: u64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Ica {
    pub fn new(n_components: usize, random_state: u64) -> Self {
        Self { n_components, random_state, max_iter: 1000, tol: 1e-4 }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Decompose every channel of `raw`.
    pub fn fit(&self, raw: &RawRecording) -> Result<IcaModel> {
        if self.n_components == 0 {
            return Err(PipelineError::InvalidParameter("n_components must be at least 1".into()));
        }
        let x = &raw.data;
        let n_t = x.ncols();
        if n_t < 2 {
            return Err(PipelineError::InvalidParameter(format!(
                "ICA needs at least 2 samples, got {n_t}"
            )));
        }

        let scale = x.std(0.0);
        if scale.is_nan() || scale <= 0.0 {
            return Err(PipelineError::Numerical("recording is constant; nothing to decompose".into()));
        }
        let scaled = x / scale;
        let pca_mean = scaled
            .mean_axis(Axis(1))
            .ok_or_else(|| PipelineError::Numerical("empty recording".into()))?;
        let centred = &scaled - &pca_mean.view().insert_axis(Axis(1));

        let whitening = pca_whitening(&centred, self.n_components)?;
        let z = whitening.whitener.dot(&centred);
        let unmixing = fit_unmixing(&z, self.random_state, self.max_iter, self.tol)?;
        let unmixing_pinv = pinv(&unmixing)?;

        let k = whitening.whitener.nrows();
        let total_var: f64 = whitening.explained_variance.iter().sum();
        log::info!(
            "Fitted ICA: {k} components on {} ch × {n_t} samples, PCA variance {:.3}",
            raw.n_channels(),
            total_var
        );

        Ok(IcaModel {
            ch_names: raw.ch_names.clone(),
            positions: raw.positions.clone(),
            scale,
            pca_mean,
            whitener: whitening.whitener,
            dewhitener: whitening.dewhitener,
            unmixing,
            unmixing_pinv,
            explained_variance: whitening.explained_variance,
        })
    }
}

/// A fitted decomposition. Immutable; removing components yields a new recording.
#[derive(Debug, Clone)]
pub struct IcaModel {
    pub ch_names: Vec<String>,
    pub positions: Vec<Option<[f64; 3]>>,
    /// Global pre-whitening scale.
    pub scale: f64,
    /// [C] channel means of the pre-whitened fit data.
    pub pca_mean: Array1<f64>,
    /// [k, C]
    whitener: Array2<f64>,
    /// [C, k]
    dewhitener: Array2<f64>,
    /// [k, k] in whitened space.
    unmixing: Array2<f64>,
    /// [k, k] pseudo-inverse of `unmixing`.
    unmixing_pinv: Array2<f64>,
    pub explained_variance: Vec<f64>,
}

impl IcaModel {
    #[inline]
    pub fn n_components(&self) -> usize {
        self.unmixing.nrows()
    }

    /// `[C, k]` spatial patterns in pre-whitened units (used for topographies).
    pub fn mixing_matrix(&self) -> Array2<f64> {
        self.dewhitener.dot(&self.unmixing_pinv)
    }

    /// `[k, C]` filters taking pre-whitened, centred data to sources.
    pub fn unmixing_matrix(&self) -> Array2<f64> {
        self.unmixing.dot(&self.whitener)
    }

    fn check_channels(&self, raw: &RawRecording) -> Result<()> {
        if raw.ch_names != self.ch_names {
            return Err(PipelineError::InvalidParameter(format!(
                "recording channels {:?} differ from the {} channels the ICA was fitted on",
                raw.ch_names,
                self.ch_names.len()
            )));
        }
        Ok(())
    }

    /// Component time courses `[k, T]` for `raw` (`ica.get_sources(raw)`).
    pub fn sources(&self, raw: &RawRecording) -> Result<Array2<f64>> {
        self.check_channels(raw)?;
        let centred = &raw.data / self.scale - &self.pca_mean.view().insert_axis(Axis(1));
        Ok(self.unmixing_matrix().dot(&centred))
    }

    /// Remove the `exclude` components from a copy of `raw`.
    pub fn apply(&self, raw: &RawRecording, exclude: &[usize]) -> Result<RawRecording> {
        let k = self.n_components();
        if let Some(&bad) = exclude.iter().find(|&&i| i >= k) {
            return Err(PipelineError::InvalidParameter(format!(
                "component {bad} out of range for {k} components"
            )));
        }
        if exclude.is_empty() {
            log::info!("ICA apply: no components excluded");
            return raw.with_data(raw.data.clone());
        }

        let sources = self.sources(raw)?;
        let mixing = self.mixing_matrix();
        let m_ex = mixing.select(Axis(1), exclude);
        let s_ex = sources.select(Axis(0), exclude);
        let removed = m_ex.dot(&s_ex) * self.scale;

        log::info!("ICA apply: removed components {exclude:?}");
        raw.with_data(&raw.data - &removed)
    }
}
