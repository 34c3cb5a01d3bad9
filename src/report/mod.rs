//! Diagnostic figures.
//!
//! | file                            | content                               |
//! |---------------------------------|---------------------------------------|
//! | `01_psd_before_filtering.png`   | Welch PSD of the raw recording        |
//! | `02_psd_after_filtering.png`    | Welch PSD after the band-pass         |
//! | `03_ica_topographies.png`       | component scalp maps                  |
//! | `04_raw_static.png`             | first samples, raw                    |
//! | `05_clean_static.png`           | same span after ICA cleaning          |
//! | `06_erp.png`                    | evoked, spatial colours               |
//! | `07_butterfly.png`              | evoked butterfly with onset marker    |

pub mod plots;
pub mod topomap;

use std::path::{Path, PathBuf};

use ndarray::s;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::evoked::Evoked;
use crate::ica::IcaModel;
use crate::psd::{welch, Spectrum};
use crate::recording::RawRecording;
use crate::PipelineOutput;

/// The seven report figures, in the order they are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportStage {
    PsdBeforeFiltering,
    PsdAfterFiltering,
    IcaTopographies,
    RawStatic,
    CleanStatic,
    Erp,
    Butterfly,
}

impl ReportStage {
    pub const ALL: [ReportStage; 7] = [
        Self::PsdBeforeFiltering,
        Self::PsdAfterFiltering,
        Self::IcaTopographies,
        Self::RawStatic,
        Self::CleanStatic,
        Self::Erp,
        Self::Butterfly,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::PsdBeforeFiltering => "01_psd_before_filtering.png",
            Self::PsdAfterFiltering => "02_psd_after_filtering.png",
            Self::IcaTopographies => "03_ica_topographies.png",
            Self::RawStatic => "04_raw_static.png",
            Self::CleanStatic => "05_clean_static.png",
            Self::Erp => "06_erp.png",
            Self::Butterfly => "07_butterfly.png",
        }
    }
}

/// Writes figures into one output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    out_dir: PathBuf,
}

fn plot_err(path: &Path, e: Box<dyn std::error::Error>) -> PipelineError {
    PipelineError::Plot(format!("{}: {e}", path.display()))
}

impl ReportWriter {
    /// Create `out_dir` (and parents) if needed.
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Result<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&out_dir)?;
        Ok(Self { out_dir })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn path(&self, stage: ReportStage) -> PathBuf {
        self.out_dir.join(stage.file_name())
    }

    pub fn psd(&self, stage: ReportStage, spectrum: &Spectrum, title: &str) -> Result<PathBuf> {
        let path = self.path(stage);
        plots::draw_psd(&path, spectrum, title).map_err(|e| plot_err(&path, e))?;
        Ok(path)
    }

    /// First `n_samples` of every channel.
    pub fn traces(&self, stage: ReportStage, raw: &RawRecording, n_samples: usize, title: &str) -> Result<PathBuf> {
        let path = self.path(stage);
        let n = n_samples.min(raw.n_times());
        plots::draw_traces(&path, raw.data.slice(s![.., ..n]), title).map_err(|e| plot_err(&path, e))?;
        Ok(path)
    }

    pub fn ica_topographies(&self, model: &IcaModel, excluded: &[usize]) -> Result<PathBuf> {
        let path = self.path(ReportStage::IcaTopographies);
        plots::draw_topographies(&path, model, excluded).map_err(|e| plot_err(&path, e))?;
        Ok(path)
    }

    pub fn erp(&self, evoked: &Evoked, title: &str) -> Result<PathBuf> {
        let path = self.path(ReportStage::Erp);
        plots::draw_erp(&path, evoked, title).map_err(|e| plot_err(&path, e))?;
        Ok(path)
    }

    pub fn butterfly(&self, evoked: &Evoked, title: &str) -> Result<PathBuf> {
        let path = self.path(ReportStage::Butterfly);
        plots::draw_butterfly(&path, evoked, title).map_err(|e| plot_err(&path, e))?;
        Ok(path)
    }
}

/// Render all seven figures for one pipeline run into `cfg.out_dir`.
///
/// `raw` is the unfiltered recording the run started from.
pub fn write_report(raw: &RawRecording, output: &PipelineOutput, cfg: &PipelineConfig) -> Result<Vec<PathBuf>> {
    let writer = ReportWriter::new(&cfg.out_dir)?;
    let subject = &cfg.subject_id;

    let before = welch(raw, 0.0, cfg.psd_fmax)?;
    let after = welch(&output.filtered, 0.0, cfg.psd_fmax)?;

    let written = vec![
        writer.psd(ReportStage::PsdBeforeFiltering, &before, &format!("PSD before filtering – {subject}"))?,
        writer.psd(ReportStage::PsdAfterFiltering, &after, &format!("PSD after filtering – {subject}"))?,
        writer.ica_topographies(&output.ica, &output.detection.excluded)?,
        writer.traces(ReportStage::RawStatic, raw, cfg.static_samples, "Raw EEG (Static)")?,
        writer.traces(ReportStage::CleanStatic, &output.cleaned, cfg.static_samples, "Clean EEG (After ICA)")?,
        writer.erp(&output.evoked, &format!("ERP {} – {subject}", cfg.target_label))?,
        writer.butterfly(&output.evoked, &format!("Butterfly Plot – {subject}"))?,
    ];
    log::info!("Wrote {} figures to {}", written.len(), writer.out_dir().display());
    Ok(written)
}
