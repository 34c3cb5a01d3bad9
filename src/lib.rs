//! # casinos-erp — single-subject ERP pipeline in pure Rust
//!
//! Loads one BrainVision recording from the casinos gambling task, cleans it
//! and produces the averaged event-related potential for one stimulus label,
//! plus a set of diagnostic figures. Every DSP step follows the
//! [MNE-Python](https://mne.tools) defaults it replaces.
//!
//! ## Pipeline overview
//!
//! ```text
//! sub-XX_task-casinos_eeg.vhdr (+ .eeg, .vmrk)
//!   │
//!   ├─ brainvision::read_raw_brainvision()   header + binary + markers → volts
//!   ├─ montage::standard_1020()              electrode positions (missing ignored)
//!   ├─ filter (FIR band-pass)                0.1 – 30 Hz, zero-phase overlap-add
//!   ├─ reference                             average reference
//!   ├─ ica::Ica::fit()                       PCA whitening + FastICA (seeded)
//!   ├─ ica::ArtifactDetector                 blink-correlated components flagged
//!   ├─ IcaModel::apply()                     flagged components removed
//!   ├─ epochs::Epochs::new()                 "Stimulus/S 11", −0.2 … 0.8 s, baseline (−0.2, 0)
//!   └─ Epochs::average()                     evoked response
//!        │
//!        └─→ report::write_report()          01 … 07 PNG figures
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use casinos_erp::{load_subject, run_pipeline, write_report, PipelineConfig};
//!
//! let cfg = PipelineConfig { data_root: "ds004147".into(), ..PipelineConfig::default() };
//! let raw = load_subject(&cfg).unwrap();
//! let out = run_pipeline(&raw, &cfg).unwrap();
//! println!("{} epochs, removed components {:?}", out.epochs.len(), out.detection.excluded);
//! write_report(&raw, &out, &cfg).unwrap();
//! ```
//!
//! ## Running individual steps
//!
//! ```no_run
//! use casinos_erp::brainvision::read_raw_brainvision;
//! use casinos_erp::filter::filter_recording;
//! use casinos_erp::reference::{set_reference, ReferenceMode};
//! use casinos_erp::ica::{ArtifactDetector, CorrelationDetector, Ica};
//!
//! let raw = read_raw_brainvision("sub-28/eeg/sub-28_task-casinos_eeg.vhdr").unwrap();
//! let filt = filter_recording(&raw, Some(0.1), Some(30.0)).unwrap();
//! let filt = set_reference(&filt, &ReferenceMode::Average).unwrap();
//! let model = Ica::new(20, 42).fit(&filt).unwrap();
//! let found = CorrelationDetector::default().detect(&model, &filt).unwrap();
//! let clean = model.apply(&filt, &found.excluded).unwrap();
//! ```

pub mod annotations;
pub mod baseline;
pub mod brainvision;
pub mod config;
pub mod epochs;
pub mod error;
pub mod evoked;
pub mod filter;
pub mod ica;
pub mod montage;
pub mod psd;
pub mod recording;
pub mod reference;
pub mod report;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use annotations::{
    events_from_annotations, lookup_event_code, Annotation, Event, EventCodeScheme, EventId,
};
pub use baseline::{baseline_range, rescale_mean_inplace, Baseline};
pub use brainvision::read_raw_brainvision;
pub use config::PipelineConfig;
pub use epochs::Epochs;
pub use error::{PipelineError, Result};
pub use evoked::{average, Evoked};
pub use filter::{apply_fir_zero_phase, design_bandpass, filter_1d, filter_recording};
pub use ica::{
    pearson, ArtifactDetector, ArtifactStrategy, CorrelationDetector, Detection, EogScoreDetector,
    Ica, IcaModel,
};
pub use montage::{standard_1020, Montage};
pub use psd::{welch, Spectrum};
pub use recording::RawRecording;
pub use reference::{average_reference_inplace, set_reference, ReferenceMode};
pub use report::{write_report, ReportStage, ReportWriter};

/// Every intermediate product of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Band-passed copy of the input.
    pub filtered: RawRecording,
    /// `filtered` after re-referencing; the data ICA was fitted on.
    pub referenced: RawRecording,
    pub ica: IcaModel,
    pub detection: Detection,
    /// `referenced` with the flagged components removed.
    pub cleaned: RawRecording,
    pub events: Vec<Event>,
    pub event_id: EventId,
    pub epochs: Epochs,
    pub evoked: Evoked,
}

/// Read the configured subject's recording and attach 10-20 positions.
pub fn load_subject(cfg: &PipelineConfig) -> Result<RawRecording> {
    let mut raw = read_raw_brainvision(cfg.vhdr_path())?;
    let n = raw.set_montage(&standard_1020());
    log::info!("Montage standard_1020: {n}/{} channels positioned", raw.n_channels());
    Ok(raw)
}

/// Run stages 2 – 5 on a loaded recording.
///
/// # Pipeline steps
///
/// 1. Zero-phase FIR band-pass `[cfg.l_freq, cfg.h_freq]` on a copy.
/// 2. Re-reference ([`PipelineConfig::reference`]).
/// 3. Fit FastICA with `cfg.n_components` and `cfg.random_state`.
/// 4. Flag blink components with the configured [`ArtifactStrategy`] and
///    remove them.
/// 5. Convert annotations to events, look up `cfg.target_label`, cut epochs
///    `[cfg.tmin, cfg.tmax]` with `cfg.baseline`, and average them.
///
/// # Errors
///
/// * [`PipelineError::MissingChannel`] if no blink proxy channel exists.
/// * [`PipelineError::LabelNotFound`] if the target label has no events;
///   the message lists every label that does.
/// * [`PipelineError::EmptyEpochs`] if every occurrence was dropped.
/// * Filter, ICA or baseline parameter errors as [`PipelineError::InvalidParameter`].
pub fn run_pipeline(raw: &RawRecording, cfg: &PipelineConfig) -> Result<PipelineOutput> {
    let filtered = filter_recording(raw, Some(cfg.l_freq), Some(cfg.h_freq))?;
    let referenced = set_reference(&filtered, &cfg.reference)?;

    let ica = Ica::new(cfg.n_components, cfg.random_state)
        .max_iter(cfg.ica_max_iter)
        .fit(&referenced)?;
    let detection = cfg.detector().detect(&ica, &referenced)?;
    let cleaned = ica.apply(&referenced, &detection.excluded)?;

    let (events, event_id) = events_from_annotations(&cleaned.annotations, EventCodeScheme::BrainVision);
    let code = lookup_event_code(&event_id, &cfg.target_label)?;
    let epochs = Epochs::new(&cleaned, &events, &cfg.target_label, code, cfg.tmin, cfg.tmax, cfg.baseline)?;
    let evoked = epochs.average()?;
    if let Some((ch, ptp)) = evoked.peak_channel() {
        log::info!(
            "Evoked {}: {} epochs, largest response on {} ({:.2} µV peak-to-peak)",
            cfg.target_label,
            evoked.nave,
            evoked.ch_names[ch],
            ptp * 1e6
        );
    }

    Ok(PipelineOutput {
        filtered,
        referenced,
        ica,
        detection,
        cleaned,
        events,
        event_id,
        epochs,
        evoked,
    })
}
