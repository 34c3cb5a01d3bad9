//! Re-referencing.
//!
//! Average reference subtracts the mean across channels at each time point,
//! matching `raw.set_eeg_reference('average', projection=False)`:
//!
//! `data`: [C, T]  →  `data[c, t] -= mean(data[:, t])`
use ndarray::{Array2, Axis};

use crate::error::Result;
use crate::recording::RawRecording;

/// Reference scheme applied after filtering.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReferenceMode {
    /// Every channel contributes equally; used when no mastoid electrodes exist.
    #[default]
    Average,
    /// Subtract the mean of the named channels.
    Channels(Vec<String>),
    /// Keep the recording reference.
    None,
}

pub fn average_reference_inplace(data: &mut Array2<f64>) {
    let Some(means) = data.mean_axis(Axis(0)) else { return }; // shape [T]
    for mut row in data.rows_mut() {
        row -= &means;
    }
}

/// Return a re-referenced copy of `raw`.
pub fn set_reference(raw: &RawRecording, mode: &ReferenceMode) -> Result<RawRecording> {
    let mut data = raw.data.clone();
    match mode {
        ReferenceMode::Average => average_reference_inplace(&mut data),
        ReferenceMode::Channels(names) => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let reference = raw.pick_channels(&names)?;
            if let Some(means) = reference.mean_axis(Axis(0)) {
                for mut row in data.rows_mut() {
                    row -= &means;
                }
            }
        }
        ReferenceMode::None => {}
    }
    log::info!("Applied {mode:?} reference");
    raw.with_data(data)
}
