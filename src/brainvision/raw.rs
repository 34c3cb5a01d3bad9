//! BrainVision recording reader.
//!
//! # Algorithm
//! 1. Read and parse the `.vhdr` header (channel names, units, marker file).
//! 2. Check that `DataFile` / `MarkerFile` exist next to the header.
//! 3. Decode and resolution-scale the samples with `bvreader`.
//! 4. Convert to volts: `volts[ch, t] = scaled[ch, t] × unit_scale[ch]`.
//! 5. Parse markers into annotations; drop any whose onset is past the end.
use std::fs;
use std::path::{Path, PathBuf};

use bvreader::bv_reader::BVFile;
use ndarray::Array2;

use super::header::{parse_vhdr, unit_scale, VhdrHeader};
use super::markers::parse_vmrk;
use crate::error::{PipelineError, Result};
use crate::recording::RawRecording;

fn companion(vhdr: &Path, name: &str, what: &str) -> Result<PathBuf> {
    let dir = vhdr.parent().unwrap_or_else(|| Path::new(""));
    let path = dir.join(name);
    if !path.is_file() {
        return Err(PipelineError::Format(format!(
            "{} references missing {what} {}",
            vhdr.display(),
            path.display()
        )));
    }
    Ok(path)
}

/// Resolution-scaled samples in header units, `[n_ch, n_t]`.
fn read_samples(vhdr: &Path, header: &VhdrHeader) -> Result<Array2<f64>> {
    let path = vhdr
        .to_str()
        .ok_or_else(|| PipelineError::Format(format!("non UTF-8 path {}", vhdr.display())))?;
    let bad = |what: &str, e: &dyn std::fmt::Debug| {
        PipelineError::Format(format!("{what} {}: {e:?}", vhdr.display()))
    };

    let mut file = BVFile::from_header(path).map_err(|e| bad("cannot load", &e))?;
    file.validate().map_err(|e| bad("invalid BrainVision file", &e))?;
    file.bv_data
        .scale_channels(&file.bv_header.channel_info)
        .map_err(|e| bad("cannot scale channels of", &e))?;

    let channels = &file.bv_data.data;
    if channels.len() != header.n_channels {
        return Err(PipelineError::Format(format!(
            "{}: header declares {} channels, data has {}",
            vhdr.display(),
            header.n_channels,
            channels.len()
        )));
    }
    let n_t = channels.first().map(|c| c.len()).unwrap_or(0);
    if channels.iter().any(|c| c.len() != n_t) {
        return Err(PipelineError::Format(format!("{}: channels differ in length", vhdr.display())));
    }
    Ok(Array2::from_shape_fn((header.n_channels, n_t), |(c, t)| channels[c][t] as f64))
}

/// Read a BrainVision recording with all data preloaded.
///
/// Mirrors `mne.io.read_raw_brainvision(vhdr_path, preload=True)`.
pub fn read_raw_brainvision<P: AsRef<Path>>(vhdr_path: P) -> Result<RawRecording> {
    let vhdr_path = vhdr_path.as_ref();
    if !vhdr_path.is_file() {
        return Err(PipelineError::FileNotFound(vhdr_path.to_path_buf()));
    }
    let text = fs::read(vhdr_path)?;
    let header = parse_vhdr(&String::from_utf8_lossy(&text))?;
    log::debug!(
        "{}: {:?} {:?}, {} channels",
        vhdr_path.display(),
        header.binary_format,
        header.orientation,
        header.n_channels
    );

    companion(vhdr_path, &header.data_file, "data file")?;
    let marker_path = match &header.marker_file {
        Some(name) => Some(companion(vhdr_path, name, "marker file")?),
        None => None,
    };

    let mut data = read_samples(vhdr_path, &header)?;
    for (mut row, ch) in data.rows_mut().into_iter().zip(header.channels.iter()) {
        let scale = unit_scale(&ch.unit);
        row.mapv_inplace(|v| v * scale);
    }
    let n_times = data.ncols();

    let mut annotations = match marker_path {
        Some(path) => parse_vmrk(&String::from_utf8_lossy(&fs::read(path)?))?,
        None => Vec::new(),
    };
    let n_markers = annotations.len();
    annotations.retain(|a| a.onset < n_times);
    if annotations.len() < n_markers {
        log::warn!(
            "dropped {} marker(s) beyond the last sample ({n_times})",
            n_markers - annotations.len()
        );
    }

    let ch_names = header.channels.iter().map(|c| c.name.clone()).collect();
    let raw = RawRecording::new(data, header.sfreq(), ch_names, annotations)?;
    log::info!(
        "Loaded {}: {} ch × {} samples @ {} Hz ({:.1} s), {} annotations",
        vhdr_path.display(),
        raw.n_channels(),
        raw.n_times(),
        raw.sfreq,
        raw.duration_secs(),
        raw.annotations.len()
    );
    Ok(raw)
}
