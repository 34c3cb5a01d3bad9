//! `.vhdr` header parsing.
//!
//! The header is an INI-style text file:
//!
//! ```text
//! Brain Vision Data Exchange Header File Version 1.0
//! [Common Infos]
//! DataFile=sub-28_task-casinos_eeg.eeg
//! MarkerFile=sub-28_task-casinos_eeg.vmrk
//! DataFormat=BINARY
//! DataOrientation=MULTIPLEXED
//! NumberOfChannels=64
//! SamplingInterval=2000          ; µs per sample → 500 Hz
//! [Binary Infos]
//! BinaryFormat=INT_16
//! [Channel Infos]
//! Ch1=Fp1,,0.1,µV                ; name, reference, resolution, unit
//! ```
use std::collections::HashMap;

use crate::error::{PipelineError, Result};

/// Sample encoding of the `.eeg` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFormat {
    Int16,
    Int32,
    Float32,
}

impl BinaryFormat {
    fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INT_16" => Ok(BinaryFormat::Int16),
            "INT_32" => Ok(BinaryFormat::Int32),
            "IEEE_FLOAT_32" => Ok(BinaryFormat::Float32),
            other => Err(PipelineError::Format(format!("unsupported BinaryFormat {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Sample-major: `ch0 ch1 … chN ch0 ch1 …`.
    Multiplexed,
    /// Channel-major: all samples of ch0, then ch1, ….
    Vectorized,
}

/// One `[Channel Infos]` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub name: String,
    pub reference: String,
    /// Physical units per stored integer step.
    pub resolution: f64,
    pub unit: String,
}

/// Volts per `unit`. Unknown units are taken as µV, the BrainVision default.
pub fn unit_scale(unit: &str) -> f64 {
    match unit.trim() {
        "V" => 1.0,
        "mV" => 1e-3,
        "nV" => 1e-9,
        _ => 1e-6, // µV / uV / μV / empty
    }
}

#[derive(Debug, Clone)]
pub struct VhdrHeader {
    pub data_file: String,
    pub marker_file: Option<String>,
    pub orientation: Orientation,
    pub binary_format: BinaryFormat,
    pub n_channels: usize,
    /// Sampling interval in microseconds.
    pub sampling_interval_us: f64,
    pub channels: Vec<ChannelInfo>,
}

impl VhdrHeader {
    #[inline]
    pub fn sfreq(&self) -> f64 {
        1e6 / self.sampling_interval_us
    }
}

/// Split INI text into `section → key → value`. Comments (`;`) are stripped.
fn parse_sections(text: &str) -> HashMap<String, Vec<(String, String)>> {
    let mut sections: HashMap<String, Vec<(String, String)>> = HashMap::new();
    let mut current = String::new();
    for line in text.lines() {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            current = line[1..line.len() - 1].trim().to_string();
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            // Inline comments only exist in [Common Infos]-style scalar lines.
            let v = match v.split_once(';') {
                Some((before, _)) if !current.eq_ignore_ascii_case("Channel Infos") => before,
                _ => v,
            };
            sections
                .entry(current.clone())
                .or_default()
                .push((k.trim().to_string(), v.trim().to_string()));
        }
    }
    sections
}

fn lookup<'a>(
    sections: &'a HashMap<String, Vec<(String, String)>>,
    section: &str,
    key: &str,
) -> Option<&'a str> {
    sections
        .get(section)?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

fn required<'a>(
    sections: &'a HashMap<String, Vec<(String, String)>>,
    section: &str,
    key: &str,
) -> Result<&'a str> {
    lookup(sections, section, key)
        .ok_or_else(|| PipelineError::Format(format!("header is missing [{section}] {key}")))
}

/// Parse a channel line value: `<name>,<ref>,<resolution>,<unit>`.
///
/// Commas inside the name are escaped as `\1`.
fn parse_channel(value: &str) -> ChannelInfo {
    let fields: Vec<&str> = value.split(',').collect();
    let name = fields.first().copied().unwrap_or_default().replace("\\1", ",");
    let reference = fields.get(1).copied().unwrap_or_default().to_string();
    let resolution = fields
        .get(2)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(1.0);
    let unit = fields.get(3).copied().unwrap_or("µV").trim().to_string();
    ChannelInfo { name, reference, resolution, unit }
}

/// Parse the full text of a `.vhdr` file.
pub fn parse_vhdr(text: &str) -> Result<VhdrHeader> {
    let first = text.lines().next().unwrap_or_default();
    if !first.contains("Vision") || !first.contains("Header File") {
        return Err(PipelineError::Format(format!(
            "not a BrainVision header (first line {first:?})"
        )));
    }
    let s = parse_sections(text);

    let data_file = required(&s, "Common Infos", "DataFile")?.to_string();
    let marker_file = lookup(&s, "Common Infos", "MarkerFile").map(str::to_string);

    let data_format = lookup(&s, "Common Infos", "DataFormat").unwrap_or("BINARY");
    if !data_format.eq_ignore_ascii_case("BINARY") {
        return Err(PipelineError::Format(format!("unsupported DataFormat {data_format:?}")));
    }

    let orientation = match lookup(&s, "Common Infos", "DataOrientation")
        .unwrap_or("MULTIPLEXED")
        .to_ascii_uppercase()
        .as_str()
    {
        "MULTIPLEXED" => Orientation::Multiplexed,
        "VECTORIZED" => Orientation::Vectorized,
        other => {
            return Err(PipelineError::Format(format!("unsupported DataOrientation {other:?}")))
        }
    };

    let n_channels: usize = required(&s, "Common Infos", "NumberOfChannels")?
        .parse()
        .map_err(|e| PipelineError::Format(format!("bad NumberOfChannels: {e}")))?;

    let sampling_interval_us: f64 = required(&s, "Common Infos", "SamplingInterval")?
        .parse()
        .map_err(|e| PipelineError::Format(format!("bad SamplingInterval: {e}")))?;
    if sampling_interval_us <= 0.0 {
        return Err(PipelineError::Format(format!(
            "SamplingInterval must be positive, got {sampling_interval_us}"
        )));
    }

    let binary_format = BinaryFormat::parse(lookup(&s, "Binary Infos", "BinaryFormat").unwrap_or("INT_16"))?;

    let mut channels = Vec::with_capacity(n_channels);
    for i in 1..=n_channels {
        let value = required(&s, "Channel Infos", &format!("Ch{i}"))?;
        channels.push(parse_channel(value));
    }

    Ok(VhdrHeader {
        data_file,
        marker_file,
        orientation,
        binary_format,
        n_channels,
        sampling_interval_us,
        channels,
    })
}
