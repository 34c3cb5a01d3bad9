//! Error taxonomy for the ERP pipeline.
//!
//! Three families, all fatal to a run:
//!
//! * resource errors — the header or a companion file is missing or malformed;
//! * configuration errors — a requested channel or stimulus label is not in
//!   the recording (the message lists what *is* there);
//! * precondition errors — nothing left to average after dropping epochs.
use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("malformed recording: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel(s) {channels:?} not found in recording; available: {available:?}")]
    MissingChannel {
        channels: Vec<String>,
        available: Vec<String>,
    },

    #[error("{label:?} not found in event_id. Available: {}", format_event_id(.available))]
    LabelNotFound {
        label: String,
        available: BTreeMap<String, i32>,
    },

    #[error("no epochs left for {label:?} ({n_dropped} dropped as out of bounds)")]
    EmptyEpochs { label: String, n_dropped: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("numerical error: {0}")]
    Numerical(String),

    #[error("plot rendering failed: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

fn format_event_id(map: &BTreeMap<String, i32>) -> String {
    if map.is_empty() {
        return "{}".to_string();
    }
    let body: Vec<String> = map.iter().map(|(k, v)| format!("'{k}': {v}")).collect();
    format!("{{{}}}", body.join(", "))
}
