//! BrainVision (`.vhdr` / `.eeg` / `.vmrk`) reader.
//!
//! # Quick start
//! ```no_run
//! use casinos_erp::brainvision::read_raw_brainvision;
//!
//! let raw = read_raw_brainvision("sub-28/eeg/sub-28_task-casinos_eeg.vhdr").unwrap();
//! println!("{} channels @ {} Hz", raw.n_channels(), raw.sfreq);
//! ```
pub mod header;
pub mod markers;
pub mod raw;

pub use header::{parse_vhdr, BinaryFormat, ChannelInfo, Orientation, VhdrHeader};
pub use markers::parse_vmrk;
pub use raw::read_raw_brainvision;
