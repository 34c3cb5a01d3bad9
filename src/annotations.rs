//! Annotations and the event code table.
//!
//! Mirrors `mne.events_from_annotations`: every annotation whose description
//! maps to an integer code becomes an `(sample, code)` event, and the
//! description → code mapping is returned alongside.
use std::collections::BTreeMap;

use crate::error::{PipelineError, Result};

/// One marker from the recording's annotation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// 0-based sample index of the marker onset.
    pub onset: usize,
    /// Duration in samples (BrainVision markers are usually 1).
    pub duration: usize,
    /// Free-text label, e.g. `"Stimulus/S 11"`.
    pub description: String,
}

impl Annotation {
    pub fn new(onset: usize, description: impl Into<String>) -> Self {
        Self { onset, duration: 1, description: description.into() }
    }
}

/// A single event: the sample where it occurs and its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub sample: usize,
    pub code: i32,
}

/// Description → integer code.
pub type EventId = BTreeMap<String, i32>;

/// How descriptions are turned into integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventCodeScheme {
    /// BrainVision convention: `Stimulus/S n` → n, `Response/R n` → 1000 + n,
    /// `Optic/O n` → 2000 + n, `New Segment/` → 99999,
    /// `SyncStatus/Sync On` → 99998; anything else is numbered from 10001 in
    /// sorted order.
    #[default]
    BrainVision,
    /// Sorted distinct descriptions numbered from 1.
    Sequential,
}

const BV_OTHER_OFFSET: i32 = 10001;
const BV_NEW_SEGMENT: i32 = 99999;
const BV_SYNC_ON: i32 = 99998;

fn brainvision_code(description: &str) -> Option<i32> {
    match description {
        "New Segment/" => return Some(BV_NEW_SEGMENT),
        "SyncStatus/Sync On" => return Some(BV_SYNC_ON),
        _ => {}
    }
    let (kind, rest) = description.split_once('/')?;
    let offset = match kind {
        "Stimulus" => 0,
        "Response" => 1000,
        "Optic" => 2000,
        _ => return None,
    };
    // "S 11", "S  1", "R128" → numeric tail
    let digits = rest.get(1..)?.trim();
    let n: i32 = digits.parse().ok()?;
    Some(offset + n)
}

/// Build the event list and code table from annotations.
///
/// Events come out in annotation order (non-decreasing sample). Every
/// distinct description gets a table entry.
pub fn events_from_annotations(
    annotations: &[Annotation],
    scheme: EventCodeScheme,
) -> (Vec<Event>, EventId) {
    let mut event_id = EventId::new();

    match scheme {
        EventCodeScheme::BrainVision => {
            let mut others: Vec<&str> = Vec::new();
            for a in annotations {
                match brainvision_code(&a.description) {
                    Some(code) => {
                        event_id.insert(a.description.clone(), code);
                    }
                    None => others.push(&a.description),
                }
            }
            others.sort_unstable();
            others.dedup();
            for (i, desc) in others.into_iter().enumerate() {
                event_id.insert(desc.to_string(), BV_OTHER_OFFSET + i as i32);
            }
        }
        EventCodeScheme::Sequential => {
            let mut descs: Vec<&str> = annotations.iter().map(|a| a.description.as_str()).collect();
            descs.sort_unstable();
            descs.dedup();
            for (i, desc) in descs.into_iter().enumerate() {
                event_id.insert(desc.to_string(), i as i32 + 1);
            }
        }
    }

    let events: Vec<Event> = annotations
        .iter()
        .filter_map(|a| {
            event_id
                .get(&a.description)
                .map(|&code| Event { sample: a.onset, code })
        })
        .collect();

    log::debug!("{} events from {} annotations, {} codes", events.len(), annotations.len(), event_id.len());
    (events, event_id)
}

/// Look up `label` in the code table, failing with the list of present labels.
pub fn lookup_event_code(event_id: &EventId, label: &str) -> Result<i32> {
    event_id
        .get(label)
        .copied()
        .ok_or_else(|| PipelineError::LabelNotFound {
            label: label.to_string(),
            available: event_id.clone(),
        })
}
