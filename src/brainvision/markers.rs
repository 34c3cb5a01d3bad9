//! `.vmrk` marker parsing.
//!
//! ```text
//! [Marker Infos]
//! ; Mk<n>=<Type>,<Description>,<Position>,<Size>,<Channel>[,<Date>]
//! Mk1=New Segment,,1,1,0,20190410120000000000
//! Mk2=Stimulus,S 11,5012,1,0
//! ```
//!
//! Positions are 1-based on disk; annotations use 0-based sample indices.
use crate::annotations::Annotation;
use crate::error::{PipelineError, Result};

pub fn parse_vmrk(text: &str) -> Result<Vec<Annotation>> {
    let mut in_markers = false;
    let mut out = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_markers = line.eq_ignore_ascii_case("[Marker Infos]");
            continue;
        }
        if !in_markers {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else { continue };
        if !key.trim().starts_with("Mk") {
            continue;
        }

        let fields: Vec<&str> = value.split(',').collect();
        if fields.len() < 3 {
            return Err(PipelineError::Format(format!(
                "marker on line {} has {} fields, need at least 3",
                lineno + 1,
                fields.len()
            )));
        }
        let kind = fields[0].trim();
        let desc = fields[1].replace("\\1", ",");
        let pos: usize = fields[2].trim().parse().map_err(|e| {
            PipelineError::Format(format!("marker on line {}: bad position: {e}", lineno + 1))
        })?;
        let size: usize = fields
            .get(3)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(1);

        out.push(Annotation {
            onset: pos.saturating_sub(1),
            duration: size,
            description: format!("{kind}/{desc}"),
        });
    }

    // Markers are usually written in order, but nothing enforces it.
    out.sort_by_key(|a| a.onset);
    Ok(out)
}
