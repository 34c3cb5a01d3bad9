//! Epoch baseline correction.
//!
//! `rescale_mean_inplace` matches `mne.baseline.rescale(mode='mean')`:
//!   for each epoch and channel: `epoch[c, :] -= mean(epoch[c, bmin..=bmax])`
use std::ops::Range;

use ndarray::{s, Array3};

use crate::error::{PipelineError, Result};

/// Baseline window in seconds; `None` means the corresponding window edge.
pub type Baseline = (Option<f64>, Option<f64>);

/// Resolve a baseline against an epoch time axis into a half-open sample range.
///
/// The window must lie inside `[times[0], times[last]]`.
pub fn baseline_range(times: &[f64], baseline: Baseline) -> Result<Range<usize>> {
    let (Some(&first), Some(&last)) = (times.first(), times.last()) else {
        return Err(PipelineError::InvalidParameter("empty epoch time axis".into()));
    };
    let bmin = baseline.0.unwrap_or(first);
    let bmax = baseline.1.unwrap_or(last);
    // Half a sample of slack for rounding in the time axis.
    let slack = if times.len() > 1 { (times[1] - times[0]) / 2.0 } else { 0.0 };
    if bmin > bmax || bmin < first - slack || bmax > last + slack {
        return Err(PipelineError::InvalidParameter(format!(
            "baseline ({bmin}, {bmax}) must lie within the epoch window ({first}, {last})"
        )));
    }
    let start = times.iter().position(|&t| t >= bmin - slack).unwrap_or(0);
    let stop = times
        .iter()
        .rposition(|&t| t <= bmax + slack)
        .map_or(times.len(), |i| i + 1);
    if start >= stop {
        return Err(PipelineError::InvalidParameter(format!(
            "baseline ({bmin}, {bmax}) contains no samples"
        )));
    }
    Ok(start..stop)
}

/// Per-channel, per-epoch baseline correction over `range`.
/// `epochs`: [E, C, T]  →  epoch[e, c, :] -= mean(epoch[e, c, range])
pub fn rescale_mean_inplace(epochs: &mut Array3<f64>, range: Range<usize>) {
    let (n_e, n_c, _n_t) = epochs.dim();
    for e in 0..n_e {
        for c in 0..n_c {
            let m = epochs
                .slice(s![e, c, range.clone()])
                .mean()
                .unwrap_or(0.0);
            epochs.slice_mut(s![e, c, ..]).mapv_inplace(|v| v - m);
        }
    }
}
