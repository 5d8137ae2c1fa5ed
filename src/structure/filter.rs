//! Quality filtering of structural records.
//!
//! Alignment rows below the configured quality thresholds are removed
//! before any join, so a variant can only ever match a structural row that
//! passed. When filtering empties the set, the error reports the best
//! values actually present so the caller can retry with looser thresholds.

use serde::{Deserialize, Serialize};

use crate::error::StructmapError;
use crate::Result;

use super::StructuralRecord;

/// Minimum quality thresholds for structural rows. A missing threshold
/// disables filtering on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Keep rows with `percent_identity >= min_pident`.
    pub min_pident: Option<f64>,

    /// Keep rows with `e_value >= min_evalue`. The comparison direction is
    /// a lower bound, matching the upstream pipeline's semantics.
    pub min_evalue: Option<f64>,
}

impl QualityThresholds {
    /// Thresholds that keep everything.
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a record passes both thresholds.
    pub fn passes(&self, record: &StructuralRecord) -> bool {
        let pident_ok = self
            .min_pident
            .map_or(true, |min| record.percent_identity >= min);
        let evalue_ok = self.min_evalue.map_or(true, |min| record.e_value >= min);
        pident_ok && evalue_ok
    }
}

/// Filter structural records by quality thresholds.
///
/// Returns `FilteredEmpty` when a non-empty input filters down to nothing,
/// carrying the maximum percent identity and minimum e-value present in the
/// unfiltered input as diagnostic feedback. An empty input passes through
/// as an empty output; "no structure at all" is a different condition owned
/// by the caller.
pub fn filter_by_quality(
    records: Vec<StructuralRecord>,
    thresholds: &QualityThresholds,
) -> Result<Vec<StructuralRecord>> {
    if records.is_empty() {
        return Ok(records);
    }

    let best_pident = records
        .iter()
        .map(|r| r.percent_identity)
        .fold(f64::NEG_INFINITY, f64::max);
    let best_evalue = records.iter().map(|r| r.e_value).fold(f64::INFINITY, f64::min);

    let kept: Vec<StructuralRecord> = records
        .into_iter()
        .filter(|r| thresholds.passes(r))
        .collect();

    if kept.is_empty() {
        return Err(StructmapError::FilteredEmpty {
            best_pident,
            best_evalue,
        });
    }
    Ok(kept)
}
