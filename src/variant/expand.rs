//! Range expansion for variant protein positions.
//!
//! Variants whose impact spans several residues arrive with an interval in
//! the `Protein_position` field (`"12-15"`), sometimes with an unresolved
//! `?` bound (`"?-13"`, `"10-?"`). Expansion rewrites each such record into
//! one record per residue so every downstream step sees single integer
//! positions.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::{ProteinPosition, VariantRecord};

/// Interval pattern: two bounds joined by a dash, either bound possibly `?`.
static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+|\?)-(\d+|\?)$").expect("valid range regex"));

/// Expand every interval-positioned record into one record per residue.
///
/// Single-position records pass through untouched and input relative order
/// is preserved. An unresolved `?` bound collapses to its resolved
/// counterpart (`"?-13"` expands as `"13-13"`). Records whose position
/// cannot be turned into an ordered integer interval are dropped with a
/// warning; a reversed interval after resolution expands to nothing.
pub fn expand_ranges(records: Vec<VariantRecord>) -> Vec<VariantRecord> {
    let mut expanded = Vec::with_capacity(records.len());

    for record in records {
        match &record.protein_position {
            ProteinPosition::Single(_) => expanded.push(record),
            ProteinPosition::Raw(raw) => match RANGE_RE.captures(raw) {
                Some(caps) => {
                    let raw_start = caps.get(1).map(|m| m.as_str()).unwrap_or("?");
                    let raw_end = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
                    expand_one(&record, raw, raw_start, raw_end, &mut expanded);
                }
                None => {
                    warn!(
                        variant = %record.variant_id,
                        position = %raw,
                        "dropping variant with unparseable protein position"
                    );
                }
            },
        }
    }

    expanded
}

fn expand_one(
    record: &VariantRecord,
    raw: &str,
    raw_start: &str,
    raw_end: &str,
    out: &mut Vec<VariantRecord>,
) {
    // An unresolved bound is treated as equal to its resolved counterpart,
    // which keeps the interval bounded and ordered.
    let (raw_start, raw_end) = match (raw_start, raw_end) {
        ("?", "?") => {
            warn!(
                variant = %record.variant_id,
                position = %raw,
                "dropping variant range with two unresolved bounds"
            );
            return;
        }
        ("?", end) => (end, end),
        (start, "?") => (start, start),
        (start, end) => (start, end),
    };

    let (start, end) = match (raw_start.parse::<u64>(), raw_end.parse::<u64>()) {
        (Ok(s), Ok(e)) => (s, e),
        _ => {
            warn!(
                variant = %record.variant_id,
                position = %raw,
                "dropping variant range with non-numeric bound"
            );
            return;
        }
    };

    if start > end {
        warn!(
            variant = %record.variant_id,
            position = %raw,
            "reversed interval expands to nothing"
        );
        return;
    }

    for pos in start..=end {
        let mut copy = record.clone();
        copy.protein_position = ProteinPosition::Single(pos);
        out.push(copy);
    }
}
