//! Position join between variant and structural records.
//!
//! The primary join is an inner equi-join on protein residue position,
//! compared as canonical decimal strings so integer/format mismatches from
//! upstream never split a key. The fallback join recovers variants that sit
//! inside a structurally covered region without landing on an annotated
//! residue: it joins on accession equality against deduplicated alignment
//! spans, then keeps spans containing the variant position.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::structure::StructuralRecord;
use crate::variant::VariantRecord;

/// Canonicalize a position cell for key comparison: parse to an integer and
/// re-format. Unparseable cells produce no key and therefore never join.
pub fn canonical_position(raw: &str) -> Option<String> {
    raw.trim().parse::<u64>().ok().map(|p| p.to_string())
}

/// One variant together with every structural row sharing its position.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedVariant {
    /// The variant side of the join.
    pub variant: VariantRecord,
    /// All structural rows at the same residue position, one entry per
    /// matching chain/interface.
    pub matches: Vec<StructuralRecord>,
}

/// Result of the position join.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinOutcome {
    /// Variants with at least one positional match.
    pub joined: Vec<JoinedVariant>,
    /// Variants with no matching structural position at all.
    pub unjoined: Vec<VariantRecord>,
}

/// Inner equi-join of variants against structural rows on residue position.
///
/// A variant legitimately matches multiple rows (several chains or
/// interfaces at one residue) and keeps one match entry per row. Variants
/// whose position is still unresolved go straight to `unjoined`.
pub fn join_by_position(
    variants: Vec<VariantRecord>,
    structures: &[StructuralRecord],
) -> JoinOutcome {
    let mut by_position: HashMap<String, Vec<&StructuralRecord>> = HashMap::new();
    for record in structures {
        if let Some(key) = record.protein_position.as_deref().and_then(canonical_position) {
            by_position.entry(key).or_default().push(record);
        }
    }

    let mut outcome = JoinOutcome::default();
    for variant in variants {
        let key = variant.protein_position.as_single().map(|p| p.to_string());
        match key.as_deref().and_then(|k| by_position.get(k)) {
            Some(matches) => outcome.joined.push(JoinedVariant {
                variant,
                matches: matches.iter().map(|&r| r.clone()).collect(),
            }),
            None => outcome.unjoined.push(variant),
        }
    }
    outcome
}

/// A deduplicated aligned region of one protein accession.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentSpan {
    /// Protein accession the span belongs to.
    pub protein_accession: String,
    /// First covered residue (inclusive).
    pub start: u64,
    /// Last covered residue (inclusive).
    pub end: u64,
}

/// A variant recovered by the fallback join, with every covering span.
#[derive(Debug, Clone, PartialEq)]
pub struct CoveredVariant {
    /// The recovered variant.
    pub variant: VariantRecord,
    /// Alignment spans containing the variant position.
    pub spans: Vec<AlignmentSpan>,
}

/// Fallback join for unjoined variants: accession equality against
/// deduplicated `(accession, start, end)` spans, filtered to spans that
/// contain the variant position.
pub fn fallback_by_alignment(
    unjoined: Vec<VariantRecord>,
    structures: &[StructuralRecord],
) -> (Vec<CoveredVariant>, Vec<VariantRecord>) {
    let mut seen: HashSet<AlignmentSpan> = HashSet::new();
    let mut spans_by_accession: HashMap<&str, Vec<AlignmentSpan>> = HashMap::new();
    for record in structures {
        let span = AlignmentSpan {
            protein_accession: record.protein_accession.clone(),
            start: record.protein_alignment_start,
            end: record.protein_alignment_end,
        };
        if seen.insert(span.clone()) {
            spans_by_accession
                .entry(record.protein_accession.as_str())
                .or_default()
                .push(span);
        }
    }

    let mut covered = Vec::new();
    let mut still_unjoined = Vec::new();
    for variant in unjoined {
        let position = match variant.protein_position.as_single() {
            Some(p) => p,
            None => {
                still_unjoined.push(variant);
                continue;
            }
        };
        let spans: Vec<AlignmentSpan> = spans_by_accession
            .get(variant.protein_id.as_str())
            .map(|spans| {
                spans
                    .iter()
                    .filter(|s| s.start <= position && position <= s.end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if spans.is_empty() {
            still_unjoined.push(variant);
        } else {
            covered.push(CoveredVariant { variant, spans });
        }
    }
    (covered, still_unjoined)
}
