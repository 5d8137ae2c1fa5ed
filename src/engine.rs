//! Per-protein classification pipeline.
//!
//! One call of [`classify_protein`] runs the full sequence for a single
//! protein: variant filtering, range expansion, structural quality
//! filtering, position join, classification and output. Proteins are
//! independent; the batch and parallel layers just repeat this call.

use tracing::{debug, info, warn};

use crate::classify::{classify, is_protein_altering, Classification};
use crate::config::MapperConfig;
use crate::error::StructmapError;
use crate::output::OutputWriter;
use crate::structure::{filter_by_quality, StructuralRecord};
use crate::variant::{expand_ranges, VariantRecord};
use crate::Result;

/// Per-category row counts for one protein's run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProteinStats {
    /// Protein the counts belong to.
    pub protein_id: String,
    /// Rows classified `Interface`.
    pub interface: usize,
    /// Rows classified `Structure`.
    pub structure: usize,
    /// Rows classified `Unmapped`.
    pub unmapped: usize,
    /// Rows classified `Noncoding`.
    pub noncoding: usize,
}

impl ProteinStats {
    fn from_classification(protein_id: &str, classification: &Classification) -> Self {
        ProteinStats {
            protein_id: protein_id.to_string(),
            interface: classification.interface.len(),
            structure: classification.structure.len(),
            unmapped: classification.unmapped.len(),
            noncoding: classification.noncoding.len(),
        }
    }

    /// Total rows across all categories.
    pub fn total(&self) -> usize {
        self.interface + self.structure + self.unmapped + self.noncoding
    }
}

/// Run the classification pipeline for one protein and append the results.
///
/// Errors returned with [`StructmapError::is_recoverable`] describe this
/// protein only; batch callers log them and continue. Output failures are
/// run-fatal.
pub fn classify_protein(
    protein_id: &str,
    variants: Vec<VariantRecord>,
    structures: Vec<StructuralRecord>,
    config: &MapperConfig,
    writer: &OutputWriter,
) -> Result<ProteinStats> {
    if variants.is_empty() && structures.is_empty() {
        return Err(StructmapError::NoData {
            protein_id: protein_id.to_string(),
        });
    }

    let variants = apply_variant_filters(variants, config);

    // Only coding records go through range expansion: a noncoding variant
    // often carries no protein position at all, and its terminal category
    // does not depend on one.
    let (coding, noncoding): (Vec<_>, Vec<_>) = variants
        .into_iter()
        .partition(|v| is_protein_altering(&v.amino_acids));
    let mut variants = expand_ranges(coding);
    variants.extend(noncoding);

    if structures.is_empty() {
        warn!(
            protein = %protein_id,
            "protein is not structurally resolved, coding variants go to Unmapped"
        );
    }

    let structures = match filter_by_quality(structures, &config.thresholds()) {
        Ok(kept) => kept,
        // Downgrade: classify as if the protein had no structural rows, but
        // tell the user how close the input came to the thresholds.
        Err(e @ StructmapError::FilteredEmpty { .. }) => {
            warn!(protein = %protein_id, "{}", e);
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    let classification = classify(variants, &structures, config.locate_unmapped);
    if classification.is_empty() {
        info!(
            protein = %protein_id,
            "no rows remained after category assignment"
        );
        return Err(StructmapError::NoMatchAfterFilter {
            protein_id: protein_id.to_string(),
        });
    }

    writer.write_classification(&classification)?;

    let stats = ProteinStats::from_classification(protein_id, &classification);
    debug!(
        protein = %protein_id,
        interface = stats.interface,
        structure = stats.structure,
        unmapped = stats.unmapped,
        noncoding = stats.noncoding,
        "classified protein"
    );
    Ok(stats)
}

fn apply_variant_filters(variants: Vec<VariantRecord>, config: &MapperConfig) -> Vec<VariantRecord> {
    variants
        .into_iter()
        .filter(|v| match &config.consequence_filter {
            Some(allowed) => v.has_consequence(allowed),
            None => true,
        })
        .filter(|v| match &config.isoform_filter {
            Some(tag) => v.isoform_tag.as_deref() == Some(tag.as_str()),
            None => true,
        })
        .collect()
}
