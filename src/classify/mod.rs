//! Variant classification state machine.
//!
//! Every variant ends up in exactly one of four categories, evaluated in
//! strict precedence order; the first matching state is terminal:
//!
//! 1. `Noncoding` — the amino-acid field carries no standard residue code,
//!    so the variant cannot be placed on a structure.
//! 2. `Interface` — the variant position joins a structural row annotated
//!    as an interface contact.
//! 3. `Structure` — the position joins a plain alignment row, or (when the
//!    fallback pass is enabled) falls inside a covered alignment span.
//! 4. `Unmapped` — coding, but nothing structural to land on.
//!
//! Structural rows must be quality-filtered before they reach this module;
//! a filtered-out row is indistinguishable from an absent one here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::join::{fallback_by_alignment, join_by_position, AlignmentSpan};
use crate::structure::StructuralRecord;
use crate::variant::VariantRecord;

/// The 20 standard single-letter amino-acid codes.
pub const AMINO_ACID_ALPHABET: &str = "ACDEFGHIKLMNPQRSTVWY";

/// Whether an `Amino_acids` field describes a protein-altering change.
///
/// The test is a substring check against the fixed residue alphabet: any
/// standard residue letter in the field (e.g. `D/N`, `A`, `KR/K`) counts as
/// coding; `-` or other non-residue content does not.
pub fn is_protein_altering(amino_acids: &str) -> bool {
    amino_acids.chars().any(|c| AMINO_ACID_ALPHABET.contains(c))
}

/// Where a variant landed relative to known structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingCategory {
    /// On an annotated interface residue.
    Interface,
    /// Covered by a structural alignment, but not an interface contact.
    Structure,
    /// Coding, but not structurally resolved at this position.
    Unmapped,
    /// Does not alter the protein sequence.
    Noncoding,
}

impl MappingCategory {
    /// Category name as used in output file stems.
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingCategory::Interface => "Interface",
            MappingCategory::Structure => "Structure",
            MappingCategory::Unmapped => "Unmapped",
            MappingCategory::Noncoding => "Noncoding",
        }
    }

    /// All categories, in precedence order.
    pub const ALL: [MappingCategory; 4] = [
        MappingCategory::Noncoding,
        MappingCategory::Interface,
        MappingCategory::Structure,
        MappingCategory::Unmapped,
    ];
}

impl fmt::Display for MappingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A variant enriched with its terminal classification and, where one
/// exists, the structural evidence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedVariant {
    /// The classified variant.
    pub variant: VariantRecord,
    /// Terminal category.
    pub category: MappingCategory,
    /// The joined structural row, for `Interface` and position-joined
    /// `Structure` records.
    pub structural: Option<StructuralRecord>,
    /// The covering alignment span, for fallback-recovered `Structure`
    /// records.
    pub alignment: Option<AlignmentSpan>,
}

impl ClassifiedVariant {
    fn bare(variant: VariantRecord, category: MappingCategory) -> Self {
        ClassifiedVariant {
            variant,
            category,
            structural: None,
            alignment: None,
        }
    }
}

/// The four output partitions for one protein's variants.
///
/// Categories are pairwise disjoint by variant; a variant may appear more
/// than once *within* a partition when it matches several structural rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    /// Variants on interface residues.
    pub interface: Vec<ClassifiedVariant>,
    /// Variants covered by structure without an interface contact.
    pub structure: Vec<ClassifiedVariant>,
    /// Coding variants with no structural placement.
    pub unmapped: Vec<ClassifiedVariant>,
    /// Variants that do not alter the protein.
    pub noncoding: Vec<ClassifiedVariant>,
}

impl Classification {
    /// Total rows across all partitions.
    pub fn total(&self) -> usize {
        self.interface.len() + self.structure.len() + self.unmapped.len() + self.noncoding.len()
    }

    /// Whether every partition is empty.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// The partition for a category.
    pub fn partition(&self, category: MappingCategory) -> &[ClassifiedVariant] {
        match category {
            MappingCategory::Interface => &self.interface,
            MappingCategory::Structure => &self.structure,
            MappingCategory::Unmapped => &self.unmapped,
            MappingCategory::Noncoding => &self.noncoding,
        }
    }
}

/// Classify one protein's variants against its (already quality-filtered)
/// structural rows.
///
/// `locate_unmapped` enables the fallback alignment-span pass that rescues
/// variants inside covered regions which do not sit on an annotated
/// residue.
pub fn classify(
    variants: Vec<VariantRecord>,
    structures: &[StructuralRecord],
    locate_unmapped: bool,
) -> Classification {
    let mut result = Classification::default();

    // Noncoding wins over everything, including structural evidence.
    let mut coding = Vec::with_capacity(variants.len());
    for variant in variants {
        if is_protein_altering(&variant.amino_acids) {
            coding.push(variant);
        } else {
            result
                .noncoding
                .push(ClassifiedVariant::bare(variant, MappingCategory::Noncoding));
        }
    }

    let outcome = join_by_position(coding, structures);

    for joined in outcome.joined {
        // Interface beats Structure: if any match is an interface row, the
        // variant is terminal there and its plain matches are discarded.
        let has_interface = joined.matches.iter().any(|m| m.is_interface());
        let (category, keep_interface) = if has_interface {
            (MappingCategory::Interface, true)
        } else {
            (MappingCategory::Structure, false)
        };

        for structural in joined
            .matches
            .into_iter()
            .filter(|m| m.is_interface() == keep_interface)
        {
            let record = ClassifiedVariant {
                variant: joined.variant.clone(),
                category,
                structural: Some(structural),
                alignment: None,
            };
            match category {
                MappingCategory::Interface => result.interface.push(record),
                _ => result.structure.push(record),
            }
        }
    }

    let unjoined = outcome.unjoined;
    let (covered, unmapped) = if locate_unmapped {
        fallback_by_alignment(unjoined, structures)
    } else {
        (Vec::new(), unjoined)
    };

    for recovered in covered {
        for span in recovered.spans {
            result.structure.push(ClassifiedVariant {
                variant: recovered.variant.clone(),
                category: MappingCategory::Structure,
                structural: None,
                alignment: Some(span),
            });
        }
    }

    for variant in unmapped {
        result
            .unmapped
            .push(ClassifiedVariant::bare(variant, MappingCategory::Unmapped));
    }

    result
}
