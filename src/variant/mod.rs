//! Annotated variant records
//!
//! A [`VariantRecord`] is one annotated genomic variant mapped onto a
//! transcript/protein, as produced by an upstream annotation tool. The raw
//! `Protein_position` field may be a single residue or a closed interval;
//! [`expand`](crate::variant::expand) rewrites every record down to single
//! positions before any join.

pub mod expand;
pub mod reader;

pub use expand::expand_ranges;
pub use reader::{read_variant_table, read_variant_table_for_protein};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Protein position of a variant: either an already-resolved residue number
/// or the raw field content (interval, placeholder, or empty marker).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProteinPosition {
    /// A single residue position.
    Single(u64),
    /// Unresolved field content, e.g. `"12-15"`, `"?-13"` or `"-"`.
    Raw(String),
}

impl ProteinPosition {
    /// Parse a raw `Protein_position` cell.
    pub fn parse(cell: &str) -> Self {
        let trimmed = cell.trim();
        match trimmed.parse::<u64>() {
            Ok(pos) => ProteinPosition::Single(pos),
            Err(_) => ProteinPosition::Raw(trimmed.to_string()),
        }
    }

    /// The resolved residue number, if this is a single position.
    pub fn as_single(&self) -> Option<u64> {
        match self {
            ProteinPosition::Single(pos) => Some(*pos),
            ProteinPosition::Raw(_) => None,
        }
    }
}

impl fmt::Display for ProteinPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProteinPosition::Single(pos) => write!(f, "{}", pos),
            ProteinPosition::Raw(raw) => write!(f, "{}", raw),
        }
    }
}

/// One annotated genomic variant mapped to a transcript/protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Stable variant identity (e.g. `1_12345_A/G` or an rsID).
    pub variant_id: String,

    /// Ensembl gene identifier.
    pub gene_id: String,

    /// Transcript (feature) identifier.
    pub transcript_id: String,

    /// Protein accession the position refers to.
    pub protein_id: String,

    /// Residue position, single after range expansion.
    pub protein_position: ProteinPosition,

    /// Amino acid change (e.g. `D/N`); `-` or other non-residue content
    /// marks a variant that does not alter the protein sequence.
    pub amino_acids: String,

    /// Predicted consequence tags (pipe-joined in the input).
    pub consequence: Vec<String>,

    /// Alternate identifier (e.g. dbSNP rsID), None if absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_variation: Option<String>,

    /// APPRIS principal-isoform label, passed through to output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isoform_tag: Option<String>,
}

impl VariantRecord {
    /// Whether any consequence tag is in the allowed set.
    pub fn has_consequence(&self, allowed: &[String]) -> bool {
        self.consequence.iter().any(|c| allowed.contains(c))
    }

    /// A minimal record for tests and examples.
    pub fn test_record(
        variant_id: &str,
        protein_id: &str,
        protein_position: &str,
        amino_acids: &str,
    ) -> Self {
        VariantRecord {
            variant_id: variant_id.to_string(),
            gene_id: "ENSG00000000001".to_string(),
            transcript_id: "ENST00000000001".to_string(),
            protein_id: protein_id.to_string(),
            protein_position: ProteinPosition::parse(protein_position),
            amino_acids: amino_acids.to_string(),
            consequence: vec!["missense_variant".to_string()],
            existing_variation: None,
            isoform_tag: None,
        }
    }
}
