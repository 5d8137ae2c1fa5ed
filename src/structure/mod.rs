//! Structural alignment and interface records
//!
//! A [`StructuralRecord`] describes how one PDB chain aligns to a protein
//! accession. When the row annotates an interface contact it additionally
//! carries an [`InterfaceAnnotation`]; a record without one covers the
//! residue range but is not itself an interface contact. The distinction is
//! part of the schema, never inferred from which columns happen to exist.

pub mod filter;
pub mod reader;

pub use filter::{filter_by_quality, QualityThresholds};
pub use reader::read_structural_table;

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the interface residue is in contact with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InteractionType {
    /// Contact with another protein chain.
    #[default]
    Protein,
    /// Contact with a bound ligand.
    Ligand,
    /// Contact with DNA or RNA.
    Nucleic,
}

impl InteractionType {
    /// Parse the controlled-vocabulary cell, case-insensitively.
    pub fn parse(cell: &str) -> Option<Self> {
        match cell.trim().to_ascii_lowercase().as_str() {
            "protein" => Some(InteractionType::Protein),
            "ligand" => Some(InteractionType::Ligand),
            "nucleic" | "nucleic_acid" | "dna" | "rna" => Some(InteractionType::Nucleic),
            _ => None,
        }
    }

    /// Canonical lower-case tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Protein => "protein",
            InteractionType::Ligand => "ligand",
            InteractionType::Nucleic => "nucleic",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interface annotation attached to a structural record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterfaceAnnotation {
    /// Stable interface identity key, joined against by the downstream
    /// set-based test.
    pub structure_feature_id: String,

    /// Chain the annotated residue is in contact with.
    pub interacting_chain: String,

    /// Kind of contact partner.
    pub interaction_type: InteractionType,

    /// Minimum observed contact distance in angstroms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_distance: Option<f64>,
}

/// One row of the structural/interface table: a PDB chain aligned to a
/// protein accession, optionally flagged as an interface residue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralRecord {
    /// Four-character PDB entry code.
    pub pdb_code: String,

    /// Chain identifier within the PDB entry.
    pub pdb_chain: String,

    /// Protein accession the chain was aligned to.
    pub protein_accession: String,

    /// First residue of the protein covered by the alignment (inclusive).
    pub protein_alignment_start: u64,

    /// Last residue of the protein covered by the alignment (inclusive).
    pub protein_alignment_end: u64,

    /// First residue of the chain covered by the alignment (inclusive).
    pub pdb_alignment_start: u64,

    /// Last residue of the chain covered by the alignment (inclusive).
    pub pdb_alignment_end: u64,

    /// Alignment percent identity.
    pub percent_identity: f64,

    /// Alignment e-value.
    pub e_value: f64,

    /// Residue implicated by this row, when the row pins one down. Kept as
    /// the raw cell; join keys are canonicalized at join time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_position: Option<String>,

    /// Present iff the row is an interface residue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<InterfaceAnnotation>,
}

impl StructuralRecord {
    /// Whether the row annotates an interface contact.
    pub fn is_interface(&self) -> bool {
        self.interface.is_some()
    }

    /// Whether a residue position falls inside the aligned protein range.
    pub fn covers(&self, position: u64) -> bool {
        self.protein_alignment_start <= position && position <= self.protein_alignment_end
    }

    /// A minimal plain-alignment record for tests and examples.
    pub fn test_record(
        pdb_code: &str,
        pdb_chain: &str,
        protein_accession: &str,
        alignment_start: u64,
        alignment_end: u64,
    ) -> Self {
        StructuralRecord {
            pdb_code: pdb_code.to_string(),
            pdb_chain: pdb_chain.to_string(),
            protein_accession: protein_accession.to_string(),
            protein_alignment_start: alignment_start,
            protein_alignment_end: alignment_end,
            pdb_alignment_start: alignment_start,
            pdb_alignment_end: alignment_end,
            percent_identity: 100.0,
            e_value: 1e-50,
            protein_position: None,
            interface: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_type_parses_vocabulary() {
        assert_eq!(InteractionType::parse("protein"), Some(InteractionType::Protein));
        assert_eq!(InteractionType::parse("LIGAND"), Some(InteractionType::Ligand));
        assert_eq!(InteractionType::parse("dna"), Some(InteractionType::Nucleic));
        assert_eq!(InteractionType::parse("-"), None);
        assert_eq!(InteractionType::parse(""), None);
    }

    #[test]
    fn coverage_is_inclusive_on_both_ends() {
        let rec = StructuralRecord::test_record("1abc", "A", "ENSP1", 10, 20);
        assert!(rec.covers(10));
        assert!(rec.covers(20));
        assert!(!rec.covers(9));
        assert!(!rec.covers(21));
    }
}
