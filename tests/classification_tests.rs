//! End-to-end classification scenario tests

use ferro_structmap::classify::{classify, is_protein_altering, MappingCategory};
use ferro_structmap::structure::{
    filter_by_quality, InterfaceAnnotation, QualityThresholds, StructuralRecord,
};
use ferro_structmap::variant::{expand_ranges, ProteinPosition, VariantRecord};
use ferro_structmap::StructmapError;

fn variant(id: &str, position: &str, amino_acids: &str) -> VariantRecord {
    VariantRecord::test_record(id, "ENSP00000123456", position, amino_acids)
}

fn plain_row(position: &str) -> StructuralRecord {
    let mut row = StructuralRecord::test_record("1abc", "A", "ENSP00000123456", 1, 100);
    row.protein_position = Some(position.to_string());
    row
}

fn interface_row(position: &str, feature_id: &str) -> StructuralRecord {
    let mut row = plain_row(position);
    row.interface = Some(InterfaceAnnotation {
        structure_feature_id: feature_id.to_string(),
        interacting_chain: "B".to_string(),
        ..Default::default()
    });
    row
}

#[test]
fn range_expansion_produces_one_record_per_residue() {
    let out = expand_ranges(vec![variant("v1", "10-13", "QLR/Q")]);
    assert_eq!(out.len(), 4);
    let positions: Vec<u64> = out
        .iter()
        .filter_map(|r| r.protein_position.as_single())
        .collect();
    assert_eq!(positions, vec![10, 11, 12, 13]);
    for record in &out {
        assert_eq!(record.variant_id, "v1");
        assert_eq!(record.amino_acids, "QLR/Q");
        assert_eq!(record.gene_id, "ENSG00000000001");
    }
}

#[test]
fn placeholder_bounds_collapse_to_resolved_endpoint() {
    let out = expand_ranges(vec![variant("v1", "?-13", "QLR/Q")]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].protein_position, ProteinPosition::Single(13));

    let out = expand_ranges(vec![variant("v1", "10-?", "QLR/Q")]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].protein_position, ProteinPosition::Single(10));
}

#[test]
fn interface_join_classifies_interface() {
    let result = classify(
        vec![variant("v1", "42", "D/N")],
        &[interface_row("42", "1abc_A_B_protein")],
        false,
    );
    assert_eq!(result.interface.len(), 1);
    let record = &result.interface[0];
    assert_eq!(record.category, MappingCategory::Interface);
    let iface = record
        .structural
        .as_ref()
        .and_then(|s| s.interface.as_ref())
        .unwrap();
    assert_eq!(iface.structure_feature_id, "1abc_A_B_protein");
    assert_eq!(iface.interacting_chain, "B");
}

#[test]
fn plain_coverage_classifies_structure() {
    let result = classify(vec![variant("v1", "42", "D/N")], &[plain_row("42")], false);
    assert_eq!(result.structure.len(), 1);
    assert!(result.interface.is_empty());
}

#[test]
fn no_structural_rows_classifies_unmapped() {
    let result = classify(vec![variant("v1", "42", "D/N")], &[], false);
    assert_eq!(result.unmapped.len(), 1);
}

#[test]
fn dash_amino_acids_is_noncoding_regardless_of_structure() {
    let result = classify(
        vec![variant("v1", "42", "-")],
        &[interface_row("42", "1abc_A_B_protein")],
        false,
    );
    assert_eq!(result.noncoding.len(), 1);
    assert!(result.interface.is_empty());
}

#[test]
fn fallback_join_respects_alignment_bounds() {
    // Alignment covers [1,150]; row is annotated at residue 10
    let mut row = plain_row("10");
    row.protein_alignment_end = 150;

    // Inside the span: recovered as Structure
    let inside = classify(vec![variant("v1", "42", "D/N")], &[row.clone()], true);
    assert_eq!(inside.structure.len(), 1);

    // Outside the span: stays Unmapped even with the fallback enabled
    let outside = classify(vec![variant("v2", "200", "D/N")], &[row], true);
    assert_eq!(outside.unmapped.len(), 1);
    assert!(outside.structure.is_empty());
}

#[test]
fn classification_partitions_every_variant_exactly_once() {
    let variants = vec![
        variant("v1", "42", "D/N"),
        variant("v2", "17", "A/V"),
        variant("v3", "300", "R/Q"),
        variant("v4", "-", "-"),
        variant("v5", "42", "E/K"),
    ];
    let rows = vec![
        interface_row("42", "1abc_A_B_protein"),
        plain_row("17"),
    ];
    let result = classify(variants, &rows, false);

    let mut seen = std::collections::HashMap::new();
    for category in MappingCategory::ALL {
        for record in result.partition(category) {
            let entry = seen
                .entry(record.variant.variant_id.clone())
                .or_insert(category);
            assert_eq!(*entry, category, "variant split across categories");
        }
    }
    assert_eq!(seen.len(), 5);
}

#[test]
fn raising_pident_never_gains_mapped_rows() {
    let variants = vec![
        variant("v1", "42", "D/N"),
        variant("v2", "17", "A/V"),
        variant("v3", "300", "R/Q"),
    ];
    let mut weak = plain_row("17");
    weak.percent_identity = 35.0;
    let rows = vec![interface_row("42", "1abc_A_B_protein"), weak];

    let mut previous = usize::MAX;
    for min_pident in [0.0, 40.0, 99.9, 100.0] {
        let thresholds = QualityThresholds {
            min_pident: Some(min_pident),
            min_evalue: None,
        };
        let kept = match filter_by_quality(rows.clone(), &thresholds) {
            Ok(kept) => kept,
            Err(StructmapError::FilteredEmpty { .. }) => Vec::new(),
            Err(e) => panic!("unexpected error: {}", e),
        };
        let result = classify(variants.clone(), &kept, false);
        let mapped = result.interface.len() + result.structure.len();
        assert!(
            mapped <= previous,
            "mapped rows increased from {} to {} at pident {}",
            previous,
            mapped,
            min_pident
        );
        previous = mapped;
    }
}

#[test]
fn amino_acid_alphabet_boundary_cases() {
    assert!(is_protein_altering("D/N"));
    assert!(is_protein_altering("KR/K"));
    assert!(!is_protein_altering("-"));
    assert!(!is_protein_altering("*"));
    assert!(!is_protein_altering(""));
}
