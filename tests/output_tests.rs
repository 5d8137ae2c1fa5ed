//! Output writer semantics tests

use std::fs;

use ferro_structmap::classify::{ClassifiedVariant, MappingCategory};
use ferro_structmap::structure::{InterfaceAnnotation, StructuralRecord};
use ferro_structmap::variant::VariantRecord;
use ferro_structmap::{OutputDescriptor, OutputWriter};

fn interface_record(variant_id: &str, feature_id: &str) -> ClassifiedVariant {
    let mut row = StructuralRecord::test_record("1abc", "A", "ENSP1", 1, 100);
    row.protein_position = Some("42".to_string());
    row.interface = Some(InterfaceAnnotation {
        structure_feature_id: feature_id.to_string(),
        interacting_chain: "B".to_string(),
        ..Default::default()
    });
    ClassifiedVariant {
        variant: VariantRecord::test_record(variant_id, "ENSP1", "42", "D/N"),
        category: MappingCategory::Interface,
        structural: Some(row),
        alignment: None,
    }
}

fn descriptor() -> OutputDescriptor {
    OutputDescriptor::new(Some(50.0), None, None)
}

#[test]
fn writing_twice_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = OutputWriter::new(tmp.path(), descriptor()).unwrap();
    let records = vec![interface_record("v1", "f1"), interface_record("v2", "f1")];

    let first = writer
        .write_category(MappingCategory::Interface, &records)
        .unwrap();
    let second = writer
        .write_category(MappingCategory::Interface, &records)
        .unwrap();
    assert_eq!(first, 2);
    assert_eq!(second, 0);

    let contents = fs::read_to_string(writer.category_path(MappingCategory::Interface)).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    // Header exactly once, each distinct row exactly once
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Variant_id,"));
    assert_ne!(lines[1], lines[2]);
}

#[test]
fn empty_record_set_is_a_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = OutputWriter::new(tmp.path(), descriptor()).unwrap();
    let written = writer
        .write_category(MappingCategory::Unmapped, &[])
        .unwrap();
    assert_eq!(written, 0);
    assert!(!writer.category_path(MappingCategory::Unmapped).exists());
}

#[test]
fn duplicate_rows_within_one_call_collapse() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = OutputWriter::new(tmp.path(), descriptor()).unwrap();
    let record = interface_record("v1", "f1");
    let written = writer
        .write_category(MappingCategory::Interface, &[record.clone(), record])
        .unwrap();
    assert_eq!(written, 1);
}

#[test]
fn membership_pairs_never_duplicate() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = OutputWriter::new(tmp.path(), descriptor()).unwrap();

    // Same variant matched on two chains of the same interface feature:
    // one membership pair
    let records = vec![interface_record("v1", "f1"), interface_record("v1", "f1")];
    writer.write_membership(&records).unwrap();
    writer.write_membership(&records).unwrap();

    let contents = fs::read_to_string(writer.membership_path()).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec!["Structure_feature_id,Variant_id", "f1,v1"]);
}

#[test]
fn membership_dedup_survives_a_new_writer_instance() {
    let tmp = tempfile::tempdir().unwrap();
    let records = vec![interface_record("v1", "f1")];

    {
        let writer = OutputWriter::new(tmp.path(), descriptor()).unwrap();
        writer.write_membership(&records).unwrap();
    }
    // A later invocation appending to the same directory seeds its dedup
    // state from the existing file
    let writer = OutputWriter::new(tmp.path(), descriptor()).unwrap();
    let written = writer.write_membership(&records).unwrap();
    assert_eq!(written, 0);

    let contents = fs::read_to_string(writer.membership_path()).unwrap();
    assert_eq!(contents.lines().count(), 2);
}

#[test]
fn different_variants_share_one_feature_set() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = OutputWriter::new(tmp.path(), descriptor()).unwrap();
    let records = vec![
        interface_record("v1", "f1"),
        interface_record("v2", "f1"),
        interface_record("v3", "f2"),
    ];
    let written = writer.write_membership(&records).unwrap();
    assert_eq!(written, 3);

    let contents = fs::read_to_string(writer.membership_path()).unwrap();
    assert!(contents.contains("f1,v1"));
    assert!(contents.contains("f1,v2"));
    assert!(contents.contains("f2,v3"));
}

#[test]
fn category_rows_land_in_parameter_stamped_files() {
    let tmp = tempfile::tempdir().unwrap();
    let writer = OutputWriter::new(tmp.path(), descriptor()).unwrap();
    writer
        .write_category(MappingCategory::Interface, &[interface_record("v1", "f1")])
        .unwrap();

    let expected = tmp
        .path()
        .join("Interface_pident50_isoform_all_consequence_all.csv");
    assert!(expected.exists());
}
