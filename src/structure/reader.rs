//! Structural/interface table parsing.
//!
//! Reads the CSV or TSV table produced by the upstream structural pipeline.
//! Rows may pack several residue positions into one `-`-joined cell; those
//! are exploded into one record per position here, so the join only ever
//! sees single-value cells.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::StructmapError;
use crate::tabfile;
use crate::Result;

use super::{InteractionType, InterfaceAnnotation, StructuralRecord};

const REQUIRED_COLUMNS: [&str; 9] = [
    "Pdb_code",
    "Pdb_chain",
    "Protein_accession",
    "Protein_alignment_start",
    "Protein_alignment_end",
    "Pdb_alignment_start",
    "Pdb_alignment_end",
    "Pident",
    "Evalue",
];

/// Read a structural table into records, exploding multi-value position
/// cells.
pub fn read_structural_table(path: &Path) -> Result<Vec<StructuralRecord>> {
    let contents = tabfile::read_text_file(path)?;
    parse_structural_table(&contents, &path.display().to_string())
}

/// Parse structural table contents. Exposed for tests; `path` is only used
/// in error messages.
pub fn parse_structural_table(contents: &str, path: &str) -> Result<Vec<StructuralRecord>> {
    let contents = tabfile::strip_bom(contents);
    let header = contents.lines().next().unwrap_or("");
    let delimiter = tabfile::sniff_delimiter(header).unwrap_or(b',');

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), i))
        .collect();

    for required in REQUIRED_COLUMNS {
        if !columns.contains_key(required) {
            return Err(StructmapError::MissingColumn {
                column: required.to_string(),
                path: path.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for (row_no, row) in reader.records().enumerate() {
        let row = row?;
        let line_no = row_no + 2; // header is line 1
        let record = parse_row(&row, &columns, path, line_no)?;
        explode_positions(record, &mut records);
    }

    debug!(path = %path, records = records.len(), "parsed structural table");
    Ok(records)
}

fn cell<'a>(row: &'a csv::StringRecord, columns: &HashMap<String, usize>, name: &str) -> &'a str {
    columns
        .get(name)
        .and_then(|&i| row.get(i))
        .unwrap_or("")
        .trim()
}

fn optional(
    row: &csv::StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
) -> Option<String> {
    tabfile::optional_cell(cell(row, columns, name))
}

fn parse_u64(
    row: &csv::StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
    path: &str,
    line_no: usize,
) -> Result<u64> {
    let raw = cell(row, columns, name);
    raw.parse::<u64>().map_err(|_| {
        StructmapError::parse(path, line_no, format!("{} is not an integer: {:?}", name, raw))
    })
}

fn parse_f64(
    row: &csv::StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
    path: &str,
    line_no: usize,
) -> Result<f64> {
    let raw = cell(row, columns, name);
    raw.parse::<f64>().map_err(|_| {
        StructmapError::parse(path, line_no, format!("{} is not numeric: {:?}", name, raw))
    })
}

fn parse_row(
    row: &csv::StringRecord,
    columns: &HashMap<String, usize>,
    path: &str,
    line_no: usize,
) -> Result<StructuralRecord> {
    // A row is an interface record exactly when its Interaction_type cell
    // carries a vocabulary value.
    let interface = optional(row, columns, "Interaction_type")
        .and_then(|raw| InteractionType::parse(&raw))
        .map(|interaction_type| InterfaceAnnotation {
            structure_feature_id: optional(row, columns, "Structure_feature_id")
                .unwrap_or_default(),
            interacting_chain: optional(row, columns, "Interacting_chain").unwrap_or_default(),
            interaction_type,
            min_distance: optional(row, columns, "Min_distance")
                .and_then(|raw| raw.parse::<f64>().ok()),
        });

    Ok(StructuralRecord {
        pdb_code: cell(row, columns, "Pdb_code").to_string(),
        pdb_chain: cell(row, columns, "Pdb_chain").to_string(),
        protein_accession: cell(row, columns, "Protein_accession").to_string(),
        protein_alignment_start: parse_u64(row, columns, "Protein_alignment_start", path, line_no)?,
        protein_alignment_end: parse_u64(row, columns, "Protein_alignment_end", path, line_no)?,
        pdb_alignment_start: parse_u64(row, columns, "Pdb_alignment_start", path, line_no)?,
        pdb_alignment_end: parse_u64(row, columns, "Pdb_alignment_end", path, line_no)?,
        percent_identity: parse_f64(row, columns, "Pident", path, line_no)?,
        e_value: parse_f64(row, columns, "Evalue", path, line_no)?,
        protein_position: optional(row, columns, "Protein_position"),
        interface,
    })
}

/// Explode a `-`-joined multi-value position cell into one record per
/// value. Single-value and empty cells pass through unchanged.
fn explode_positions(record: StructuralRecord, out: &mut Vec<StructuralRecord>) {
    match &record.protein_position {
        Some(raw) if raw.contains('-') => {
            let tokens: Vec<String> = raw
                .split('-')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            for token in tokens {
                let mut copy = record.clone();
                copy.protein_position = Some(token);
                out.push(copy);
            }
        }
        _ => out.push(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Pdb_code,Pdb_chain,Protein_accession,Protein_alignment_start,Protein_alignment_end,Pdb_alignment_start,Pdb_alignment_end,Pident,Evalue,Protein_position,Structure_feature_id,Interacting_chain,Interaction_type,Min_distance
1abc,A,ENSP1,1,100,5,104,98.5,1e-40,42,1abc_A_B_protein,B,protein,3.4
1abc,A,ENSP1,1,100,5,104,98.5,1e-40,17,,,-,
2xyz,C,ENSP1,30,80,1,51,45.0,0.002,50-55-61,2xyz_C_lig,L,ligand,4.1
";

    #[test]
    fn interface_rows_carry_annotations() {
        let records = parse_structural_table(TABLE, "ifaces.csv").unwrap();
        let first = &records[0];
        assert!(first.is_interface());
        let iface = first.interface.as_ref().unwrap();
        assert_eq!(iface.structure_feature_id, "1abc_A_B_protein");
        assert_eq!(iface.interacting_chain, "B");
        assert_eq!(iface.interaction_type, InteractionType::Protein);
        assert_eq!(iface.min_distance, Some(3.4));
    }

    #[test]
    fn dash_interaction_type_means_plain_alignment() {
        let records = parse_structural_table(TABLE, "ifaces.csv").unwrap();
        assert!(!records[1].is_interface());
        assert_eq!(records[1].protein_position.as_deref(), Some("17"));
    }

    #[test]
    fn multi_value_position_cells_are_exploded() {
        let records = parse_structural_table(TABLE, "ifaces.csv").unwrap();
        // 1 + 1 + 3 exploded rows
        assert_eq!(records.len(), 5);
        let ligand_positions: Vec<&str> = records
            .iter()
            .filter(|r| r.pdb_code == "2xyz")
            .filter_map(|r| r.protein_position.as_deref())
            .collect();
        assert_eq!(ligand_positions, vec!["50", "55", "61"]);
        // Exploded rows keep every other field
        for r in records.iter().filter(|r| r.pdb_code == "2xyz") {
            assert_eq!(r.percent_identity, 45.0);
            assert!(r.is_interface());
        }
    }

    #[test]
    fn tsv_input_is_accepted() {
        let tsv = TABLE.replace(',', "\t");
        let records = parse_structural_table(&tsv, "ifaces.tsv").unwrap();
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let table = "Pdb_code,Pdb_chain,Protein_accession\n1abc,A,ENSP1\n";
        let err = parse_structural_table(table, "bad.csv").unwrap_err();
        assert!(matches!(err, StructmapError::MissingColumn { column, .. } if column == "Protein_alignment_start"));
    }
}
