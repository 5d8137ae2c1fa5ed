//! Annotated variant table parsing.
//!
//! Reads the tab- or whitespace-delimited table emitted by the upstream
//! annotation tool (one file per transcript/gene). Columns are located by
//! header name, never by position; `##`-prefixed metadata lines are skipped
//! and the header line's leading `#` is tolerated.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::StructmapError;
use crate::tabfile;
use crate::Result;

use super::{ProteinPosition, VariantRecord};

const REQUIRED_COLUMNS: [&str; 6] = [
    "Uploaded_variation",
    "Gene",
    "Feature",
    "Consequence",
    "Protein_position",
    "Amino_acids",
];

/// Read an annotated variant table into records.
///
/// The protein accession is taken from an `ENSP` column when one is
/// present; otherwise it is left empty for the caller to fill in (the
/// id-translation table is an external collaborator).
pub fn read_variant_table(path: &Path) -> Result<Vec<VariantRecord>> {
    let contents = tabfile::read_text_file(path)?;
    parse_variant_table(&contents, &path.display().to_string())
}

/// Read a variant table and stamp every record with the given protein
/// accession where the table itself does not carry one.
pub fn read_variant_table_for_protein(path: &Path, protein_id: &str) -> Result<Vec<VariantRecord>> {
    let mut records = read_variant_table(path)?;
    for record in &mut records {
        if record.protein_id.is_empty() {
            record.protein_id = protein_id.to_string();
        }
    }
    Ok(records)
}

/// Parse variant table contents. Exposed for tests; `path` is only used in
/// error messages.
pub fn parse_variant_table(contents: &str, path: &str) -> Result<Vec<VariantRecord>> {
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, tabfile::strip_bom(l)))
        .filter(|(_, l)| !l.trim().is_empty());

    // Skip "##" metadata; the header itself may start with a single '#'.
    let (header_line_no, header) = lines
        .by_ref()
        .find(|(_, l)| !l.starts_with("##"))
        .ok_or_else(|| StructmapError::parse(path, 0, "empty variant table"))?;
    let header = header.trim_start_matches('#');

    let delimiter = tabfile::sniff_delimiter(header);
    let columns = index_columns(header, delimiter, path)?;

    let mut records = Vec::new();
    for (line_no, line) in lines {
        if line.starts_with('#') {
            continue;
        }
        let cells = tabfile::split_cells(line, delimiter);
        records.push(parse_row(&cells, &columns, path, line_no)?);
    }

    debug!(
        path = %path,
        records = records.len(),
        header_line = header_line_no,
        "parsed variant table"
    );
    Ok(records)
}

struct ColumnIndex {
    map: HashMap<String, usize>,
}

impl ColumnIndex {
    fn required<'a>(&self, cells: &'a [String], name: &str) -> &'a str {
        // Presence was validated against the header; a short row reads as
        // an empty cell.
        self.map
            .get(name)
            .and_then(|&i| cells.get(i))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    fn optional(&self, cells: &[String], name: &str) -> Option<String> {
        self.map
            .get(name)
            .and_then(|&i| cells.get(i))
            .and_then(|c| tabfile::optional_cell(c))
    }
}

fn index_columns(header: &str, delimiter: Option<u8>, path: &str) -> Result<ColumnIndex> {
    let names = tabfile::split_cells(header, delimiter);
    let map: HashMap<String, usize> = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.clone(), i))
        .collect();

    for required in REQUIRED_COLUMNS {
        if !map.contains_key(required) {
            return Err(StructmapError::MissingColumn {
                column: required.to_string(),
                path: path.to_string(),
            });
        }
    }
    Ok(ColumnIndex { map })
}

fn parse_row(
    cells: &[String],
    columns: &ColumnIndex,
    path: &str,
    line_no: usize,
) -> Result<VariantRecord> {
    let variant_id = columns.required(cells, "Uploaded_variation");
    if variant_id.is_empty() {
        return Err(StructmapError::parse(
            path,
            line_no,
            "empty Uploaded_variation cell",
        ));
    }

    let consequence = columns
        .required(cells, "Consequence")
        .split('|')
        .flat_map(|part| part.split(','))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    Ok(VariantRecord {
        variant_id: variant_id.to_string(),
        gene_id: columns.required(cells, "Gene").to_string(),
        transcript_id: columns.required(cells, "Feature").to_string(),
        protein_id: columns.optional(cells, "ENSP").unwrap_or_default(),
        protein_position: ProteinPosition::parse(columns.required(cells, "Protein_position")),
        amino_acids: columns.required(cells, "Amino_acids").to_string(),
        consequence,
        existing_variation: columns.optional(cells, "Existing_variation"),
        isoform_tag: columns.optional(cells, "APPRIS"),
    })
}
