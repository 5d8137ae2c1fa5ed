//! Classified-record output.
//!
//! Appends classified rows to per-category files plus the shared two-column
//! set-membership file. File names derive deterministically from the run's
//! filter parameters, so repeated invocations with identical parameters
//! append to the same logical files. Semantics per file: header exactly
//! once, rows deduplicated against everything already written (including
//! content left by a previous run), appends serialized behind a lock.

use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{Classification, ClassifiedVariant, MappingCategory};
use crate::error::StructmapError;
use crate::Result;

/// Output serialization format. Classification does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Comma-delimited text.
    #[default]
    Csv,
}

impl OutputFormat {
    /// File extension for category files.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
        }
    }
}

/// Column header shared by all category files.
const CATEGORY_HEADER: [&str; 21] = [
    "Variant_id",
    "Gene",
    "Feature",
    "Protein_id",
    "Protein_position",
    "Amino_acids",
    "Consequence",
    "Existing_variation",
    "Isoform",
    "Mapping_category",
    "Pdb_code",
    "Pdb_chain",
    "Protein_accession",
    "Protein_alignment_start",
    "Protein_alignment_end",
    "Pident",
    "Evalue",
    "Structure_feature_id",
    "Interacting_chain",
    "Interaction_type",
    "Min_distance",
];

/// Column header of the membership file.
const MEMBERSHIP_HEADER: [&str; 2] = ["Structure_feature_id", "Variant_id"];

/// Deterministic output file naming derived from filter parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDescriptor {
    pident_label: String,
    isoform_label: String,
    consequence_label: String,
    format: OutputFormat,
}

impl OutputDescriptor {
    /// Build a descriptor from the run's filter parameters.
    pub fn new(
        min_pident: Option<f64>,
        isoform: Option<&str>,
        consequence: Option<&[String]>,
    ) -> Self {
        OutputDescriptor {
            pident_label: min_pident.map_or_else(|| "0".to_string(), format_number),
            isoform_label: isoform.unwrap_or("all").to_string(),
            consequence_label: consequence
                .filter(|tags| !tags.is_empty())
                .map_or_else(|| "all".to_string(), |tags| tags.join("-")),
            format: OutputFormat::default(),
        }
    }

    fn suffix(&self) -> String {
        format!(
            "pident{}_isoform_{}_consequence_{}",
            self.pident_label, self.isoform_label, self.consequence_label
        )
    }

    /// File name of one category partition.
    pub fn category_file_name(&self, category: MappingCategory) -> String {
        format!(
            "{}_{}.{}",
            category.as_str(),
            self.suffix(),
            self.format.extension()
        )
    }

    /// File name of the shared set-membership table.
    pub fn membership_file_name(&self) -> String {
        format!("setID_{}.txt", self.suffix())
    }
}

/// Format a float without a trailing `.0` for whole numbers.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Append-only writer over one output directory.
///
/// The writer is the only persistent state in the pipeline and is shared
/// across proteins (and worker threads): all appends serialize through an
/// internal lock that also tracks rows already written per file, seeded
/// from pre-existing file content on first touch.
pub struct OutputWriter {
    dir: PathBuf,
    descriptor: OutputDescriptor,
    seen: Mutex<HashMap<PathBuf, HashSet<String>>>,
}

impl OutputWriter {
    /// Create a writer rooted at `dir`, creating the directory if needed.
    ///
    /// Failure here is run-fatal: nothing can be classified if the output
    /// directory cannot be written.
    pub fn new(dir: impl AsRef<Path>, descriptor: OutputDescriptor) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| StructmapError::Io {
            msg: format!("cannot create output directory {}: {}", dir.display(), e),
        })?;
        Ok(OutputWriter {
            dir,
            descriptor,
            seen: Mutex::new(HashMap::new()),
        })
    }

    /// The descriptor this writer derives file names from.
    pub fn descriptor(&self) -> &OutputDescriptor {
        &self.descriptor
    }

    /// Path of one category file.
    pub fn category_path(&self, category: MappingCategory) -> PathBuf {
        self.dir.join(self.descriptor.category_file_name(category))
    }

    /// Path of the membership file.
    pub fn membership_path(&self) -> PathBuf {
        self.dir.join(self.descriptor.membership_file_name())
    }

    /// Append classified records to their category file.
    ///
    /// No-op when `records` is empty. Returns the number of rows actually
    /// written after deduplication.
    pub fn write_category(
        &self,
        category: MappingCategory,
        records: &[ClassifiedVariant],
    ) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let rows: Vec<String> = records
            .iter()
            .map(|r| csv_line(&category_row(r)))
            .collect::<Result<_>>()?;
        self.append_rows(
            &self.category_path(category),
            &csv_line(&header_cells(&CATEGORY_HEADER))?,
            rows,
        )
    }

    /// Append `(structure_feature_id, variant_id)` pairs for interface
    /// records to the shared membership file.
    ///
    /// Pairs are deduplicated independently of the category rows; the file
    /// never contains a duplicate pair, across invocations and runs.
    pub fn write_membership(&self, interface_records: &[ClassifiedVariant]) -> Result<usize> {
        let mut rows = Vec::new();
        for record in interface_records {
            let feature_id = record
                .structural
                .as_ref()
                .and_then(|s| s.interface.as_ref())
                .map(|i| i.structure_feature_id.as_str())
                .unwrap_or("");
            if feature_id.is_empty() {
                debug!(
                    variant = %record.variant.variant_id,
                    "interface record without a structure feature id, skipped in membership file"
                );
                continue;
            }
            rows.push(csv_line(&[
                feature_id.to_string(),
                record.variant.variant_id.clone(),
            ])?);
        }
        if rows.is_empty() {
            return Ok(0);
        }
        self.append_rows(
            &self.membership_path(),
            &csv_line(&header_cells(&MEMBERSHIP_HEADER))?,
            rows,
        )
    }

    /// Write all four partitions plus the membership table.
    pub fn write_classification(&self, classification: &Classification) -> Result<usize> {
        let mut written = 0;
        for category in MappingCategory::ALL {
            written += self.write_category(category, classification.partition(category))?;
        }
        written += self.write_membership(&classification.interface)?;
        Ok(written)
    }

    /// Serialized append with header-once and dedup-against-file semantics.
    fn append_rows(&self, path: &Path, header: &str, rows: Vec<String>) -> Result<usize> {
        let mut seen = self
            .seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        // First touch of a file seeds the dedup set from whatever a
        // previous invocation already wrote.
        let file_seen = match seen.entry(path.to_path_buf()) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => e.insert(load_existing_rows(path)?),
        };

        let fresh: Vec<&String> = rows.iter().filter(|r| !file_seen.contains(*r)).collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StructmapError::Io {
                msg: format!("cannot open {} for append: {}", path.display(), e),
            })?;

        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", header)?;
        }
        let mut written = 0;
        // Dedup also within the batch itself
        for row in fresh {
            if file_seen.insert(row.clone()) {
                writeln!(file, "{}", row)?;
                written += 1;
            }
        }
        file.flush()?;
        Ok(written)
    }
}

fn load_existing_rows(path: &Path) -> Result<HashSet<String>> {
    let mut rows = HashSet::new();
    if !path.exists() {
        return Ok(rows);
    }
    let reader = BufReader::new(std::fs::File::open(path)?);
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        // Line 0 is the header
        if i > 0 && !line.trim().is_empty() {
            rows.insert(line);
        }
    }
    Ok(rows)
}

fn header_cells(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Serialize one row to a CSV line (no trailing newline).
fn csv_line(cells: &[String]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(cells)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| StructmapError::io(e.to_string()))?;
    let line = String::from_utf8(bytes).map_err(|e| StructmapError::io(e.to_string()))?;
    Ok(line.trim_end().to_string())
}

const EMPTY_CELL: &str = "-";

fn category_row(record: &ClassifiedVariant) -> Vec<String> {
    let v = &record.variant;
    let mut cells = vec![
        v.variant_id.clone(),
        v.gene_id.clone(),
        v.transcript_id.clone(),
        v.protein_id.clone(),
        v.protein_position.to_string(),
        v.amino_acids.clone(),
        v.consequence.join("|"),
        v.existing_variation.clone().unwrap_or_else(|| EMPTY_CELL.to_string()),
        v.isoform_tag.clone().unwrap_or_else(|| EMPTY_CELL.to_string()),
        record.category.as_str().to_string(),
    ];

    match (&record.structural, &record.alignment) {
        (Some(s), _) => {
            cells.extend([
                s.pdb_code.clone(),
                s.pdb_chain.clone(),
                s.protein_accession.clone(),
                s.protein_alignment_start.to_string(),
                s.protein_alignment_end.to_string(),
                s.percent_identity.to_string(),
                s.e_value.to_string(),
            ]);
            match &s.interface {
                Some(i) => cells.extend([
                    i.structure_feature_id.clone(),
                    i.interacting_chain.clone(),
                    i.interaction_type.to_string(),
                    i.min_distance
                        .map_or_else(|| EMPTY_CELL.to_string(), |d| d.to_string()),
                ]),
                None => cells.extend(std::iter::repeat_with(|| EMPTY_CELL.to_string()).take(4)),
            }
        }
        (None, Some(span)) => {
            // Fallback-recovered rows carry the covering span only
            cells.extend([
                EMPTY_CELL.to_string(),
                EMPTY_CELL.to_string(),
                span.protein_accession.clone(),
                span.start.to_string(),
                span.end.to_string(),
            ]);
            cells.extend(std::iter::repeat_with(|| EMPTY_CELL.to_string()).take(6));
        }
        (None, None) => cells.extend(std::iter::repeat_with(|| EMPTY_CELL.to_string()).take(11)),
    }

    cells
}
