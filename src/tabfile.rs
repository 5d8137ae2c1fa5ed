//! Shared helpers for reading delimited text tables.
//!
//! Both input readers go through this module: it handles gzip transparency,
//! UTF-8 BOM stripping and delimiter sniffing so the table readers can work
//! on plain strings.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::StructmapError;
use crate::Result;

/// UTF-8 BOM (Byte Order Mark) constant
const UTF8_BOM: &str = "\u{feff}";

/// Strip UTF-8 BOM from the beginning of a string if present.
///
/// Common when tables are exported from Windows applications or Excel.
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix(UTF8_BOM).unwrap_or(s)
}

/// Open a text file as a buffered reader, decompressing `.gz` inputs.
pub fn open_text_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| StructmapError::Io {
        msg: format!("failed to open {}: {}", path.display(), e),
    })?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read an entire (possibly gzipped) text file into a string.
pub fn read_text_file(path: &Path) -> Result<String> {
    let mut reader = open_text_reader(path)?;
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|e| StructmapError::Io {
            msg: format!("failed to read {}: {}", path.display(), e),
        })?;
    Ok(contents)
}

/// Guess the cell delimiter of a header line.
///
/// Tabs win over commas when both appear; a line with neither is treated as
/// whitespace-delimited (signalled by `None`).
pub fn sniff_delimiter(header: &str) -> Option<u8> {
    if header.contains('\t') {
        Some(b'\t')
    } else if header.contains(',') {
        Some(b',')
    } else {
        None
    }
}

/// Split one line into cells using the sniffed delimiter, falling back to
/// arbitrary whitespace runs.
pub fn split_cells(line: &str, delimiter: Option<u8>) -> Vec<String> {
    match delimiter {
        Some(d) => line
            .split(d as char)
            .map(|c| c.trim().to_string())
            .collect(),
        None => line.split_whitespace().map(|c| c.to_string()).collect(),
    }
}

/// An empty or placeholder cell ("-" or ".") reads as `None`.
pub fn optional_cell(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "." {
        None
    } else {
        Some(trimmed.to_string())
    }
}
