//! Error types for ferro-structmap
//!
//! One crate-wide error enum. Variants that describe a per-protein
//! condition carry the identifiers and threshold context needed to log an
//! actionable message and move on to the next protein; everything else is
//! treated as fatal for the run.

use thiserror::Error;

/// Main error type for ferro-structmap operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructmapError {
    /// Neither variant nor structural data could be loaded for a protein.
    #[error("no variant or structural data available for protein {protein_id}")]
    NoData { protein_id: String },

    /// Variants exist but the protein has no structural coverage at all.
    #[error("no structural rows for protein {protein_id}; coding variants fall through to Unmapped")]
    StructurallyUnresolved { protein_id: String },

    /// The quality filter removed every structural row. Carries the best
    /// values present in the unfiltered input so the caller can suggest
    /// looser thresholds.
    #[error(
        "quality filtering removed all structural rows \
         (best percent identity in input: {best_pident}, best e-value: {best_evalue})"
    )]
    FilteredEmpty { best_pident: f64, best_evalue: f64 },

    /// A protein-position range could not be expanded into an ordered
    /// integer interval.
    #[error("malformed protein position range {raw:?} on variant {variant_id}")]
    MalformedRange { variant_id: String, raw: String },

    /// The join ran but category assignment produced zero output rows.
    #[error("no rows remained after category assignment for protein {protein_id}")]
    NoMatchAfterFilter { protein_id: String },

    /// A required column is missing from an input table header.
    #[error("missing required column {column:?} in {path}")]
    MissingColumn { column: String, path: String },

    /// A cell could not be parsed into the expected type.
    #[error("parse error in {path} at line {line}: {msg}")]
    Parse {
        path: String,
        line: usize,
        msg: String,
    },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },
}

impl StructmapError {
    /// Create an IO error from a message.
    pub fn io(msg: impl Into<String>) -> Self {
        StructmapError::Io { msg: msg.into() }
    }

    /// Create a parse error with file and line context.
    pub fn parse(path: impl Into<String>, line: usize, msg: impl Into<String>) -> Self {
        StructmapError::Parse {
            path: path.into(),
            line,
            msg: msg.into(),
        }
    }

    /// Whether the error is recoverable at the per-protein boundary.
    ///
    /// Recoverable errors are logged and the batch moves on to the next
    /// protein; unrecoverable errors (IO, malformed input tables) terminate
    /// the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StructmapError::NoData { .. }
                | StructmapError::StructurallyUnresolved { .. }
                | StructmapError::FilteredEmpty { .. }
                | StructmapError::MalformedRange { .. }
                | StructmapError::NoMatchAfterFilter { .. }
        )
    }
}

impl From<std::io::Error> for StructmapError {
    fn from(e: std::io::Error) -> Self {
        StructmapError::Io { msg: e.to_string() }
    }
}

impl From<csv::Error> for StructmapError {
    fn from(e: csv::Error) -> Self {
        StructmapError::Io { msg: e.to_string() }
    }
}
