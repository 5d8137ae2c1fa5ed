// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-structmap: variant-to-structure position classifier
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Maps annotated genomic variants onto 3D protein structure residues and
//! interaction interfaces, partitioning each protein's variants into four
//! mutually exclusive categories: `Interface`, `Structure`, `Unmapped` and
//! `Noncoding`. The `Interface` partition additionally feeds a two-column
//! set-membership table consumed by downstream rare-variant tests.
//!
//! # Example
//!
//! ```
//! use ferro_structmap::classify::{classify, MappingCategory};
//! use ferro_structmap::structure::StructuralRecord;
//! use ferro_structmap::variant::VariantRecord;
//!
//! // One missense variant at residue 42
//! let variant = VariantRecord::test_record("1_12345_A/G", "ENSP00000123456", "42", "D/N");
//!
//! // One interface residue at the same position
//! let mut row = StructuralRecord::test_record("1abc", "A", "ENSP00000123456", 1, 100);
//! row.protein_position = Some("42".to_string());
//! row.interface = Some(Default::default());
//!
//! let result = classify(vec![variant], &[row], false);
//! assert_eq!(result.interface.len(), 1);
//! assert_eq!(result.interface[0].category, MappingCategory::Interface);
//! ```

pub mod batch;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod join;
pub mod output;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod structure;
pub mod tabfile;
pub mod variant;

// Re-export commonly used types
pub use classify::{ClassifiedVariant, MappingCategory};
pub use config::MapperConfig;
pub use engine::{classify_protein, ProteinStats};
pub use error::StructmapError;
pub use output::{OutputDescriptor, OutputFormat, OutputWriter};
pub use structure::{InteractionType, StructuralRecord};
pub use variant::{ProteinPosition, VariantRecord};

/// Result type alias for ferro-structmap operations
pub type Result<T> = std::result::Result<T, StructmapError>;
