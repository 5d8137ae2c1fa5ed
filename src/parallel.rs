//! Parallel classification support for ferro-structmap
//!
//! Parallel variants of the batch entry points using rayon. Enable with
//! the `parallel` feature. Proteins are embarrassingly parallel: each
//! worker reads only its own input slice, and the shared [`OutputWriter`]
//! serializes appends internally, so the header-once and dedup invariants
//! hold under concurrency.

use rayon::prelude::*;
use tracing::warn;

use crate::batch::{BatchStats, ProteinInput};
use crate::config::MapperConfig;
use crate::engine::{classify_protein, ProteinStats};
use crate::error::StructmapError;
use crate::output::OutputWriter;
use crate::Result;

/// Classify proteins in parallel.
///
/// Returns one result per input, in input order. Recoverable per-protein
/// errors are returned in place rather than aborting the pool.
pub fn classify_proteins_parallel(
    inputs: Vec<ProteinInput>,
    config: &MapperConfig,
    writer: &OutputWriter,
) -> Vec<Result<ProteinStats>> {
    inputs
        .into_par_iter()
        .map(|input| {
            classify_protein(
                &input.protein_id,
                input.variants,
                input.structures,
                config,
                writer,
            )
        })
        .collect()
}

/// Classify proteins in parallel and aggregate into batch statistics.
///
/// Recoverable errors are logged and counted; the first run-fatal error is
/// returned after the pool drains.
pub fn classify_batch_parallel(
    inputs: Vec<ProteinInput>,
    config: &MapperConfig,
    writer: &OutputWriter,
) -> Result<BatchStats> {
    let started = std::time::Instant::now();
    let protein_ids: Vec<String> = inputs.iter().map(|i| i.protein_id.clone()).collect();
    let results = classify_proteins_parallel(inputs, config, writer);

    let mut stats = BatchStats {
        total: results.len(),
        processed: results.len(),
        ..BatchStats::default()
    };
    let mut fatal: Option<StructmapError> = None;

    for (protein_id, result) in protein_ids.iter().zip(results) {
        match result {
            Ok(protein_stats) => stats.record_success(&protein_stats),
            Err(e) if e.is_recoverable() => {
                warn!(protein = %protein_id, "skipping protein: {}", e);
                stats.record_error(protein_id, &e);
            }
            Err(e) => fatal = fatal.or(Some(e)),
        }
    }

    if let Some(e) = fatal {
        return Err(e);
    }
    stats.elapsed_secs = started.elapsed().as_secs_f64();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::StructuralRecord;
    use crate::variant::VariantRecord;

    fn input(protein_id: &str) -> ProteinInput {
        let mut row = StructuralRecord::test_record("1abc", "A", protein_id, 1, 100);
        row.protein_position = Some("42".to_string());
        ProteinInput::new(
            protein_id,
            vec![VariantRecord::test_record("v1", protein_id, "42", "D/N")],
            vec![row],
        )
    }

    #[test]
    fn results_preserve_input_order() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MapperConfig::new();
        let writer = OutputWriter::new(tmp.path(), config.descriptor()).unwrap();
        let inputs: Vec<ProteinInput> = (0..32).map(|i| input(&format!("ENSP{}", i))).collect();
        let results = classify_proteins_parallel(inputs, &config, &writer);
        assert_eq!(results.len(), 32);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.as_ref().unwrap().protein_id, format!("ENSP{}", i));
        }
    }

    #[test]
    fn concurrent_appends_keep_header_once() {
        let tmp = tempfile::tempdir().unwrap();
        let config = MapperConfig::new();
        let writer = OutputWriter::new(tmp.path(), config.descriptor()).unwrap();
        let inputs: Vec<ProteinInput> = (0..64).map(|i| input(&format!("ENSP{}", i))).collect();
        let stats = classify_batch_parallel(inputs, &config, &writer).unwrap();
        assert_eq!(stats.succeeded, 64);

        let path = writer.category_path(crate::MappingCategory::Structure);
        let contents = std::fs::read_to_string(path).unwrap();
        let headers = contents
            .lines()
            .filter(|l| l.starts_with("Variant_id"))
            .count();
        assert_eq!(headers, 1);
        // One data row per protein, no interleaved partial rows
        assert_eq!(contents.lines().count(), 65);
    }
}
