//! Batch classification across proteins.
//!
//! Proteins are independent: one protein's failure never aborts the batch
//! unless the caller opts out of `continue_on_error` or the error is
//! run-fatal (output IO). Statistics aggregate per-category counts and keep
//! a capped list of per-protein error messages.

use std::time::Instant;

use tracing::warn;

use crate::config::MapperConfig;
use crate::engine::{classify_protein, ProteinStats};
use crate::error::StructmapError;
use crate::output::OutputWriter;
use crate::structure::StructuralRecord;
use crate::variant::VariantRecord;
use crate::Result;

/// Maximum number of error messages to store to prevent memory issues
const MAX_STORED_ERRORS: usize = 100;

/// One protein's input slice: its variants and its structural rows.
#[derive(Debug, Clone, Default)]
pub struct ProteinInput {
    /// Protein accession.
    pub protein_id: String,
    /// Annotated variants for this protein.
    pub variants: Vec<VariantRecord>,
    /// Structural/interface rows for this protein.
    pub structures: Vec<StructuralRecord>,
}

impl ProteinInput {
    /// Bundle one protein's inputs.
    pub fn new(
        protein_id: impl Into<String>,
        variants: Vec<VariantRecord>,
        structures: Vec<StructuralRecord>,
    ) -> Self {
        ProteinInput {
            protein_id: protein_id.into(),
            variants,
            structures,
        }
    }
}

/// Progress callback type (proteins processed, total)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Configuration for batch processing.
pub struct BatchConfig {
    /// Whether to continue processing when one protein fails recoverably.
    pub continue_on_error: bool,
    /// Call the progress callback every N proteins.
    pub progress_interval: usize,
    /// Progress callback (called with processed count and total).
    pub progress: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            continue_on_error: true,
            progress_interval: 100,
            progress: None,
        }
    }
}

impl BatchConfig {
    /// Create a new batch configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure whether to continue on recoverable errors.
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Set the progress callback interval.
    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Set the progress callback.
    pub fn progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }
}

/// Statistics from a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// Proteins submitted.
    pub total: usize,
    /// Proteins attempted (equals `total` unless the batch aborted).
    pub processed: usize,
    /// Proteins classified successfully.
    pub succeeded: usize,
    /// Proteins skipped on a recoverable error.
    pub failed: usize,
    /// Total rows classified `Interface`.
    pub interface: usize,
    /// Total rows classified `Structure`.
    pub structure: usize,
    /// Total rows classified `Unmapped`.
    pub unmapped: usize,
    /// Total rows classified `Noncoding`.
    pub noncoding: usize,
    /// Error messages from skipped proteins, capped at
    /// `MAX_STORED_ERRORS` entries.
    pub errors: Vec<String>,
    /// Wall-clock seconds spent in the batch.
    pub elapsed_secs: f64,
}

impl BatchStats {
    /// Fraction of attempted proteins that succeeded.
    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.processed as f64
        }
    }

    /// Fold one protein's counts into the totals.
    pub fn record_success(&mut self, stats: &ProteinStats) {
        self.succeeded += 1;
        self.interface += stats.interface;
        self.structure += stats.structure;
        self.unmapped += stats.unmapped;
        self.noncoding += stats.noncoding;
    }

    /// Record a skipped protein, storing up to `MAX_STORED_ERRORS`
    /// messages.
    pub fn record_error(&mut self, protein_id: &str, error: &StructmapError) {
        self.failed += 1;
        if self.errors.len() < MAX_STORED_ERRORS {
            self.errors.push(format!("{}: {}", protein_id, error));
        }
    }
}

/// Classify a batch of proteins sequentially.
///
/// Recoverable errors are logged and skipped when `continue_on_error` is
/// set; run-fatal errors always propagate immediately.
pub fn classify_batch(
    inputs: Vec<ProteinInput>,
    config: &MapperConfig,
    writer: &OutputWriter,
    batch: &BatchConfig,
) -> Result<BatchStats> {
    let started = Instant::now();
    let mut stats = BatchStats {
        total: inputs.len(),
        ..BatchStats::default()
    };

    for input in inputs {
        stats.processed += 1;
        match classify_protein(
            &input.protein_id,
            input.variants,
            input.structures,
            config,
            writer,
        ) {
            Ok(protein_stats) => stats.record_success(&protein_stats),
            Err(e) if e.is_recoverable() && batch.continue_on_error => {
                warn!(protein = %input.protein_id, "skipping protein: {}", e);
                stats.record_error(&input.protein_id, &e);
            }
            Err(e) => return Err(e),
        }

        if let Some(progress) = &batch.progress {
            if stats.processed % batch.progress_interval == 0 || stats.processed == stats.total {
                progress(stats.processed, stats.total);
            }
        }
    }

    stats.elapsed_secs = started.elapsed().as_secs_f64();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::structure::StructuralRecord;
    use crate::variant::VariantRecord;

    fn input(protein_id: &str, position: &str) -> ProteinInput {
        let mut row = StructuralRecord::test_record("1abc", "A", protein_id, 1, 100);
        row.protein_position = Some("42".to_string());
        ProteinInput::new(
            protein_id,
            vec![VariantRecord::test_record("v1", protein_id, position, "D/N")],
            vec![row],
        )
    }

    fn setup(dir: &std::path::Path) -> (MapperConfig, OutputWriter) {
        let config = MapperConfig::new();
        let writer = OutputWriter::new(dir, config.descriptor()).unwrap();
        (config, writer)
    }

    #[test]
    fn one_failing_protein_does_not_abort_the_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let (config, writer) = setup(tmp.path());
        let inputs = vec![
            input("ENSP1", "42"),
            // No data at all for this protein
            ProteinInput::new("ENSP2", Vec::new(), Vec::new()),
            input("ENSP3", "42"),
        ];
        let stats = classify_batch(inputs, &config, &writer, &BatchConfig::new()).unwrap();
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].contains("ENSP2"));
    }

    #[test]
    fn strict_mode_propagates_the_first_error() {
        let tmp = tempfile::tempdir().unwrap();
        let (config, writer) = setup(tmp.path());
        let inputs = vec![ProteinInput::new("ENSP2", Vec::new(), Vec::new())];
        let batch = BatchConfig::new().continue_on_error(false);
        assert!(classify_batch(inputs, &config, &writer, &batch).is_err());
    }

    #[test]
    fn progress_callback_fires_on_interval() {
        let tmp = tempfile::tempdir().unwrap();
        let (config, writer) = setup(tmp.path());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let batch = BatchConfig::new()
            .progress_interval(1)
            .progress(Box::new(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        let inputs = vec![input("ENSP1", "42"), input("ENSP3", "17")];
        classify_batch(inputs, &config, &writer, &batch).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn counts_aggregate_across_proteins() {
        let tmp = tempfile::tempdir().unwrap();
        let (config, writer) = setup(tmp.path());
        let inputs = vec![input("ENSP1", "42"), input("ENSP3", "999")];
        let stats = classify_batch(inputs, &config, &writer, &BatchConfig::new()).unwrap();
        assert_eq!(stats.structure, 1);
        assert_eq!(stats.unmapped, 1);
        assert!(stats.success_rate() > 0.99);
    }
}
