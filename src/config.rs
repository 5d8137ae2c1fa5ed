//! Run configuration for the classification engine.
//!
//! A [`MapperConfig`] carries the filter parameters the (external) CLI
//! layer resolved: quality thresholds, consequence and isoform filters, the
//! fallback-join flag and the output format. The same parameters also
//! derive the deterministic output file names, so repeated runs with
//! identical parameters append to the same logical files.

use crate::output::{OutputDescriptor, OutputFormat};
use crate::structure::QualityThresholds;

/// Configuration for one classification run.
#[derive(Debug, Clone, Default)]
pub struct MapperConfig {
    /// Minimum alignment percent identity; `None` disables the filter.
    pub min_pident: Option<f64>,

    /// Minimum alignment e-value (kept rows satisfy `e_value >= min_evalue`);
    /// `None` disables the filter.
    pub min_evalue: Option<f64>,

    /// Allowed consequence tags; `None` keeps every variant.
    pub consequence_filter: Option<Vec<String>>,

    /// Required APPRIS isoform tag; `None` keeps every variant.
    pub isoform_filter: Option<String>,

    /// Enable the fallback join that recovers variants inside covered
    /// alignment spans.
    pub locate_unmapped: bool,

    /// Output serialization format.
    pub output_format: OutputFormat,
}

impl MapperConfig {
    /// Create a configuration with defaults (no filtering, no fallback).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum percent identity.
    pub fn min_pident(mut self, min_pident: f64) -> Self {
        self.min_pident = Some(min_pident);
        self
    }

    /// Set the minimum e-value.
    pub fn min_evalue(mut self, min_evalue: f64) -> Self {
        self.min_evalue = Some(min_evalue);
        self
    }

    /// Restrict classification to variants carrying one of these
    /// consequence tags.
    pub fn consequence_filter(mut self, tags: Vec<String>) -> Self {
        self.consequence_filter = Some(tags);
        self
    }

    /// Restrict classification to variants on this APPRIS isoform.
    pub fn isoform_filter(mut self, tag: impl Into<String>) -> Self {
        self.isoform_filter = Some(tag.into());
        self
    }

    /// Enable or disable the fallback join.
    pub fn locate_unmapped(mut self, enabled: bool) -> Self {
        self.locate_unmapped = enabled;
        self
    }

    /// Quality thresholds for the structural filter.
    pub fn thresholds(&self) -> QualityThresholds {
        QualityThresholds {
            min_pident: self.min_pident,
            min_evalue: self.min_evalue,
        }
    }

    /// The deterministic output descriptor for these parameters.
    pub fn descriptor(&self) -> OutputDescriptor {
        OutputDescriptor::new(
            self.min_pident,
            self.isoform_filter.as_deref(),
            self.consequence_filter.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = MapperConfig::new()
            .min_pident(50.0)
            .min_evalue(1e-10)
            .isoform_filter("principal1")
            .locate_unmapped(true);
        assert_eq!(config.min_pident, Some(50.0));
        assert_eq!(config.min_evalue, Some(1e-10));
        assert_eq!(config.isoform_filter.as_deref(), Some("principal1"));
        assert!(config.locate_unmapped);
    }

    #[test]
    fn identical_parameters_derive_identical_descriptors() {
        let a = MapperConfig::new().min_pident(50.0).descriptor();
        let b = MapperConfig::new().min_pident(50.0).descriptor();
        assert_eq!(
            a.category_file_name(crate::MappingCategory::Interface),
            b.category_file_name(crate::MappingCategory::Interface)
        );
    }
}
