// ==============================================================================
// processor.rs - Ancestry Analysis Pipeline
// ==============================================================================
// Description: Orchestrates validation, parsing, scoring, and aggregation
//              for a single uploaded raw DNA export
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::aggregator::ResultAggregator;
use crate::marker_panel::MarkerPanel;
use crate::models::{AncestryResult, GenotypeMap, ScoringConfig};
use crate::parsers;
use crate::populations::PopulationRegistry;
use crate::scoring::AncestryScorer;
use crate::validator::FileValidator;

/// End-to-end ancestry analysis for one raw export file.
///
/// The panel and registry are loaded once and shared read-only; each
/// `process` call is stateless and independent, so concurrent analyses
/// need no locking.
pub struct AncestryProcessor {
    input_path: PathBuf,
    output_path: Option<PathBuf>,
    panel: MarkerPanel,
    registry: PopulationRegistry,
    config: ScoringConfig,
}

impl AncestryProcessor {
    pub fn new(
        input_path: PathBuf,
        output_path: Option<PathBuf>,
        panel: MarkerPanel,
        registry: PopulationRegistry,
        config: ScoringConfig,
    ) -> Self {
        Self {
            input_path,
            output_path,
            panel,
            registry,
            config,
        }
    }

    /// Main processing pipeline
    pub async fn process(&self) -> Result<AncestryResult> {
        info!("Starting ancestry analysis for {:?}", self.input_path);

        // 1. Validate the upload
        let validated = FileValidator::new()
            .validate_upload(&self.input_path)
            .await
            .context("Upload validation failed")?;
        info!(
            "Validated {} ({} bytes, sha256 {})",
            validated.original_name, validated.size, validated.hash_sha256
        );

        // 2. Parse into the uniform genotype mapping
        let genotypes = parsers::load_genotype_map(&self.input_path)
            .context("Failed to parse raw DNA export")?;
        info!("Loaded {} usable genotypes", genotypes.len());

        // 3. Score and aggregate (CPU-bound, synchronous)
        let result = self.analyze(&genotypes);
        info!(
            "Analysis {} complete: {}/{} markers matched, confidence {:.1}%",
            result.analysis_id, result.markers_matched, result.markers_total, result.confidence
        );

        // 4. Write result JSON if requested
        if let Some(output_path) = &self.output_path {
            let json = serde_json::to_string_pretty(&result)
                .context("Failed to serialize result")?;
            std::fs::write(output_path, json)
                .with_context(|| format!("Failed to write result to {:?}", output_path))?;
            info!("Result written to {:?}", output_path);
        }

        Ok(result)
    }

    /// Score a genotype mapping against the configured panel. Pure and
    /// deterministic apart from the result's id and timestamp.
    pub fn analyze(&self, genotypes: &GenotypeMap) -> AncestryResult {
        let scorer = AncestryScorer::new(&self.panel, &self.registry, self.config);
        let outcome = scorer.score_populations(genotypes);

        let aggregator = ResultAggregator::new(&self.registry, scorer.config());
        aggregator.aggregate(&outcome, self.panel.len())
    }
}
