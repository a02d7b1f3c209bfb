// ==============================================================================
// scoring.rs - Population Likelihood Scoring Engine
// ==============================================================================
// Description: Converts rsID->genotype mappings into per-population
//              log-likelihood scores against reference allele frequencies
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   For each panel marker present in the user's data, resolve the genotype
//   through the strand-aware matcher, then score every population under
//   Hardy-Weinberg equilibrium with that population's alternate-allele
//   frequency p (clamped to [0.001, 0.999]):
//     hom-ref: (1-p)^2    het: 2p(1-p)    hom-alt: p^2
//   Scores accumulate as natural logs and are reported as the average
//   log-likelihood per scored marker. Additive log scoring means a single
//   mismatched marker can never zero out an otherwise strong population.
// ==============================================================================

use std::collections::BTreeMap;
use tracing::debug;

use crate::genotype_matcher::{is_valid_genotype, match_genotype};
use crate::marker_panel::MarkerPanel;
use crate::models::{GenotypeMap, Marker, Population, PopulationScore, ScoringConfig};
use crate::populations::PopulationRegistry;

/// Frequencies are clamped to this band so no genotype has probability 0
/// and log terms stay finite.
const FREQ_FLOOR: f64 = 0.001;
const FREQ_CEIL: f64 = 0.999;

/// Raw scoring output consumed by the aggregator
#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    /// Population code -> raw evidence. Populations with zero scored
    /// markers are absent, not zero: "no data" is not "0% ancestry".
    pub scores: BTreeMap<String, PopulationScore>,

    /// Panel markers whose genotype resolved through the matcher
    pub markers_matched: usize,
}

/// Ancestry scoring engine.
///
/// Holds shared references to the immutable panel and registry; a single
/// scorer is safe to use from concurrent analyses.
pub struct AncestryScorer<'a> {
    panel: &'a MarkerPanel,
    registry: &'a PopulationRegistry,
    config: ScoringConfig,
}

impl<'a> AncestryScorer<'a> {
    pub fn new(
        panel: &'a MarkerPanel,
        registry: &'a PopulationRegistry,
        config: ScoringConfig,
    ) -> Self {
        Self {
            panel,
            registry,
            config,
        }
    }

    pub fn config(&self) -> ScoringConfig {
        self.config
    }

    pub fn panel(&self) -> &MarkerPanel {
        self.panel
    }

    pub fn registry(&self) -> &PopulationRegistry {
        self.registry
    }

    /// Score all registry populations against the user's genotypes.
    ///
    /// Malformed genotypes, unknown rsIDs, and unmatched orientations are
    /// skipped per marker; nothing here is fatal.
    pub fn score_populations(&self, genotypes: &GenotypeMap) -> ScoringOutcome {
        let resolved = self.resolve_markers(genotypes);

        let mut scores = BTreeMap::new();
        for population in self.registry.populations() {
            let mut total_log_likelihood = 0.0;
            let mut marker_count = 0usize;

            for (marker, dosage) in &resolved {
                // Missing frequency data excludes the marker for this
                // population only
                let Some(freq) = population_alt_frequency(marker, population) else {
                    continue;
                };

                total_log_likelihood += genotype_probability(*dosage, freq).ln();
                marker_count += 1;
            }

            if marker_count > 0 {
                scores.insert(
                    population.code.clone(),
                    PopulationScore {
                        score: total_log_likelihood / marker_count as f64,
                        markers: marker_count,
                    },
                );
            }
        }

        debug!(
            "Scored {} populations from {} resolved markers",
            scores.len(),
            resolved.len()
        );

        ScoringOutcome {
            scores,
            markers_matched: resolved.len(),
        }
    }

    /// Resolve user genotypes against the panel: normalize, strand-match,
    /// and convert to alternate-allele dosage. One entry per marker that
    /// carried usable signal.
    fn resolve_markers(&self, genotypes: &GenotypeMap) -> Vec<(&'a Marker, u8)> {
        let mut resolved = Vec::new();

        for marker in self.panel.markers() {
            let Some(raw) = genotypes.get(&marker.rsid) else {
                continue;
            };

            let Some(normalized) = standardize_genotype(raw) else {
                continue;
            };

            let candidates = marker.candidate_genotypes();
            let Some(matched) = match_genotype(&normalized, &candidates) else {
                continue;
            };

            // Candidates come from the marker's own alleles, so dosage
            // conversion cannot fail past this point
            if let Some(dosage) = marker.alt_dosage(&matched) {
                resolved.push((marker, dosage));
            }
        }

        resolved
    }
}

/// Uppercase and sort a raw genotype; None for anything that is not a
/// two-letter ACGT call after normalization
pub fn standardize_genotype(raw: &str) -> Option<String> {
    let upper = raw.trim().to_uppercase();
    if !is_valid_genotype(&upper) {
        return None;
    }
    let mut alleles: Vec<char> = upper.chars().collect();
    alleles.sort_unstable();
    Some(alleles.into_iter().collect())
}

/// Hardy-Weinberg genotype probability for an alternate-allele dosage
/// given alternate-allele frequency `p`
fn genotype_probability(dosage: u8, p: f64) -> f64 {
    let p = p.clamp(FREQ_FLOOR, FREQ_CEIL);
    let q = 1.0 - p;
    match dosage {
        0 => q * q,
        1 => 2.0 * p * q,
        _ => p * p,
    }
}

/// Alternate-allele frequency for a population, following its fallback
/// chain when the marker has no entry for the primary code
fn population_alt_frequency(marker: &Marker, population: &Population) -> Option<f64> {
    if let Some(freq) = marker.alt_frequencies.get(&population.code) {
        return Some(*freq);
    }
    for fallback in &population.fallbacks {
        if let Some(freq) = marker.alt_frequencies.get(fallback) {
            return Some(*freq);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Marker;
    use std::collections::BTreeMap;

    fn synthetic_marker(rsid: &str, freqs: &[(&str, f64)]) -> Marker {
        Marker {
            rsid: rsid.to_string(),
            gene: "TEST".to_string(),
            chromosome: "1".to_string(),
            position: 1000,
            ref_allele: 'A',
            alt_allele: 'G',
            alt_frequencies: freqs
                .iter()
                .map(|(c, f)| (c.to_string(), *f))
                .collect(),
        }
    }

    fn synthetic_registry() -> PopulationRegistry {
        PopulationRegistry::new(vec![
            Population {
                code: "NEU".to_string(),
                display: "Northern European".to_string(),
                continent: "European".to_string(),
                fallbacks: vec!["EUR".to_string()],
            },
            Population {
                code: "EAS".to_string(),
                display: "East Asian".to_string(),
                continent: "East Asian".to_string(),
                fallbacks: vec![],
            },
        ])
    }

    fn genotypes(pairs: &[(&str, &str)]) -> GenotypeMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_genotype_probability_hardy_weinberg() {
        let p: f64 = 0.8;
        assert!((genotype_probability(2, p) - 0.64).abs() < 1e-12);
        assert!((genotype_probability(1, p) - 0.32).abs() < 1e-12);
        assert!((genotype_probability(0, p) - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_genotype_probability_clamped() {
        // p = 0 would make hom-alt impossible and ln() infinite
        let prob = genotype_probability(2, 0.0);
        assert!(prob > 0.0);
        assert!(prob.ln().is_finite());
    }

    #[test]
    fn test_scoring_prefers_matching_population() {
        let panel = MarkerPanel::new(vec![
            synthetic_marker("rs1", &[("NEU", 0.9), ("EAS", 0.1)]),
            synthetic_marker("rs2", &[("NEU", 0.85), ("EAS", 0.05)]),
        ])
        .unwrap();
        let registry = synthetic_registry();
        let scorer = AncestryScorer::new(&panel, &registry, ScoringConfig::permissive());

        // Homozygous for the allele common in NEU at both markers
        let outcome = scorer.score_populations(&genotypes(&[("rs1", "GG"), ("rs2", "GG")]));

        assert_eq!(outcome.markers_matched, 2);
        assert!(outcome.scores["NEU"].score > outcome.scores["EAS"].score);
    }

    #[test]
    fn test_unknown_rsids_and_no_calls_skipped() {
        let panel =
            MarkerPanel::new(vec![synthetic_marker("rs1", &[("NEU", 0.9)])]).unwrap();
        let registry = synthetic_registry();
        let scorer = AncestryScorer::new(&panel, &registry, ScoringConfig::permissive());

        let outcome =
            scorer.score_populations(&genotypes(&[("rs99", "GG"), ("rs1", "--")]));
        assert_eq!(outcome.markers_matched, 0);
        assert!(outcome.scores.is_empty());
    }

    #[test]
    fn test_population_without_frequency_data_excluded() {
        // Marker only has NEU data; EAS has no fallback that resolves
        let panel =
            MarkerPanel::new(vec![synthetic_marker("rs1", &[("NEU", 0.9)])]).unwrap();
        let registry = synthetic_registry();
        let scorer = AncestryScorer::new(&panel, &registry, ScoringConfig::permissive());

        let outcome = scorer.score_populations(&genotypes(&[("rs1", "GG")]));
        assert!(outcome.scores.contains_key("NEU"));
        // Excluded, not scored as zero
        assert!(!outcome.scores.contains_key("EAS"));
    }

    #[test]
    fn test_fallback_frequency_used() {
        // NEU falls back to the EUR aggregate code
        let panel =
            MarkerPanel::new(vec![synthetic_marker("rs1", &[("EUR", 0.7)])]).unwrap();
        let registry = synthetic_registry();
        let scorer = AncestryScorer::new(&panel, &registry, ScoringConfig::permissive());

        let outcome = scorer.score_populations(&genotypes(&[("rs1", "AG")]));
        assert!(outcome.scores.contains_key("NEU"));
    }

    #[test]
    fn test_strand_flipped_genotype_resolves() {
        let panel = MarkerPanel::new(vec![synthetic_marker("rs1", &[("NEU", 0.9)])]).unwrap();
        let registry = synthetic_registry();
        let scorer = AncestryScorer::new(&panel, &registry, ScoringConfig::permissive());

        // CC is the complement of GG (marker alleles are A/G)
        let direct = scorer.score_populations(&genotypes(&[("rs1", "GG")]));
        let flipped = scorer.score_populations(&genotypes(&[("rs1", "CC")]));

        assert_eq!(direct.markers_matched, 1);
        assert_eq!(flipped.markers_matched, 1);
        assert_eq!(direct.scores["NEU"], flipped.scores["NEU"]);
    }

    #[test]
    fn test_standardize_genotype() {
        assert_eq!(standardize_genotype("ga"), Some("AG".to_string()));
        assert_eq!(standardize_genotype(" TT "), Some("TT".to_string()));
        assert_eq!(standardize_genotype("--"), None);
        assert_eq!(standardize_genotype("A"), None);
        assert_eq!(standardize_genotype("DI"), None);
    }
}
