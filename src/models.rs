// ==============================================================================
// models.rs - Ancestry Analysis Data Models
// ==============================================================================
// Description: Typed data structures for markers, populations, and results
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Normalized user genotypes keyed by rsID.
///
/// Genotype strings are uppercased with alleles sorted alphabetically
/// ("GA" and "AG" both normalize to "AG"). BTreeMap keeps iteration order
/// deterministic so repeated analyses of the same input are bit-identical.
pub type GenotypeMap = BTreeMap<String, String>;

/// An ancestry-informative marker with per-population allele frequencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    /// SNP identifier (e.g., "rs12913832")
    pub rsid: String,

    /// Gene or region symbol (e.g., "HERC2")
    pub gene: String,

    /// Chromosome ("1"-"22", "X", "Y", "M") - informational only
    pub chromosome: String,

    /// Base pair position (GRCh37/hg19) - informational only
    pub position: u64,

    /// Reference allele
    pub ref_allele: char,

    /// Alternate allele
    pub alt_allele: char,

    /// Alternate-allele frequency per population code, value in [0, 1].
    /// May contain aggregate codes (EUR, AFR, EAS, SAS) used only as
    /// fallbacks, never scored directly.
    pub alt_frequencies: BTreeMap<String, f64>,
}

impl Marker {
    /// The three genotypes this marker can produce, in normalized
    /// (alphabetically sorted) form: hom-ref, het, hom-alt.
    pub fn candidate_genotypes(&self) -> [String; 3] {
        let hom_ref: String = [self.ref_allele, self.ref_allele].iter().collect();
        let hom_alt: String = [self.alt_allele, self.alt_allele].iter().collect();
        let mut het = [self.ref_allele, self.alt_allele];
        het.sort_unstable();
        [hom_ref, het.iter().collect(), hom_alt]
    }

    /// Count of alternate alleles in a normalized genotype (0, 1, or 2).
    /// Returns None if the genotype contains an allele this marker
    /// does not carry.
    pub fn alt_dosage(&self, genotype: &str) -> Option<u8> {
        let mut dosage = 0u8;
        for allele in genotype.chars() {
            if allele == self.alt_allele {
                dosage += 1;
            } else if allele != self.ref_allele {
                return None;
            }
        }
        Some(dosage)
    }

    /// True for strand-ambiguous (A/T or C/G) SNPs. These cannot be
    /// oriented reliably against an unknown-strand consumer file and are
    /// rejected at panel validation.
    pub fn is_palindromic(&self) -> bool {
        matches!(
            (self.ref_allele, self.alt_allele),
            ('A', 'T') | ('T', 'A') | ('C', 'G') | ('G', 'C')
        )
    }
}

/// A reference population with its place in the continental hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    /// Population code (1000 Genomes / gnomAD style, e.g., "GBR", "YRI")
    pub code: String,

    /// Display name in consumer-report style (e.g., "England & Northwestern Europe")
    pub display: String,

    /// Continental parent (e.g., "European"). Each population has exactly one.
    pub continent: String,

    /// Ordered frequency-table fallback codes tried when a marker has no
    /// entry for this population (e.g., GBR falls back to CEU, then EUR)
    pub fallbacks: Vec<String>,
}

/// Tunable scoring parameters.
///
/// Static reference tables and this config are injected into the engine so
/// tests can substitute small synthetic panels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Below this many resolved markers the whole result is flagged low
    /// confidence ("insufficient markers for reliable estimate")
    pub min_panel_markers: usize,

    /// Minimum markers a population must have scored to participate in
    /// normalization
    pub min_population_markers: usize,

    /// Softmax sharpness for the continental breakdown
    pub continental_scale: f64,

    /// Softmax sharpness for the regional breakdown (lower = more mixture)
    pub regional_scale: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_panel_markers: 10,
            min_population_markers: 10,
            continental_scale: 15.0,
            regional_scale: 8.0,
        }
    }
}

impl ScoringConfig {
    /// Config with all data-sufficiency gates open. Used by tests that run
    /// deliberately tiny synthetic panels.
    pub fn permissive() -> Self {
        Self {
            min_panel_markers: 1,
            min_population_markers: 1,
            ..Self::default()
        }
    }
}

/// Raw likelihood evidence for one population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationScore {
    /// Average log-likelihood per scored marker
    pub score: f64,

    /// Number of markers that contributed to the score
    pub markers: usize,
}

/// Complete ancestry analysis result.
///
/// Plain nested maps and typed fields only - no display assumptions. Empty
/// maps with confidence 0 mean "insufficient data", never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncestryResult {
    /// Unique id for this analysis run
    pub analysis_id: Uuid,

    /// When the analysis completed
    pub analyzed_at: DateTime<Utc>,

    /// Continent name -> percentage (sums to 100 when data is sufficient)
    pub continental: BTreeMap<String, f64>,

    /// Population display name -> percentage, across all continents.
    /// Regional mass within a continent may legitimately sum below the
    /// continental figure when markers discriminate only at continental level.
    pub regional: BTreeMap<String, f64>,

    /// Continent name -> (population display name -> percentage)
    pub grouped: BTreeMap<String, BTreeMap<String, f64>>,

    /// Population code -> raw score evidence (kept for round-trip fidelity;
    /// thresholding for display is the consumer's decision)
    pub population_scores: BTreeMap<String, PopulationScore>,

    /// Markers in the reference panel
    pub markers_total: usize,

    /// Markers whose genotype resolved against the panel
    pub markers_matched: usize,

    /// Coverage-based confidence, 0-100
    pub confidence: f64,

    /// True when fewer than the configured minimum markers resolved
    pub low_confidence: bool,
}

impl AncestryResult {
    /// The "insufficient data" result: empty percentage maps, confidence 0.
    /// Returned instead of an error for empty or unresolvable input.
    pub fn insufficient(markers_total: usize) -> Self {
        Self {
            analysis_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            continental: BTreeMap::new(),
            regional: BTreeMap::new(),
            grouped: BTreeMap::new(),
            population_scores: BTreeMap::new(),
            markers_total,
            markers_matched: 0,
            confidence: 0.0,
            low_confidence: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_marker(ref_allele: char, alt_allele: char) -> Marker {
        Marker {
            rsid: "rs1".to_string(),
            gene: "TEST".to_string(),
            chromosome: "1".to_string(),
            position: 1000,
            ref_allele,
            alt_allele,
            alt_frequencies: BTreeMap::new(),
        }
    }

    #[test]
    fn test_candidate_genotypes_sorted() {
        let marker = test_marker('G', 'A');
        // Het genotype is normalized alphabetically regardless of ref/alt order
        assert_eq!(
            marker.candidate_genotypes(),
            ["GG".to_string(), "AG".to_string(), "AA".to_string()]
        );
    }

    #[test]
    fn test_alt_dosage() {
        let marker = test_marker('A', 'G');
        assert_eq!(marker.alt_dosage("AA"), Some(0));
        assert_eq!(marker.alt_dosage("AG"), Some(1));
        assert_eq!(marker.alt_dosage("GG"), Some(2));
        // Allele outside the marker's pair
        assert_eq!(marker.alt_dosage("AT"), None);
    }

    #[test]
    fn test_palindromic_detection() {
        assert!(test_marker('A', 'T').is_palindromic());
        assert!(test_marker('C', 'G').is_palindromic());
        assert!(!test_marker('A', 'G').is_palindromic());
        assert!(!test_marker('T', 'C').is_palindromic());
    }

    #[test]
    fn test_insufficient_result_is_empty() {
        let result = AncestryResult::insufficient(24);
        assert_eq!(result.confidence, 0.0);
        assert!(result.low_confidence);
        assert!(result.continental.is_empty());
        assert!(result.grouped.is_empty());
        assert_eq!(result.markers_total, 24);
    }
}
