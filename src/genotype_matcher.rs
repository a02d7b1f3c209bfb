// ==============================================================================
// genotype_matcher.rs - Strand-Aware Genotype Matching
// ==============================================================================
// Description: Resolves user genotypes against marker allele representations
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   Consumer files do not guarantee strand orientation, so a genotype is
//   tried in four forms against the candidate set, in order:
//     1. exact          ("AG")
//     2. reversed       ("GA")
//     3. complement     ("TC", per-base A<->T / C<->G)
//     4. reversed complement ("CT")
//   The first candidate-set member hit wins. No hit means the marker is
//   non-informative for this file and is skipped - never an error.
// ==============================================================================

/// Complement a single base. Non-ACGT characters pass through unchanged
/// so no-call symbols survive round trips.
pub fn complement_base(base: char) -> char {
    match base {
        'A' => 'T',
        'T' => 'A',
        'C' => 'G',
        'G' => 'C',
        other => other,
    }
}

/// Per-base complement of a genotype string (strand flip)
pub fn complement(genotype: &str) -> String {
    genotype.chars().map(complement_base).collect()
}

/// Reversed genotype string
fn reversed(genotype: &str) -> String {
    genotype.chars().rev().collect()
}

/// Resolve a user genotype against a marker's known genotype
/// representations.
///
/// Returns the matching candidate in the marker's own orientation, or None
/// when no transform aligns. Every marker-matching operation in the engine
/// goes through this function so strand differences between the reference
/// panel and the raw file never silently drop informative markers.
pub fn match_genotype(genotype: &str, candidates: &[String]) -> Option<String> {
    let transforms = [
        genotype.to_string(),
        reversed(genotype),
        complement(genotype),
        reversed(&complement(genotype)),
    ];

    for transform in transforms {
        if candidates.iter().any(|c| c == &transform) {
            return Some(transform);
        }
    }

    None
}

/// True when a genotype is a well-formed two-letter call over {A,C,G,T}.
/// Anything else (no-calls, indel codes, short reads) is excluded before
/// scoring.
pub fn is_valid_genotype(genotype: &str) -> bool {
    genotype.len() == 2 && genotype.chars().all(|c| matches!(c, 'A' | 'C' | 'G' | 'T'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement() {
        assert_eq!(complement("AG"), "TC");
        assert_eq!(complement("CC"), "GG");
        assert_eq!(complement("--"), "--");
    }

    #[test]
    fn test_exact_match_wins() {
        let candidates = ["AA".to_string(), "AG".to_string(), "GG".to_string()];
        assert_eq!(match_genotype("AG", &candidates), Some("AG".to_string()));
    }

    #[test]
    fn test_reversed_match() {
        let candidates = ["AA".to_string(), "AG".to_string(), "GG".to_string()];
        assert_eq!(match_genotype("GA", &candidates), Some("AG".to_string()));
    }

    #[test]
    fn test_complement_match() {
        // File on the opposite strand: TC complements to AG
        let candidates = ["AA".to_string(), "AG".to_string(), "GG".to_string()];
        assert_eq!(match_genotype("TC", &candidates), Some("AG".to_string()));
        assert_eq!(match_genotype("TT", &candidates), Some("AA".to_string()));
    }

    #[test]
    fn test_reversed_complement_match() {
        let candidates = ["AA".to_string(), "AG".to_string(), "GG".to_string()];
        // CT reversed-complements to AG
        assert_eq!(match_genotype("CT", &candidates), Some("AG".to_string()));
    }

    #[test]
    fn test_no_match_is_none() {
        let candidates = ["AA".to_string(), "AG".to_string(), "GG".to_string()];
        assert_eq!(match_genotype("CC", &candidates), None);
    }

    #[test]
    fn test_match_order_prefers_exact() {
        // Candidate set containing both a genotype and its complement:
        // exact must win before the complement transform is tried
        let candidates = ["AA".to_string(), "TT".to_string()];
        assert_eq!(match_genotype("AA", &candidates), Some("AA".to_string()));
        assert_eq!(match_genotype("TT", &candidates), Some("TT".to_string()));
    }

    #[test]
    fn test_is_valid_genotype() {
        assert!(is_valid_genotype("AG"));
        assert!(is_valid_genotype("TT"));
        assert!(!is_valid_genotype("--"));
        assert!(!is_valid_genotype("A"));
        assert!(!is_valid_genotype("AGG"));
        assert!(!is_valid_genotype("DD"));
        assert!(!is_valid_genotype("A0"));
    }
}
