// ==============================================================================
// populations.rs - Reference Population Registry
// ==============================================================================
// Description: 1000 Genomes / gnomAD reference populations and their
//              continental hierarchy
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// Only unadmixed reference populations are scored. Admixed panels (MXL, PUR)
// match everyone and are excluded from the registry outright; aggregate codes
// (EUR, AFR, EAS, SAS) appear only as frequency-table fallbacks.
// ==============================================================================

use std::collections::BTreeMap;

use crate::models::Population;

/// Immutable registry of scored reference populations.
///
/// Loaded once at startup and shared read-only across analyses. Injected
/// into the scoring engine so tests can substitute synthetic hierarchies.
#[derive(Debug, Clone)]
pub struct PopulationRegistry {
    populations: Vec<Population>,
}

impl PopulationRegistry {
    /// Build a registry from an explicit population list
    pub fn new(populations: Vec<Population>) -> Self {
        Self { populations }
    }

    /// The built-in reference panel populations (1000 Genomes codes plus
    /// the gnomAD Middle Eastern group)
    pub fn builtin() -> Self {
        let pop = |code: &str, display: &str, continent: &str, fallbacks: &[&str]| Population {
            code: code.to_string(),
            display: display.to_string(),
            continent: continent.to_string(),
            fallbacks: fallbacks.iter().map(|f| f.to_string()).collect(),
        };

        Self::new(vec![
            pop("GBR", "England & Northwestern Europe", "European", &["CEU", "EUR"]),
            pop("CEU", "Germanic Europe", "European", &["GBR", "EUR"]),
            pop("FIN", "Finland & Baltic", "European", &["CEU", "EUR"]),
            pop("TSI", "Southern Europe & Mediterranean", "European", &["IBS", "EUR"]),
            pop("IBS", "Spain & Portugal", "European", &["TSI", "EUR"]),
            pop("YRI", "West African", "African", &["AFR"]),
            pop("CHB", "Chinese", "East Asian", &["EAS", "JPT"]),
            pop("JPT", "Japanese", "East Asian", &["EAS", "CHB"]),
            pop("GIH", "South Asian", "South Asian", &["SAS"]),
            pop("MID", "Middle East & North Africa", "Middle Eastern", &["SAS", "EUR"]),
        ])
    }

    /// All scored populations
    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    /// Look up a population by code
    pub fn get(&self, code: &str) -> Option<&Population> {
        self.populations.iter().find(|p| p.code == code)
    }

    /// Continental grouping: continent name -> child populations
    pub fn continental_groups(&self) -> BTreeMap<&str, Vec<&Population>> {
        let mut groups: BTreeMap<&str, Vec<&Population>> = BTreeMap::new();
        for population in &self.populations {
            groups
                .entry(population.continent.as_str())
                .or_default()
                .push(population);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_codes_are_unique() {
        let registry = PopulationRegistry::builtin();
        let mut codes: Vec<&str> = registry
            .populations()
            .iter()
            .map(|p| p.code.as_str())
            .collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn test_hierarchy_is_a_tree() {
        // Every population has exactly one continental parent
        let registry = PopulationRegistry::builtin();
        for population in registry.populations() {
            assert!(!population.continent.is_empty(), "{}", population.code);
        }
    }

    #[test]
    fn test_fallbacks_never_self_reference() {
        let registry = PopulationRegistry::builtin();
        for population in registry.populations() {
            assert!(
                !population.fallbacks.contains(&population.code),
                "{} lists itself as a fallback",
                population.code
            );
        }
    }

    #[test]
    fn test_continental_groups() {
        let registry = PopulationRegistry::builtin();
        let groups = registry.continental_groups();
        assert_eq!(groups["European"].len(), 5);
        assert_eq!(groups["East Asian"].len(), 2);
        assert_eq!(groups["African"].len(), 1);
    }

    #[test]
    fn test_lookup_by_code() {
        let registry = PopulationRegistry::builtin();
        let gbr = registry.get("GBR").unwrap();
        assert_eq!(gbr.continent, "European");
        assert!(registry.get("MXL").is_none());
    }
}
