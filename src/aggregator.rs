// ==============================================================================
// aggregator.rs - Normalization, Confidence & Result Assembly
// ==============================================================================
// Description: Turns raw population likelihoods into percentage breakdowns
//              and the final structured ancestry result
// Author: Matt Barham
// Created: 2026-02-03
// Modified: 2026-02-03
// Version: 1.0.0
// ==============================================================================
// Percentages come from a softmax over average log-likelihoods. The scale
// factor controls sharpness: continental separation uses a higher factor
// than the regional mixture view. Rounded percentages always total exactly
// 100, with the rounding remainder assigned to the largest bucket.
// ==============================================================================

use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{AncestryResult, PopulationScore, ScoringConfig};
use crate::populations::PopulationRegistry;
use crate::scoring::ScoringOutcome;

/// Assembles the final ancestry result from raw scoring output
pub struct ResultAggregator<'a> {
    registry: &'a PopulationRegistry,
    config: ScoringConfig,
}

impl<'a> ResultAggregator<'a> {
    pub fn new(registry: &'a PopulationRegistry, config: ScoringConfig) -> Self {
        Self { registry, config }
    }

    /// Build the complete result.
    ///
    /// Zero resolved markers is not an error: the result comes back with
    /// confidence 0 and empty percentage maps, and callers surface
    /// "insufficient data".
    pub fn aggregate(&self, outcome: &ScoringOutcome, markers_total: usize) -> AncestryResult {
        if outcome.markers_matched == 0 || outcome.scores.is_empty() {
            info!("No markers resolved; returning insufficient-data result");
            return AncestryResult::insufficient(markers_total);
        }

        let eligible = self.eligible_scores(&outcome.scores);

        let continental = self.continental_breakdown(&eligible);
        let regional = self.regional_breakdown(&eligible);
        let grouped = self.group_by_continent(&regional);

        let confidence = if markers_total == 0 {
            0.0
        } else {
            (outcome.markers_matched as f64 / markers_total as f64 * 100.0).clamp(0.0, 100.0)
        };

        let low_confidence = outcome.markers_matched < self.config.min_panel_markers;
        if low_confidence {
            info!(
                "Only {}/{} markers resolved; flagging low confidence",
                outcome.markers_matched, markers_total
            );
        }

        AncestryResult {
            analysis_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            continental,
            regional,
            grouped,
            population_scores: outcome.scores.clone(),
            markers_total,
            markers_matched: outcome.markers_matched,
            confidence,
            low_confidence,
        }
    }

    /// Populations with enough scored markers to normalize. When none meet
    /// the gate (sparse chips, tiny panels) every scored population is
    /// kept rather than reporting nothing.
    fn eligible_scores(
        &self,
        scores: &BTreeMap<String, PopulationScore>,
    ) -> BTreeMap<String, PopulationScore> {
        let gated: BTreeMap<String, PopulationScore> = scores
            .iter()
            .filter(|(_, s)| s.markers >= self.config.min_population_markers)
            .map(|(code, s)| (code.clone(), *s))
            .collect();

        if gated.is_empty() {
            debug!(
                "No population reached {} markers; using all {} scored populations",
                self.config.min_population_markers,
                scores.len()
            );
            scores.clone()
        } else {
            gated
        }
    }

    /// Continental view: each continent is represented by its best-scoring
    /// child population, then softmaxed across continents
    fn continental_breakdown(
        &self,
        eligible: &BTreeMap<String, PopulationScore>,
    ) -> BTreeMap<String, f64> {
        let mut continent_scores: BTreeMap<String, f64> = BTreeMap::new();

        for (continent, children) in self.registry.continental_groups() {
            let best = children
                .iter()
                .filter_map(|p| eligible.get(&p.code))
                .map(|s| s.score)
                .fold(None::<f64>, |acc, score| match acc {
                    Some(best) if best >= score => Some(best),
                    _ => Some(score),
                });

            if let Some(score) = best {
                continent_scores.insert(continent.to_string(), score);
            }
        }

        likelihood_to_percentages(&continent_scores, self.config.continental_scale)
    }

    /// Regional view across all eligible populations, keyed by display name
    fn regional_breakdown(
        &self,
        eligible: &BTreeMap<String, PopulationScore>,
    ) -> BTreeMap<String, f64> {
        let scores: BTreeMap<String, f64> = eligible
            .iter()
            .map(|(code, s)| (code.clone(), s.score))
            .collect();

        let percentages = likelihood_to_percentages(&scores, self.config.regional_scale);

        percentages
            .into_iter()
            .filter_map(|(code, pct)| {
                self.registry
                    .get(&code)
                    .map(|p| (p.display.clone(), pct))
            })
            .collect()
    }

    /// Hierarchical view: continent -> population display name -> percentage.
    /// Sub-regional mass within a continent may total less than the
    /// continental figure; the two views are normalized independently.
    fn group_by_continent(
        &self,
        regional: &BTreeMap<String, f64>,
    ) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut grouped: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

        for population in self.registry.populations() {
            if let Some(pct) = regional.get(&population.display) {
                grouped
                    .entry(population.continent.clone())
                    .or_default()
                    .insert(population.display.clone(), *pct);
            }
        }

        grouped
    }
}

/// Softmax conversion from average log-likelihoods to percentages.
///
/// Scores are shifted by the maximum for numerical stability, scaled,
/// exponentiated, and normalized to sum to 100. Each value is rounded to
/// 0.1 and the rounding remainder lands on the largest bucket so the total
/// is exactly 100 (within float epsilon). Every input key survives; small
/// values are never discarded here.
pub fn likelihood_to_percentages(
    scores: &BTreeMap<String, f64>,
    scale_factor: f64,
) -> BTreeMap<String, f64> {
    if scores.is_empty() {
        return BTreeMap::new();
    }

    let max_score = scores
        .values()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let exp_scores: BTreeMap<&String, f64> = scores
        .iter()
        .map(|(key, score)| (key, ((score - max_score) * scale_factor).exp()))
        .collect();

    let total: f64 = exp_scores.values().sum();

    let mut percentages: BTreeMap<String, f64> = exp_scores
        .iter()
        .map(|(key, exp)| ((*key).clone(), round_tenth(exp / total * 100.0)))
        .collect();

    // Assign the rounding remainder to the largest bucket
    let sum: f64 = percentages.values().sum();
    let remainder = 100.0 - sum;
    if remainder.abs() > f64::EPSILON {
        if let Some(largest) = percentages
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(key, _)| key.clone())
        {
            if let Some(value) = percentages.get_mut(&largest) {
                *value = round_tenth(*value + remainder);
            }
        }
    }

    percentages
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
