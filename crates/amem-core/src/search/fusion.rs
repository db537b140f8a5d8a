//! Fusion (C9, fusion half): RRF / weighted-sum / max combine multiple
//! strategies' ranked outputs into one ranked list.
//!
//! All three are stable under ties: on equal combined score, the
//! earlier-inserted memory wins (§4.1) — "earlier-inserted" meaning it was
//! first seen scanning `outputs` in the order given, and within an
//! output, in rank order.

use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

use super::strategies::StrategyResults;

/// One strategy's contribution to a fusion call: its name (only used for
/// diagnostics), its weight, and its raw ranked results.
#[derive(Debug, Clone)]
pub struct StrategyOutput {
    pub name: String,
    pub weight: f32,
    pub results: StrategyResults,
}

/// Default RRF constant (§4.1).
pub const DEFAULT_RRF_K: f32 = 60.0;

fn insertion_order(outputs: &[StrategyOutput]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    let mut order = Vec::new();
    for output in outputs {
        for (id, _) in &output.results {
            if seen.insert(*id) {
                order.push(*id);
            }
        }
    }
    order
}

fn sort_stable_by_score(mut scored: Vec<(Uuid, f32)>, order: &[Uuid]) -> Vec<(Uuid, f32)> {
    let position: HashMap<Uuid, usize> = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    scored.sort_by(|a, b| match b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal) {
        Ordering::Equal => position[&a.0].cmp(&position[&b.0]),
        other => other,
    });
    scored
}

/// Reciprocal-rank fusion: `score += weight / (k + rank)` for each
/// strategy's result at 1-indexed `rank`.
pub fn reciprocal_rank_fusion(outputs: &[StrategyOutput], k: f32) -> Vec<(Uuid, f32)> {
    let order = insertion_order(outputs);
    let mut scores: HashMap<Uuid, f32> = HashMap::new();
    for output in outputs {
        for (rank, (id, _raw_score)) in output.results.iter().enumerate() {
            let contribution = output.weight / (k + (rank as f32 + 1.0));
            *scores.entry(*id).or_insert(0.0) += contribution;
        }
    }
    let scored: Vec<(Uuid, f32)> = scores.into_iter().collect();
    sort_stable_by_score(scored, &order)
}

fn min_max_normalize(results: &StrategyResults) -> HashMap<Uuid, f32> {
    if results.is_empty() {
        return HashMap::new();
    }
    let min = results.iter().map(|(_, s)| *s).fold(f32::INFINITY, f32::min);
    let max = results.iter().map(|(_, s)| *s).fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    results
        .iter()
        .map(|(id, score)| {
            let normalized = if range.abs() < f32::EPSILON { 1.0 } else { (score - min) / range };
            (*id, normalized)
        })
        .collect()
}

/// Weighted sum: min-max normalize each strategy's scores to `[0, 1]`,
/// then combine `Σ weight_s · normalized_score_s`.
pub fn weighted_sum_fusion(outputs: &[StrategyOutput]) -> Vec<(Uuid, f32)> {
    let order = insertion_order(outputs);
    let mut scores: HashMap<Uuid, f32> = HashMap::new();
    for output in outputs {
        let normalized = min_max_normalize(&output.results);
        for (id, norm_score) in normalized {
            *scores.entry(id).or_insert(0.0) += output.weight * norm_score;
        }
    }
    let scored: Vec<(Uuid, f32)> = scores.into_iter().collect();
    sort_stable_by_score(scored, &order)
}

/// Max fusion: per-id maximum across strategies (weights are ignored;
/// this strategy has no weighting term).
pub fn max_fusion(outputs: &[StrategyOutput]) -> Vec<(Uuid, f32)> {
    let order = insertion_order(outputs);
    let mut scores: HashMap<Uuid, f32> = HashMap::new();
    for output in outputs {
        for (id, score) in &output.results {
            scores
                .entry(*id)
                .and_modify(|existing| {
                    if *score > *existing {
                        *existing = *score;
                    }
                })
                .or_insert(*score);
        }
    }
    let scored: Vec<(Uuid, f32)> = scores.into_iter().collect();
    sort_stable_by_score(scored, &order)
}
