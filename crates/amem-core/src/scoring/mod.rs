//! Scoring Kernel (C2): pure, deterministic, side-effect-free math.
//!
//! Nothing here touches a port, a clock trait object, or I/O — every
//! function takes the instants and weights it needs as plain arguments,
//! matching §4.1's requirement that this layer be pure.

use chrono::{DateTime, Utc};

/// Cosine similarity between two equal-length vectors.
///
/// Returns `0.0` if the lengths differ or either magnitude is zero, per
/// §4.1, rather than propagating a `NaN`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Decay-rate parameters controlling how fast recency falls off.
///
/// Defaults match §4.1 exactly: `base_decay_rate=0.001 s⁻¹`, bounded to
/// `[min_decay_rate, max_decay_rate]` after the access-count modulation is
/// applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayConfig {
    pub base_decay_rate: f64,
    pub min_decay_rate: f64,
    pub max_decay_rate: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            base_decay_rate: 0.001,
            min_decay_rate: 0.0001,
            max_decay_rate: 0.01,
        }
    }
}

impl DecayConfig {
    /// `λ_eff = clamp(base / (ln(1 + access_count) + 1), min, max)`.
    ///
    /// Frequently accessed memories get a smaller effective rate — they
    /// decay slower — because the denominator grows with `access_count`.
    pub fn effective_decay_rate(&self, access_count: u64) -> f64 {
        let raw = self.base_decay_rate / ((1.0 + access_count as f64).ln() + 1.0);
        raw.clamp(self.min_decay_rate, self.max_decay_rate)
    }

    /// Half-life in seconds for a given constant decay rate, i.e. the time
    /// at which `exp(-rate * t) == 0.5`. Returns `None` for a non-positive
    /// rate (decay never happens).
    pub fn half_life_seconds(rate: f64) -> Option<f64> {
        if rate <= 0.0 {
            None
        } else {
            Some(std::f64::consts::LN_2 / rate)
        }
    }

    /// Seconds until an exponentially decaying quantity starting at
    /// `initial` and decaying at constant `rate` would cross `threshold`.
    /// Returns `None` if it is already at or below `threshold`, or if
    /// `rate <= 0` (it never crosses).
    pub fn time_to_threshold_seconds(initial: f64, threshold: f64, rate: f64) -> Option<f64> {
        if initial <= threshold || rate <= 0.0 {
            return None;
        }
        Some(-(threshold / initial).ln() / rate)
    }
}

/// `recency = exp(-λ_eff * age_seconds)`, where
/// `age_seconds = now - max(last_accessed_at, created_at)`.
pub fn recency_score(
    last_accessed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    access_count: u64,
    now: DateTime<Utc>,
    config: &DecayConfig,
) -> f64 {
    let reference = last_accessed_at.max(created_at);
    let age_seconds = (now - reference).num_milliseconds() as f64 / 1000.0;
    let age_seconds = age_seconds.max(0.0);
    let lambda_eff = config.effective_decay_rate(access_count);
    (-lambda_eff * age_seconds).exp()
}

/// Weights for the unified score `S = α·rel + β·imp + γ·rec`.
///
/// Construction does not fail when the weights don't sum to one — §4.1
/// only says they SHOULD; [`ScoringWeights::validate`] is how a caller
/// opts into the warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.3,
            gamma: 0.2,
        }
    }
}

impl ScoringWeights {
    /// Logs a `tracing::warn!` (and returns `false`) if the weights are
    /// more than `1e-5` away from summing to one. Computation proceeds
    /// either way — this never returns an error.
    pub fn validate(&self) -> bool {
        let total = self.alpha + self.beta + self.gamma;
        let ok = (total - 1.0).abs() <= 1e-5;
        if !ok {
            tracing::warn!(
                alpha = self.alpha,
                beta = self.beta,
                gamma = self.gamma,
                total,
                "scoring weights do not sum to 1.0"
            );
        }
        ok
    }
}

/// Explainable breakdown of a unified score, mirroring the structured
/// result the original math layer returns for ranking-UI callers.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryScoreResult {
    pub final_score: f64,
    pub relevance_score: f64,
    pub importance_score: f64,
    pub recency_score: f64,
    pub effective_decay_rate: f64,
}

/// `S = α·similarity + β·importance + γ·recency`, each component clamped
/// to `[0, 1]` before combination.
pub fn unified_score(
    similarity: f64,
    importance: f64,
    recency: f64,
    weights: &ScoringWeights,
) -> f64 {
    let rel = similarity.clamp(0.0, 1.0);
    let imp = importance.clamp(0.0, 1.0);
    let rec = recency.clamp(0.0, 1.0);
    weights.alpha * rel + weights.beta * imp + weights.gamma * rec
}

/// Full scoring-kernel entry point: computes recency from raw access
/// bookkeeping, then the unified score, and returns the explainable
/// breakdown rather than just the scalar.
#[allow(clippy::too_many_arguments)]
pub fn score_memory(
    similarity: f64,
    importance: f64,
    last_accessed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    access_count: u64,
    now: DateTime<Utc>,
    weights: &ScoringWeights,
    decay: &DecayConfig,
) -> MemoryScoreResult {
    let recency = recency_score(last_accessed_at, created_at, access_count, now, decay);
    let final_score = unified_score(similarity, importance, recency, weights);
    MemoryScoreResult {
        final_score,
        relevance_score: similarity.clamp(0.0, 1.0),
        importance_score: importance.clamp(0.0, 1.0),
        recency_score: recency,
        effective_decay_rate: decay.effective_decay_rate(access_count),
    }
}
