//! Consolidation FSM (C7): deterministic lifecycle transitions plus the
//! Bayesian confidence update used when new evidence arrives for a
//! semantic memory.

use crate::model::{Layer, MemoryRecord};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Thresholds for every transition in §4.2's state-transition table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsolidationConfig {
    pub working_to_episodic_min_access_count: u64,
    pub working_to_episodic_min_importance: f64,
    pub working_to_episodic_min_age_seconds: i64,
    pub episodic_to_semantic_min_access_count: u64,
    pub episodic_to_semantic_min_importance: f64,
    pub archive_importance_threshold: f64,
    pub sensory_to_working_promotion_importance: f64,
    /// Default prior used for a memory's first Bayesian update.
    pub default_prior: f64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            working_to_episodic_min_access_count: 2,
            working_to_episodic_min_importance: 0.6,
            working_to_episodic_min_age_seconds: 600,
            episodic_to_semantic_min_access_count: 3,
            episodic_to_semantic_min_importance: 0.7,
            archive_importance_threshold: 0.1,
            sensory_to_working_promotion_importance: 0.5,
            default_prior: 0.5,
        }
    }
}

/// A single transition the FSM decided to apply, paired with the memory
/// it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub memory_id: Uuid,
    pub to: Layer,
}

/// Evaluates and applies the layer-transition FSM.
#[derive(Debug, Clone, Default)]
pub struct ConsolidationFsm {
    config: ConsolidationConfig,
}

impl ConsolidationFsm {
    pub fn new(config: ConsolidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Decide the next layer for `record` as of `now`, or `None` if it
    /// should stay put. Archival takes priority over promotion when both
    /// a Long-Term record's importance has fallen below threshold — an
    /// already-archived-worthy memory is never promoted instead.
    pub fn evaluate_transition(&self, record: &MemoryRecord, now: DateTime<Utc>) -> Option<Layer> {
        let c = &self.config;
        match record.layer {
            Layer::Sensory => {
                if record.importance >= c.sensory_to_working_promotion_importance {
                    Some(Layer::Working)
                } else {
                    None
                }
            }
            Layer::Working => {
                let age = now - record.created_at;
                if record.access_count >= c.working_to_episodic_min_access_count
                    && record.importance >= c.working_to_episodic_min_importance
                    && age >= Duration::seconds(c.working_to_episodic_min_age_seconds)
                {
                    Some(Layer::LongTermEpisodic)
                } else {
                    None
                }
            }
            Layer::LongTermEpisodic => {
                if record.importance < c.archive_importance_threshold {
                    Some(Layer::Archived)
                } else if record.access_count >= c.episodic_to_semantic_min_access_count
                    && record.importance >= c.episodic_to_semantic_min_importance
                {
                    Some(Layer::LongTermSemantic)
                } else {
                    None
                }
            }
            Layer::LongTermSemantic => {
                if record.importance < c.archive_importance_threshold {
                    Some(Layer::Archived)
                } else {
                    None
                }
            }
            Layer::Reflective | Layer::Archived => None,
        }
    }

    /// Run one consolidation pass over a batch of candidates, returning
    /// the transitions to apply. Does not mutate `records` itself — the
    /// caller (the background consolidation task) applies each
    /// transition through the metadata store so that `version` bumps and
    /// persistence happen in one place.
    pub fn run_pass(&self, records: &[MemoryRecord], now: DateTime<Utc>) -> Vec<Transition> {
        records
            .iter()
            .filter_map(|r| {
                self.evaluate_transition(r, now).map(|to| Transition {
                    memory_id: r.id,
                    to,
                })
            })
            .collect()
    }
}

/// `P(E|H) = 0.9·e`, `P(E|¬H) = 0.1`; returns the posterior
/// `P(E|H)·P(H) / (P(E|H)·P(H) + P(E|¬H)·(1−P(H)))`.
///
/// Guards the degenerate `p_e == 0` case (only reachable when `prior ==
/// 0` and `evidence_strength == 0`) by returning the prior unchanged.
pub fn bayesian_update(prior: f64, evidence_strength: f64) -> f64 {
    let p_e_given_h = 0.9 * evidence_strength;
    let p_e_given_not_h = 0.1;
    let p_e = p_e_given_h * prior + p_e_given_not_h * (1.0 - prior);
    if p_e == 0.0 {
        return prior;
    }
    (p_e_given_h * prior) / p_e
}
