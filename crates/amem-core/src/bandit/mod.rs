//! Policy Bandit (C10): a contextual multi-armed bandit selecting the
//! fusion-weight arm for each query, with sliding-window drift detection
//! and a heuristic override for obviously-lexical queries.

use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// The three retrieval strategies weights are distributed across.
pub const STRATEGY_FULLTEXT: &str = "fulltext";
pub const STRATEGY_SPARSE_BM25: &str = "sparse_bm25";
pub const STRATEGY_DENSE_VECTOR: &str = "dense_vector";

/// A named fusion-weight profile. Mirrors the source controller's
/// `"relevance_scoring"` / `"importance_scoring"` arms, generalized from
/// two retrieval strategies to our three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightProfile {
    RelevanceScoring,
    ImportanceScoring,
    Balanced,
}

impl WeightProfile {
    const ALL: [WeightProfile; 3] = [
        WeightProfile::RelevanceScoring,
        WeightProfile::ImportanceScoring,
        WeightProfile::Balanced,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            WeightProfile::RelevanceScoring => "relevance_scoring",
            WeightProfile::ImportanceScoring => "importance_scoring",
            WeightProfile::Balanced => "balanced",
        }
    }

    fn raw_weights(&self) -> HashMap<&'static str, f32> {
        match self {
            WeightProfile::RelevanceScoring => HashMap::from([
                (STRATEGY_FULLTEXT, 1.0),
                (STRATEGY_SPARSE_BM25, 1.0),
                (STRATEGY_DENSE_VECTOR, 10.0),
            ]),
            WeightProfile::ImportanceScoring => HashMap::from([
                (STRATEGY_FULLTEXT, 10.0),
                (STRATEGY_SPARSE_BM25, 5.0),
                (STRATEGY_DENSE_VECTOR, 1.0),
            ]),
            WeightProfile::Balanced => HashMap::from([
                (STRATEGY_FULLTEXT, 1.0),
                (STRATEGY_SPARSE_BM25, 1.0),
                (STRATEGY_DENSE_VECTOR, 1.0),
            ]),
        }
    }
}

/// How strongly an arm's profile diverges from balanced weighting. The
/// Cartesian product of [`WeightProfile`] × `OptimizationLevel` forms
/// the bandit's arm set; a level is a blend factor between balanced and
/// profile weights rather than a fixed weighting scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationLevel {
    Conservative,
    Balanced,
    Aggressive,
}

impl OptimizationLevel {
    const ALL: [OptimizationLevel; 3] = [
        OptimizationLevel::Conservative,
        OptimizationLevel::Balanced,
        OptimizationLevel::Aggressive,
    ];

    fn blend_factor(&self) -> f32 {
        match self {
            OptimizationLevel::Conservative => 0.33,
            OptimizationLevel::Balanced => 0.66,
            OptimizationLevel::Aggressive => 1.0,
        }
    }
}

/// Identity of one arm: a `(level, strategy)` pair, per §3's data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArmKey {
    pub level: OptimizationLevel,
    pub profile: WeightProfile,
}

impl ArmKey {
    fn weights(&self) -> HashMap<String, f32> {
        let profile_weights = self.profile.raw_weights();
        let balanced = WeightProfile::Balanced.raw_weights();
        let t = self.level.blend_factor();
        [STRATEGY_FULLTEXT, STRATEGY_SPARSE_BM25, STRATEGY_DENSE_VECTOR]
            .into_iter()
            .map(|name| {
                let b = balanced[name];
                let p = profile_weights[name];
                (name.to_string(), b + (p - b) * t)
            })
            .collect()
    }
}

/// Internal mutable state of one arm, updated atomically as a unit.
struct ArmState {
    window: VecDeque<f64>,
    total_pulls: u64,
}

impl ArmState {
    fn new() -> Self {
        Self {
            window: VecDeque::new(),
            total_pulls: 0,
        }
    }

    fn record(&mut self, reward: f64, window_size: usize) {
        self.total_pulls += 1;
        self.window.push_back(reward);
        while self.window.len() > window_size {
            self.window.pop_front();
        }
    }

    fn mean_reward(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.window.iter().sum::<f64>() / self.window.len() as f64
        }
    }

    fn reset_window(&mut self) {
        self.window.clear();
    }
}

/// Tunables for arm selection and drift detection (§4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BanditConfig {
    pub epsilon: f64,
    pub ucb_c: f64,
    pub window_size: usize,
    pub drift_check_interval: u64,
    pub drift_drop_threshold: f64,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            ucb_c: std::f64::consts::SQRT_2,
            window_size: 100,
            drift_check_interval: 20,
            drift_drop_threshold: 0.5,
        }
    }
}

/// The outcome of one arm-selection call, including the fusion weights to
/// use and whether a rule fired instead of the learned policy. The
/// heuristic override "MUST be documented in the returned trace" (§4.4);
/// `heuristic_override` is that documentation.
#[derive(Debug, Clone)]
pub struct BanditDecision {
    pub arm: ArmKey,
    pub weights: HashMap<String, f32>,
    pub was_exploration: bool,
    pub heuristic_override: bool,
}

const QUESTION_KEYWORDS: [&str; 8] = ["what", "who", "when", "id", "code", "err", "how", "which"];
const QUESTION_TOKEN_THRESHOLD: usize = 10;

fn heuristic_override_weights(query: &str) -> Option<HashMap<String, f32>> {
    let lower = query.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let is_question = QUESTION_KEYWORDS.iter().any(|kw| tokens.contains(kw));
    if is_question || tokens.len() > QUESTION_TOKEN_THRESHOLD {
        Some(HashMap::from([
            (STRATEGY_FULLTEXT.to_string(), 20.0),
            (STRATEGY_SPARSE_BM25.to_string(), 20.0),
            (STRATEGY_DENSE_VECTOR.to_string(), 1.0),
        ]))
    } else {
        None
    }
}

/// Contextual multi-armed bandit over the `WeightProfile × OptimizationLevel`
/// arm set. One instance lives per engine; arms persist for the engine's
/// lifetime (§3: "never destroyed; its window may be reset on drift
/// detection").
pub struct PolicyBandit {
    arms: DashMap<ArmKey, Mutex<ArmState>>,
    config: BanditConfig,
    global_rewards: Mutex<VecDeque<f64>>,
    baseline: Mutex<Option<f64>>,
    updates_since_check: AtomicU64,
}

impl PolicyBandit {
    pub fn new(config: BanditConfig) -> Self {
        let arms = DashMap::new();
        for level in OptimizationLevel::ALL {
            for profile in WeightProfile::ALL {
                arms.insert(ArmKey { level, profile }, Mutex::new(ArmState::new()));
            }
        }
        Self {
            arms,
            config,
            global_rewards: Mutex::new(VecDeque::new()),
            baseline: Mutex::new(None),
            updates_since_check: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &BanditConfig {
        &self.config
    }

    /// Number of arms in the Cartesian product.
    pub fn arm_count(&self) -> usize {
        self.arms.len()
    }

    /// Select fusion weights for `query`. If the heuristic fires, the
    /// bandit is bypassed entirely — no arm is pulled, and the decision
    /// records `heuristic_override = true`.
    pub fn select(&self, query: &str) -> BanditDecision {
        if let Some(weights) = heuristic_override_weights(query) {
            // Heuristic override still needs *an* arm identity to report
            // for tracing purposes; pick the nearest named profile.
            return BanditDecision {
                arm: ArmKey {
                    level: OptimizationLevel::Aggressive,
                    profile: WeightProfile::ImportanceScoring,
                },
                weights,
                was_exploration: false,
                heuristic_override: true,
            };
        }

        let total_pulls: u64 = self.arms.iter().map(|e| e.value().lock().unwrap().total_pulls).sum();

        let mut rng = rand::thread_rng();
        let explore = rand::Rng::gen_bool(&mut rng, self.config.epsilon);

        let chosen = if explore {
            let idx = rand::Rng::gen_range(&mut rng, 0..self.arms.len());
            self.arms.iter().nth(idx).map(|e| *e.key()).unwrap()
        } else {
            self.arms
                .iter()
                .map(|entry| {
                    let state = entry.value().lock().unwrap();
                    let bonus = if state.total_pulls == 0 {
                        f64::INFINITY
                    } else if total_pulls == 0 {
                        0.0
                    } else {
                        self.config.ucb_c * ((total_pulls as f64).ln() / state.total_pulls as f64).sqrt()
                    };
                    (*entry.key(), state.mean_reward() + bonus)
                })
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(arm, _)| arm)
                .expect("arm set is never empty")
        };

        BanditDecision {
            arm: chosen,
            weights: chosen.weights(),
            was_exploration: explore,
            heuristic_override: false,
        }
    }

    /// Record a reward for `arm` (no-op if the last decision bypassed the
    /// bandit via the heuristic override — callers should only call this
    /// when `BanditDecision::heuristic_override` was `false`).
    pub fn update(&self, arm: ArmKey, reward: f64) {
        if let Some(state) = self.arms.get(&arm) {
            state.lock().unwrap().record(reward, self.config.window_size);
        }

        {
            let mut global = self.global_rewards.lock().unwrap();
            global.push_back(reward);
            while global.len() > self.config.window_size {
                global.pop_front();
            }
        }

        let count = self.updates_since_check.fetch_add(1, Ordering::SeqCst) + 1;
        if count % self.config.drift_check_interval == 0 {
            self.check_drift();
        }
    }

    fn check_drift(&self) {
        let current_mean = {
            let global = self.global_rewards.lock().unwrap();
            if global.is_empty() {
                return;
            }
            global.iter().sum::<f64>() / global.len() as f64
        };

        let mut baseline = self.baseline.lock().unwrap();
        match *baseline {
            None => *baseline = Some(current_mean),
            Some(prev) if prev > 0.0 => {
                let drop = (prev - current_mean) / prev;
                if drop > self.config.drift_drop_threshold {
                    tracing::warn!(previous_baseline = prev, current_mean, "bandit drift detected, resetting arms");
                    for entry in self.arms.iter() {
                        entry.value().lock().unwrap().reset_window();
                    }
                    *baseline = Some(current_mean);
                }
            }
            Some(_) => *baseline = Some(current_mean),
        }
    }

    /// Current mean reward for `arm`'s window, for diagnostics/tests.
    pub fn mean_reward(&self, arm: ArmKey) -> f64 {
        self.arms
            .get(&arm)
            .map(|s| s.lock().unwrap().mean_reward())
            .unwrap_or(0.0)
    }
}
