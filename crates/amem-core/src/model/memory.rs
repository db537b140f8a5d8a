//! The memory record: the atomic unit the rest of the engine operates on.

use super::value::Metadata;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One of the four cognitive storage classes a memory can occupy.
///
/// `LongTermEpisodic` and `LongTermSemantic` are both "Long-Term" in the
/// retention-policy table (§4.2) but are distinct FSM states, matching the
/// source's `WORKING/EPISODIC/SEMANTIC_PENDING/SEMANTIC/ARCHIVED` split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Layer {
    Sensory,
    Working,
    LongTermEpisodic,
    LongTermSemantic,
    Reflective,
    Archived,
}

impl Layer {
    /// Stable lowercase-with-underscore name, for log lines and arm keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Sensory => "sensory",
            Layer::Working => "working",
            Layer::LongTermEpisodic => "long_term_episodic",
            Layer::LongTermSemantic => "long_term_semantic",
            Layer::Reflective => "reflective",
            Layer::Archived => "archived",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sensory" => Ok(Layer::Sensory),
            "working" => Ok(Layer::Working),
            "long_term_episodic" => Ok(Layer::LongTermEpisodic),
            "long_term_semantic" => Ok(Layer::LongTermSemantic),
            "reflective" => Ok(Layer::Reflective),
            "archived" => Ok(Layer::Archived),
            other => Err(format!("unknown layer: {other}")),
        }
    }
}

/// The kind of derived insight a REFLECTIVE memory represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReflectionType {
    Insight,
    Pattern,
    Contradiction,
    Summary,
}

/// The atomic unit of the engine: a single memory belonging to exactly one
/// `(tenant_id, agent_id)` namespace.
///
/// `#[non_exhaustive]` because fields are expected to grow (the source
/// system's own record has accreted fields over time); callers should build
/// one via [`MemoryRecord::new`] rather than a struct literal.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct MemoryRecord {
    pub id: Uuid,
    pub tenant_id: String,
    pub agent_id: String,
    pub project: Option<String>,
    pub session_id: Option<String>,
    pub content: String,
    pub layer: Layer,
    pub importance: f64,
    pub access_count: u64,
    pub last_accessed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Only meaningful (and only ever set) for `Layer::Sensory`.
    pub expires_at: Option<DateTime<Utc>>,
    pub tags: BTreeSet<String>,
    pub metadata: Metadata,
    /// Populated only on `Layer::Reflective` records; must contain at
    /// least two distinct identifiers once the record is persisted.
    pub source_memory_ids: Vec<Uuid>,
    /// Monotonically increasing, bumped on every mutation. Drives sync's
    /// last-write-wins tiebreak.
    pub version: u64,
    /// Names of embedding models a vector exists for, one entry per
    /// `(memory_id, model_name)` row in the embeddings table.
    pub embedding_models: Vec<String>,
    /// Set only when `layer == Reflective`.
    pub reflection_type: Option<ReflectionType>,
    /// Set only when `layer == Reflective`; confidence in [0, 1].
    pub confidence: Option<f64>,
}

impl MemoryRecord {
    /// Construct a new record at `layer`, clamping `importance` into
    /// `[0, 1]` and stamping `created_at == modified_at == last_accessed_at
    /// == now`. `access_count` starts at zero and `version` at one.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: impl Into<String>,
        agent_id: impl Into<String>,
        content: impl Into<String>,
        layer: Layer,
        importance: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            agent_id: agent_id.into(),
            project: None,
            session_id: None,
            content: content.into(),
            layer,
            importance: importance.clamp(0.0, 1.0),
            access_count: 0,
            last_accessed_at: now,
            created_at: now,
            modified_at: now,
            expires_at: None,
            tags: BTreeSet::new(),
            metadata: Metadata::new(),
            source_memory_ids: Vec::new(),
            version: 1,
            embedding_models: Vec::new(),
            reflection_type: None,
            confidence: None,
        }
    }

    /// Whether this record, if `Sensory` and expired, should be treated as
    /// absent by every read path (§4.2: TTL expiry is idempotent).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.layer, Layer::Sensory)
            && self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Record an access: bumps `access_count` and `last_accessed_at`.
    /// Does NOT bump `version` — importance adjustment on access defaults
    /// to `δ = 0`, and recency-only updates are not considered a mutation
    /// for sync purposes.
    pub fn record_access(&mut self, now: DateTime<Utc>) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed_at = now;
    }

    /// Transition to a new layer, bumping `version` (promotions are
    /// mutations, including Sensory→Working).
    pub fn transition_layer(&mut self, to: Layer, now: DateTime<Utc>) {
        self.layer = to;
        self.modified_at = now;
        self.version += 1;
    }

    /// The tuple eviction ordering sorts ascending by: lower importance
    /// first, then higher access_count first (so `-access_count` sorts
    /// ascending means higher counts come later — i.e. survive), then
    /// older `created_at` first. Returns a key such that sorting ascending
    /// by this key gives the eviction order (first N are evicted).
    pub fn eviction_key(&self) -> (ordered_float::OrderedFloat<f64>, i64, DateTime<Utc>) {
        (
            ordered_float::OrderedFloat(self.importance),
            -(self.access_count as i64),
            self.created_at,
        )
    }
}

mod ordered_float {
    //! Minimal total-order wrapper for `f64` sort keys, avoiding a crate
    //! dependency for a single comparator used by eviction ordering.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct OrderedFloat(pub f64);

    impl Eq for OrderedFloat {}

    impl PartialOrd for OrderedFloat {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for OrderedFloat {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
        }
    }
}

/// Input to `store_memory` (C11's write-path entry point).
///
/// `#[serde(deny_unknown_fields)]` guards against silently dropping a
/// caller's typo'd field.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StoreMemoryInput {
    pub content: String,
    pub layer: Option<Layer>,
    pub tenant_id: String,
    pub agent_id: String,
    pub tags: Vec<String>,
    pub metadata: Metadata,
    pub importance: Option<f64>,
    pub project: Option<String>,
    pub session_id: Option<String>,
}

/// Filters accepted by the metadata-store's `list`/`search` operations
/// (§6 external interfaces).
#[derive(Debug, Clone, Default)]
pub struct MemoryFilters {
    pub agent_id: Option<String>,
    pub layer: Option<Layer>,
    pub project: Option<String>,
    pub session_id: Option<String>,
    pub tags_any_of: Vec<String>,
    pub since: Option<DateTime<Utc>>,
    pub min_importance: Option<f64>,
    pub not_expired: bool,
    pub memory_ids_in: Option<Vec<Uuid>>,
}
