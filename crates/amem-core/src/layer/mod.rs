//! Layer Manager (C6): per-layer capacity, TTL, and eviction policy.
//!
//! State *transitions* (the FSM proper) live in [`crate::consolidation`];
//! this module only answers "does this layer have room, and if not, what
//! gets evicted".

use crate::error::{AmemError, Result};
use crate::model::{Layer, MemoryRecord};
use uuid::Uuid;

/// Per-layer tunables. `None` capacity means unbounded (Long-Term and
/// Archived are "large (10^5+)" per §4.2's retention table and carry no
/// hard cap here).
#[derive(Debug, Clone)]
pub struct LayerManagerConfig {
    pub sensory_capacity: Option<usize>,
    pub sensory_default_ttl_seconds: i64,
    pub working_capacity: Option<usize>,
    pub reflective_capacity: Option<usize>,
}

impl Default for LayerManagerConfig {
    fn default() -> Self {
        Self {
            sensory_capacity: Some(200),
            sensory_default_ttl_seconds: 300,
            working_capacity: Some(1000),
            reflective_capacity: Some(1000),
        }
    }
}

impl LayerManagerConfig {
    fn capacity_for(&self, layer: Layer) -> Option<usize> {
        match layer {
            Layer::Sensory => self.sensory_capacity,
            Layer::Working => self.working_capacity,
            Layer::Reflective => self.reflective_capacity,
            Layer::LongTermEpisodic | Layer::LongTermSemantic | Layer::Archived => None,
        }
    }
}

/// Enforces capacity and selects eviction candidates for the four layers.
#[derive(Debug, Clone, Default)]
pub struct LayerManager {
    config: LayerManagerConfig,
}

impl LayerManager {
    pub fn new(config: LayerManagerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayerManagerConfig {
        &self.config
    }

    /// Called before a write lands in `layer`, given the layer's current
    /// occupancy. A capacity of `0` always refuses with
    /// `RESOURCE_EXHAUSTED` (§8 boundary behavior); otherwise, if the
    /// layer is at or over capacity, the caller MUST evict first — this
    /// returns `Err` only when there is no way to make room (capacity 0).
    pub fn check_write_allowed(&self, layer: Layer, current_count: usize) -> Result<()> {
        match self.config.capacity_for(layer) {
            Some(0) => Err(AmemError::ResourceExhausted(format!(
                "{layer} layer has zero capacity"
            ))),
            _ => {
                let _ = current_count;
                Ok(())
            }
        }
    }

    /// Given the full set of records currently in `layer`, and one
    /// about-to-be-added record, return the ids that must be evicted to
    /// stay within capacity (possibly empty). Selection follows §4.2's
    /// eviction ordering: minimize `(importance, -access_count,
    /// created_at)` lexicographically — i.e. least important, least
    /// accessed, oldest memories go first.
    pub fn eviction_candidates(&self, layer: Layer, existing: &[MemoryRecord]) -> Vec<Uuid> {
        let Some(capacity) = self.config.capacity_for(layer) else {
            return Vec::new();
        };
        let projected = existing.len() + 1;
        if projected <= capacity {
            return Vec::new();
        }
        let overflow = projected - capacity;
        let mut sorted: Vec<&MemoryRecord> = existing.iter().collect();
        sorted.sort_by_key(|r| r.eviction_key());
        sorted.into_iter().take(overflow).map(|r| r.id).collect()
    }

    /// Whether `record` (known to be in Sensory) has expired as of `now`.
    /// A SENSORY record MUST have `expires_at` set (§3 invariant); this
    /// defaults the TTL from config if the caller never set one.
    pub fn sensory_ttl_seconds(&self) -> i64 {
        self.config.sensory_default_ttl_seconds
    }
}
