//! Test data factory: builders for realistic [`MemoryRecord`]s, plus a few
//! pre-built scenarios mirroring the end-to-end test plan's literal cases.

use amem_core::model::{Layer, MemoryRecord};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Factory for building [`MemoryRecord`] fixtures with sensible defaults,
/// so a scenario test states only the fields it actually cares about.
pub struct TestDataFactory;

/// Configuration for batch memory generation.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub count: usize,
    pub tenant_id: String,
    pub agent_id: String,
    pub content_prefix: String,
    pub layer: Layer,
    pub importance: f64,
    pub tags: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 10,
            tenant_id: "tenant-a".to_string(),
            agent_id: "agent-a".to_string(),
            content_prefix: "fixture memory".to_string(),
            layer: Layer::Working,
            importance: 0.5,
            tags: Vec::new(),
        }
    }
}

/// A named group of related memories, for scenarios that need to hand a
/// test several ids at once along with what each one represents.
#[derive(Debug)]
pub struct TestScenario {
    pub memories: Vec<MemoryRecord>,
    pub description: String,
}

impl TestScenario {
    pub fn ids(&self) -> Vec<Uuid> {
        self.memories.iter().map(|m| m.id).collect()
    }
}

impl TestDataFactory {
    /// A bare memory with default importance, no tags.
    pub fn memory(tenant_id: &str, agent_id: &str, content: &str, layer: Layer, now: DateTime<Utc>) -> MemoryRecord {
        MemoryRecord::new(tenant_id, agent_id, content, layer, 0.5, now)
    }

    /// A memory with explicit importance and tags.
    pub fn memory_with_tags(
        tenant_id: &str,
        agent_id: &str,
        content: &str,
        layer: Layer,
        importance: f64,
        tags: &[&str],
        now: DateTime<Utc>,
    ) -> MemoryRecord {
        let mut record = MemoryRecord::new(tenant_id, agent_id, content, layer, importance, now);
        record.tags = tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>();
        record
    }

    /// Apply `access_count` accesses spaced `gap` apart, starting at
    /// `record.last_accessed_at`. Returns the timestamp of the final access.
    pub fn apply_accesses(record: &mut MemoryRecord, count: u64, gap: Duration) -> DateTime<Utc> {
        let mut at = record.last_accessed_at;
        for _ in 0..count {
            at += gap;
            record.record_access(at);
        }
        at
    }

    /// A batch of otherwise-identical memories, content-suffixed by index.
    pub fn batch(config: &BatchConfig, now: DateTime<Utc>) -> Vec<MemoryRecord> {
        (0..config.count)
            .map(|i| {
                let mut record = MemoryRecord::new(
                    config.tenant_id.clone(),
                    config.agent_id.clone(),
                    format!("{} {i}", config.content_prefix),
                    config.layer,
                    config.importance,
                    now,
                );
                record.tags = config.tags.iter().cloned().collect();
                record
            })
            .collect()
    }

    /// Two memories differing only in access history: one untouched
    /// (recency should have decayed to ~0.5 after `half_life_seconds`),
    /// one accessed 100 times (recency should be close to 1.0 regardless
    /// of elapsed time, per the access-count decay modulation).
    pub fn decay_scenario(now: DateTime<Utc>) -> TestScenario {
        let untouched = MemoryRecord::new("tenant-a", "agent-a", "rarely revisited note", Layer::LongTermSemantic, 0.5, now);
        let mut frequently_accessed =
            MemoryRecord::new("tenant-a", "agent-a", "constantly revisited note", Layer::LongTermSemantic, 0.5, now);
        Self::apply_accesses(&mut frequently_accessed, 100, Duration::seconds(1));
        TestScenario {
            memories: vec![untouched, frequently_accessed],
            description: "one untouched memory and one accessed 100 times, same age".to_string(),
        }
    }

    /// A working-layer memory that already satisfies every
    /// working-to-episodic promotion threshold (access_count >= 2,
    /// importance >= 0.6, age >= 600s) as of `evaluated_at`.
    pub fn promotion_ready_working_memory(now: DateTime<Utc>, evaluated_at: DateTime<Utc>) -> MemoryRecord {
        let mut record = MemoryRecord::new("tenant-a", "agent-a", "a note worth remembering", Layer::Working, 0.7, now);
        record.record_access(now + Duration::minutes(1));
        record.record_access(now + Duration::minutes(2));
        let _ = evaluated_at;
        record
    }

    /// Two memories for the same tenant under different agents, for
    /// isolation-guard leak scenarios: `owner_agent` should see both,
    /// `other_agent` should see neither of `other_agent`'s memories.
    pub fn cross_agent_pair(tenant_id: &str, owner_agent: &str, other_agent: &str, now: DateTime<Utc>) -> (MemoryRecord, MemoryRecord) {
        (
            MemoryRecord::new(tenant_id, owner_agent, "owner's private note", Layer::Working, 0.6, now),
            MemoryRecord::new(tenant_id, other_agent, "other agent's private note", Layer::Working, 0.6, now),
        )
    }
}
