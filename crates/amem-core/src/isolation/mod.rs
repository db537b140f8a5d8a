//! Tenant Isolation Guard (C3).
//!
//! A defensive post-filter: every retrieval result passes through here
//! before it reaches a caller, independent of whatever filtering the
//! metadata/vector store adapters already did. It is not a substitute for
//! adapter-level filters — both layers must hold (§4.6).

use crate::model::MemoryRecord;
use std::sync::atomic::{AtomicU64, Ordering};

/// The ownership keys a caller expects every result to match.
/// `tenant_id` is mandatory; the rest are optional and only checked when
/// the caller supplied them.
#[derive(Debug, Clone)]
pub struct IsolationContext {
    pub tenant_id: String,
    pub agent_id: Option<String>,
    pub session_id: Option<String>,
    pub project: Option<String>,
}

impl IsolationContext {
    /// Build a context that only checks tenant ownership.
    pub fn tenant_only(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            agent_id: None,
            session_id: None,
            project: None,
        }
    }

    fn matches(&self, record: &MemoryRecord) -> Result<(), &'static str> {
        if record.tenant_id != self.tenant_id {
            return Err("tenant_id");
        }
        if let Some(expected) = &self.agent_id {
            if &record.agent_id != expected {
                return Err("agent_id");
            }
        }
        if let Some(expected) = &self.session_id {
            if record.session_id.as_deref() != Some(expected.as_str()) {
                return Err("session_id");
            }
        }
        if let Some(expected) = &self.project {
            if record.project.as_deref() != Some(expected.as_str()) {
                return Err("project");
            }
        }
        Ok(())
    }
}

/// A point-in-time snapshot of the guard's counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsolationStats {
    pub leak_count: u64,
    pub validation_count: u64,
    pub leak_rate: f64,
}

/// Post-retrieval filter enforcing `{tenant, agent, session, project}`
/// equality. Holds running counters across its lifetime (an engine
/// instance owns exactly one).
#[derive(Debug)]
pub struct IsolationGuard {
    strict_mode: bool,
    leak_count: AtomicU64,
    validation_count: AtomicU64,
}

impl Default for IsolationGuard {
    fn default() -> Self {
        Self::new(true)
    }
}

impl IsolationGuard {
    /// `strict_mode` governs only whether a leak is additionally logged
    /// via `tracing::warn!`; leaks are always dropped and counted
    /// regardless of this flag.
    pub fn new(strict_mode: bool) -> Self {
        Self {
            strict_mode,
            leak_count: AtomicU64::new(0),
            validation_count: AtomicU64::new(0),
        }
    }

    /// Filter a batch of candidates, keeping only those matching `ctx`.
    pub fn validate_search_results<T>(
        &self,
        results: Vec<(MemoryRecord, T)>,
        ctx: &IsolationContext,
    ) -> Vec<(MemoryRecord, T)> {
        let mut kept = Vec::with_capacity(results.len());
        let mut leaks_this_call = 0u64;

        for (record, payload) in results {
            self.validation_count.fetch_add(1, Ordering::Relaxed);
            match ctx.matches(&record) {
                Ok(()) => kept.push((record, payload)),
                Err(field) => {
                    self.leak_count.fetch_add(1, Ordering::Relaxed);
                    leaks_this_call += 1;
                    if self.strict_mode {
                        tracing::warn!(
                            field,
                            memory_id = %record.id,
                            "isolation guard dropped leaked memory"
                        );
                    }
                }
            }
        }

        if leaks_this_call > 0 {
            tracing::warn!(
                leaks = leaks_this_call,
                tenant_id = %ctx.tenant_id,
                "isolation guard filtered leaked results from this batch"
            );
        }

        kept
    }

    /// Single-memory convenience wrapper, used by `get_memory` so a lone
    /// fetch is subject to the same check as a search.
    pub fn validate_single_memory(
        &self,
        record: MemoryRecord,
        ctx: &IsolationContext,
    ) -> Option<MemoryRecord> {
        self.validation_count.fetch_add(1, Ordering::Relaxed);
        match ctx.matches(&record) {
            Ok(()) => Some(record),
            Err(field) => {
                self.leak_count.fetch_add(1, Ordering::Relaxed);
                if self.strict_mode {
                    tracing::warn!(field, memory_id = %record.id, "isolation guard dropped leaked memory");
                }
                None
            }
        }
    }

    /// Current counters.
    pub fn stats(&self) -> IsolationStats {
        let leak_count = self.leak_count.load(Ordering::Relaxed);
        let validation_count = self.validation_count.load(Ordering::Relaxed);
        let leak_rate = if validation_count == 0 {
            0.0
        } else {
            leak_count as f64 / validation_count as f64
        };
        IsolationStats {
            leak_count,
            validation_count,
            leak_rate,
        }
    }

    /// Reset both counters to zero.
    pub fn reset_stats(&self) {
        self.leak_count.store(0, Ordering::Relaxed);
        self.validation_count.store(0, Ordering::Relaxed);
    }
}
