//! Metadata-store port (C4): the contract over metadata persistence and
//! lexical search. Every operation is tenant-scoped — implementations MUST
//! only ever return rows whose `tenant_id` matches the one passed in.

use crate::error::Result;
use crate::model::{Layer, MemoryFilters, MemoryRecord, Metadata};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Partial update applied via `update`. Every field left `None` is
/// untouched; `Some` fields overwrite.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatch {
    pub content: Option<String>,
    pub importance: Option<f64>,
    pub tags: Option<std::collections::BTreeSet<String>>,
    pub metadata: Option<Metadata>,
    pub layer: Option<Layer>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

/// Comparison operator for a bulk-delete predicate over a metadata field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    LessThan,
    Equal,
}

/// Bulk-delete selector: either an importance threshold or a metadata
/// field comparison, per §6 ("`importance < T`, or metadata-field
/// comparisons `<`, `=`").
#[derive(Debug, Clone)]
pub enum DeletePredicate {
    ImportanceCompare { op: CompareOp, value: f64 },
    MetadataField { key: String, op: CompareOp, value: crate::model::Value },
}

/// Field an aggregate operates over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateField {
    Importance,
    AccessCount,
}

/// Aggregation function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateOp {
    Sum,
    Avg,
    Max,
    Min,
}

/// Contract over metadata persistence and lexical (full-text) search.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert or fully overwrite a record.
    async fn store(&self, record: MemoryRecord) -> Result<()>;

    /// Fetch a single record by id, scoped to `tenant_id`.
    async fn fetch(&self, tenant_id: &str, id: Uuid) -> Result<Option<MemoryRecord>>;

    /// List records matching `filters`.
    async fn list(&self, tenant_id: &str, filters: &MemoryFilters) -> Result<Vec<MemoryRecord>>;

    /// Full-text / lexical search against content, returning raw
    /// (implementation-defined, monotone-in-match-quality) scores.
    async fn search(
        &self,
        tenant_id: &str,
        query: &str,
        filters: &MemoryFilters,
        limit: usize,
    ) -> Result<Vec<(MemoryRecord, f32)>>;

    /// Apply a partial update, returning the updated record. Implementors
    /// MUST bump `version` and `modified_at`.
    async fn update(&self, tenant_id: &str, id: Uuid, patch: MemoryPatch) -> Result<MemoryRecord>;

    /// Delete a single record.
    async fn delete(&self, tenant_id: &str, id: Uuid) -> Result<()>;

    /// Delete every record matching `predicate`; returns the count deleted.
    async fn bulk_delete(&self, tenant_id: &str, predicate: DeletePredicate) -> Result<u64>;

    /// Count records matching `filters`.
    async fn count(&self, tenant_id: &str, filters: &MemoryFilters) -> Result<u64>;

    /// Aggregate `field` over records matching `filters`.
    async fn aggregate(
        &self,
        tenant_id: &str,
        field: AggregateField,
        op: AggregateOp,
        filters: &MemoryFilters,
    ) -> Result<f64>;

    /// Set (or clear, via `None`) a record's expiry instant.
    async fn set_expiry(&self, tenant_id: &str, id: Uuid, expires_at: Option<DateTime<Utc>>) -> Result<()>;

    /// Bump `access_count`/`last_accessed_at` for a batch of ids in one
    /// call, without bumping `version` (see [`MemoryRecord::record_access`]).
    async fn batch_touch_access(&self, tenant_id: &str, ids: &[Uuid], now: DateTime<Utc>) -> Result<()>;
}
