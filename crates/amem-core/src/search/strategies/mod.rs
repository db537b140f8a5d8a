//! Retrieval Strategies (C8): pluggable search producers.
//!
//! Each strategy is `(query, tenant, filters, limit) -> ordered list of
//! (memory_id, raw_score)`. Strategies run in parallel from the Retrieval
//! Engine (C11); a strategy that errors is logged and treated as an empty
//! result, never propagated (§4.3).

mod bm25;
mod dense;
mod fulltext;

pub use bm25::{Bm25Config, SparseBm25Strategy};
pub use dense::DenseVectorStrategy;
pub use fulltext::FullTextStrategy;

use crate::error::Result;
use crate::model::MemoryFilters;
use async_trait::async_trait;
use uuid::Uuid;

/// A single strategy's raw output: an ordered list of `(memory_id,
/// raw_score)`, highest-scoring first.
pub type StrategyResults = Vec<(Uuid, f32)>;

/// A pluggable retrieval strategy.
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// Stable name used as the fusion/bandit arm key (e.g. `"fulltext"`,
    /// `"sparse_bm25"`, `"dense_vector"`).
    fn name(&self) -> &'static str;

    /// Run the strategy. Implementations should return
    /// `Ok(vec![])` rather than propagate on recoverable failures where
    /// possible; the engine treats any `Err` the same way (empty, logged).
    async fn search(
        &self,
        query: &str,
        tenant_id: &str,
        filters: &MemoryFilters,
        limit: usize,
    ) -> Result<StrategyResults>;
}

/// Run `strategy`, logging and degrading to an empty list on error — the
/// uniform failure policy of §4.3 ("a failed strategy yields an empty
/// list (logged), never propagates").
pub async fn run_strategy_safely(
    strategy: &dyn RetrievalStrategy,
    query: &str,
    tenant_id: &str,
    filters: &MemoryFilters,
    limit: usize,
) -> StrategyResults {
    match strategy.search(query, tenant_id, filters, limit).await {
        Ok(results) => results,
        Err(err) => {
            tracing::warn!(strategy = strategy.name(), error = %err, "retrieval strategy failed, degrading to empty");
            Vec::new()
        }
    }
}
