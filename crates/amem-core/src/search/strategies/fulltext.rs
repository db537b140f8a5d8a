//! Full-text strategy: delegates to the metadata store's own lexical
//! search, per §4.3 ("score is implementation-defined but MUST be
//! monotone in match quality").

use super::{RetrievalStrategy, StrategyResults};
use crate::error::Result;
use crate::model::MemoryFilters;
use crate::ports::MetadataStore;
use async_trait::async_trait;
use std::sync::Arc;

pub struct FullTextStrategy {
    store: Arc<dyn MetadataStore>,
}

impl FullTextStrategy {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RetrievalStrategy for FullTextStrategy {
    fn name(&self) -> &'static str {
        "fulltext"
    }

    async fn search(
        &self,
        query: &str,
        tenant_id: &str,
        filters: &MemoryFilters,
        limit: usize,
    ) -> Result<StrategyResults> {
        let rows = self.store.search(tenant_id, query, filters, limit).await?;
        Ok(rows.into_iter().map(|(record, score)| (record.id, score)).collect())
    }
}
