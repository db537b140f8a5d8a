//! Dense vector strategy (§4.3): embed the query with the
//! `search_query:` prefix convention and search the vector store.

use super::{RetrievalStrategy, StrategyResults};
use crate::error::Result;
use crate::model::MemoryFilters;
use crate::ports::{EmbeddingProvider, TaskType, VectorFilters, VectorStore};
use async_trait::async_trait;
use std::sync::Arc;

pub struct DenseVectorStrategy {
    embeddings: Arc<dyn EmbeddingProvider>,
    vectors: Arc<dyn VectorStore>,
}

impl DenseVectorStrategy {
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>, vectors: Arc<dyn VectorStore>) -> Self {
        Self { embeddings, vectors }
    }
}

fn to_vector_filters(filters: &MemoryFilters) -> VectorFilters {
    VectorFilters {
        agent_id: filters.agent_id.clone(),
        layer: filters.layer,
        project: filters.project.clone(),
        tags_any_of: filters.tags_any_of.clone(),
    }
}

#[async_trait]
impl RetrievalStrategy for DenseVectorStrategy {
    fn name(&self) -> &'static str {
        "dense_vector"
    }

    async fn search(
        &self,
        query: &str,
        tenant_id: &str,
        filters: &MemoryFilters,
        limit: usize,
    ) -> Result<StrategyResults> {
        let query_embedding = self.embeddings.embed_text(query, TaskType::SearchQuery).await?;
        let vector_filters = to_vector_filters(filters);
        self.vectors
            .search(&query_embedding, tenant_id, &vector_filters, limit, None, None)
            .await
    }
}
