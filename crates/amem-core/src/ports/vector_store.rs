//! Vector-store port (C5): the contract over dense-vector ANN search.

use crate::error::Result;
use crate::model::{Layer, Metadata};
use async_trait::async_trait;
use uuid::Uuid;

/// Metadata filters a vector search may apply, mirroring the payload the
/// persisted-state layout stores alongside each point (§6:
/// `{tenant_id, agent_id, layer, project, tags}`).
#[derive(Debug, Clone, Default)]
pub struct VectorFilters {
    pub agent_id: Option<String>,
    pub layer: Option<Layer>,
    pub project: Option<String>,
    pub tags_any_of: Vec<String>,
}

/// One item in a `batch_store` call.
#[derive(Debug, Clone)]
pub struct VectorItem {
    pub id: Uuid,
    pub embedding: Vec<f32>,
    pub tenant_id: String,
    pub metadata: Option<Metadata>,
}

/// Contract over dense-vector ANN search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upsert a single vector.
    async fn store_vector(
        &self,
        id: Uuid,
        embedding: Vec<f32>,
        tenant_id: &str,
        metadata: Option<Metadata>,
    ) -> Result<()>;

    /// Upsert many vectors in one call.
    async fn batch_store(&self, items: Vec<VectorItem>) -> Result<()>;

    /// ANN search, returning `(id, cosine_score)` pairs.
    #[allow(clippy::too_many_arguments)]
    async fn search(
        &self,
        query_embedding: &[f32],
        tenant_id: &str,
        filters: &VectorFilters,
        limit: usize,
        score_threshold: Option<f32>,
        vector_name: Option<&str>,
    ) -> Result<Vec<(Uuid, f32)>>;

    /// Like `search`, but multiplies a candidate's score by
    /// `penalty_factor` when its stored vector's dot product with the
    /// query falls below `contradiction_threshold` — used to down-rank
    /// memories that directly contradict the query's intent.
    #[allow(clippy::too_many_arguments)]
    async fn search_with_contradiction_penalty(
        &self,
        query_embedding: &[f32],
        tenant_id: &str,
        filters: &VectorFilters,
        limit: usize,
        contradiction_threshold: f32,
        penalty_factor: f32,
    ) -> Result<Vec<(Uuid, f32)>>;

    /// Fetch a single stored vector, if present.
    async fn get_vector(&self, id: Uuid, tenant_id: &str) -> Result<Option<Vec<f32>>>;

    /// Delete a single vector.
    async fn delete_vector(&self, id: Uuid, tenant_id: &str) -> Result<()>;

    /// Delete every vector belonging to `layer` for `tenant_id`; returns
    /// the count deleted.
    async fn delete_by_layer(&self, tenant_id: &str, layer: Layer) -> Result<u64>;

    /// Count vectors stored for `tenant_id`.
    async fn count_vectors(&self, tenant_id: &str) -> Result<u64>;

    /// Paginated id listing, used by the Consistency Reconciler (C14) to
    /// walk the store in bounded-size pages.
    async fn list_ids(&self, tenant_id: &str, page: usize, page_size: usize) -> Result<Vec<Uuid>>;
}
