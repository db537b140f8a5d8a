//! Semantic reranker (C9, rerank half): a cross-encoder-free reranker
//! that re-scores the top of a fused list using embedding cosine
//! similarity against the query, blended with the fused score.

use crate::error::Result;
use crate::ports::{EmbeddingProvider, TaskType};
use crate::scoring::cosine_similarity;
use std::sync::Arc;
use uuid::Uuid;

/// Only the top `min(20, fused_size)` candidates are reranked (§4.4).
pub const MAX_RERANK_CANDIDATES: usize = 20;

/// How many of `fused_len` results the reranker should actually look at.
pub fn rerank_window(fused_len: usize) -> usize {
    fused_len.min(MAX_RERANK_CANDIDATES)
}

/// Blend weight for the cosine term in the reranked score (§4.4:
/// `0.7·cosine + 0.3·fused_score`).
const COSINE_WEIGHT: f32 = 0.7;
const FUSED_WEIGHT: f32 = 0.3;

/// A fused-list candidate carrying enough context to be reranked: its id,
/// the content to re-embed, and its fused score.
#[derive(Debug, Clone)]
pub struct RerankCandidate {
    pub id: Uuid,
    pub content: String,
    pub fused_score: f32,
}

pub struct SemanticReranker {
    embeddings: Arc<dyn EmbeddingProvider>,
}

impl SemanticReranker {
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embeddings }
    }

    /// Re-score and re-sort `candidates` (already limited by the caller
    /// to [`rerank_window`] entries) against `query_embedding`.
    pub async fn rerank(
        &self,
        query_embedding: &[f32],
        candidates: Vec<RerankCandidate>,
    ) -> Result<Vec<(Uuid, f32)>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = candidates.iter().map(|c| c.content.clone()).collect();
        let doc_embeddings = self.embeddings.embed_batch(&texts, TaskType::SearchDocument).await?;

        let mut rescored: Vec<(Uuid, f32)> = candidates
            .iter()
            .zip(doc_embeddings.iter())
            .map(|(candidate, doc_embedding)| {
                let cosine = cosine_similarity(query_embedding, doc_embedding);
                let score = COSINE_WEIGHT * cosine + FUSED_WEIGHT * candidate.fused_score;
                (candidate.id, score)
            })
            .collect();

        rescored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(rescored)
    }
}
