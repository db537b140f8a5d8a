//! Retrieval Engine (C11): orchestrates C4–C10 per query, applies the
//! Isolation Guard, and owns the write path's first half (C2 importance,
//! C6 placement, C4 persistence — embedding generation and C5 persistence
//! are the caller's job, since concrete embedding backends are out of
//! scope here).

use crate::bandit::{BanditConfig, BanditDecision, PolicyBandit};
use crate::clock::Clock;
use crate::consolidation::ConsolidationFsm;
use crate::error::{AmemError, Result};
use crate::isolation::{IsolationContext, IsolationGuard};
use crate::layer::LayerManager;
use crate::model::{Layer, MemoryFilters, MemoryRecord, StoreMemoryInput};
use crate::ports::{Cache, EmbeddingProvider, MetadataStore, TaskType, VectorStore};
use crate::retry::{with_backoff, BackoffConfig};
use crate::scoring::{score_memory, DecayConfig, MemoryScoreResult, ScoringWeights};
use crate::search::rerank::{rerank_window, RerankCandidate, SemanticReranker};
use crate::search::strategies::{run_strategy_safely, RetrievalStrategy, StrategyResults};
use crate::search::{max_fusion, reciprocal_rank_fusion, weighted_sum_fusion, StrategyOutput, DEFAULT_RRF_K};
use chrono::Utc;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Which of §4.4's fusion algorithms the engine uses to combine strategy
/// outputs before reranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionMethod {
    WeightedSum,
    ReciprocalRank,
    Max,
}

/// Tunables for the engine's orchestration, distinct from any one
/// component's own config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub strategy_timeout_seconds: u64,
    pub cache_ttl_seconds: u64,
    pub rrf_k: f32,
    pub fusion_method: FusionMethod,
    pub default_importance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy_timeout_seconds: 2,
            cache_ttl_seconds: 300,
            rrf_k: DEFAULT_RRF_K,
            fusion_method: FusionMethod::WeightedSum,
            default_importance: 0.5,
        }
    }
}

/// One ranked result: the full record plus the score it was ranked by and
/// (for callers building explainable-ranking UIs) the scoring-kernel
/// breakdown of that score.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
    pub memory: MemoryRecord,
    pub score: f32,
    pub explain: MemoryScoreResult,
}

/// A completed `search` call: the ranked hits plus the bandit's decision
/// trace, so a caller can later call `record_feedback` against the exact
/// arm that produced this ranking.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub decision: BanditDecision,
}

/// `get_status()`'s return shape (§6, administrative port): a snapshot of
/// the engine's own health indicators, not tenant data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineStatus {
    pub isolation: crate::isolation::IsolationStats,
    pub bandit_arm_count: usize,
    pub strategy_count: usize,
    pub embedding_provider_configured: bool,
}

fn cache_key(query: &str, ctx: &IsolationContext, filters: &MemoryFilters, limit: usize) -> String {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    ctx.tenant_id.hash(&mut hasher);
    ctx.agent_id.hash(&mut hasher);
    ctx.session_id.hash(&mut hasher);
    ctx.project.hash(&mut hasher);
    filters.agent_id.hash(&mut hasher);
    filters.project.hash(&mut hasher);
    filters.session_id.hash(&mut hasher);
    filters.tags_any_of.hash(&mut hasher);
    limit.hash(&mut hasher);
    format!("search:{:x}", hasher.finish())
}

/// Orchestrates the hybrid retrieval pipeline and the write-path entry
/// point. One instance per tenant-serving process; ports are
/// constructor-injected (§9: explicit DI, no module-level singletons).
pub struct RetrievalEngine {
    metadata: Arc<dyn MetadataStore>,
    vectors: Arc<dyn VectorStore>,
    embeddings: Option<Arc<dyn EmbeddingProvider>>,
    cache: Arc<dyn Cache>,
    clock: Arc<dyn Clock>,
    strategies: Vec<Arc<dyn RetrievalStrategy>>,
    bandit: PolicyBandit,
    isolation: IsolationGuard,
    layers: LayerManager,
    consolidation: ConsolidationFsm,
    scoring_weights: ScoringWeights,
    decay: DecayConfig,
    config: EngineConfig,
}

impl RetrievalEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        vectors: Arc<dyn VectorStore>,
        embeddings: Option<Arc<dyn EmbeddingProvider>>,
        cache: Arc<dyn Cache>,
        clock: Arc<dyn Clock>,
        strategies: Vec<Arc<dyn RetrievalStrategy>>,
        bandit_config: BanditConfig,
        isolation: IsolationGuard,
        layers: LayerManager,
        consolidation: ConsolidationFsm,
        scoring_weights: ScoringWeights,
        decay: DecayConfig,
        config: EngineConfig,
    ) -> Self {
        scoring_weights.validate();
        Self {
            metadata,
            vectors,
            embeddings,
            cache,
            clock,
            strategies,
            bandit: PolicyBandit::new(bandit_config),
            isolation,
            layers,
            consolidation,
            scoring_weights,
            decay,
            config,
        }
    }

    pub fn isolation_stats(&self) -> crate::isolation::IsolationStats {
        self.isolation.stats()
    }

    /// `get_memory(memory_id, tenant_id)` (§6): fetch a single record,
    /// scoped to `tenant_id` by the store and re-checked by the isolation
    /// guard before it reaches the caller.
    pub async fn get_memory(&self, memory_id: Uuid, tenant_id: &str) -> Result<Option<MemoryRecord>> {
        let fetched = with_backoff(BackoffConfig::default(), || self.metadata.fetch(tenant_id, memory_id)).await?;
        let Some(record) = fetched else {
            return Ok(None);
        };
        if record.is_expired(self.clock.now()) {
            self.metadata.delete(tenant_id, memory_id).await?;
            return Ok(None);
        }
        let ctx = IsolationContext::tenant_only(tenant_id);
        Ok(self.isolation.validate_single_memory(record, &ctx))
    }

    /// `get_status()` (§6, administrative): a point-in-time snapshot of
    /// the engine's own health indicators, independent of any one
    /// tenant's data. Does not reach into the metadata/vector stores —
    /// those have their own counts via `count`/`count_vectors`.
    pub fn get_status(&self) -> EngineStatus {
        EngineStatus {
            isolation: self.isolation.stats(),
            bandit_arm_count: self.bandit.arm_count(),
            strategy_count: self.strategies.len(),
            embedding_provider_configured: self.embeddings.is_some(),
        }
    }

    /// The retrieval pipeline described in §4.5, steps 1–8. Step 9
    /// (feedback) is [`Self::record_feedback`], called by the caller
    /// out-of-band once a reward signal is known.
    pub async fn search(
        &self,
        query: &str,
        ctx: IsolationContext,
        filters: MemoryFilters,
        limit: usize,
    ) -> Result<SearchResponse> {
        let key = cache_key(query, &ctx, &filters, limit);
        if let Some(cached) = self.cache.get(&key).await? {
            if let Ok(hits) = serde_json::from_slice::<Vec<SearchHit>>(&cached) {
                let decision = self.bandit.select(query);
                return Ok(SearchResponse { hits, decision });
            }
        }

        let decision = self.bandit.select(query);

        // §4.4: each strategy returns up to `5 * limit` candidates.
        let fan_out_limit = limit.saturating_mul(5);
        let timeout = std::time::Duration::from_secs(self.config.strategy_timeout_seconds);

        // Fan out in parallel (§4.5 step 3, §5 "no ordering between
        // strategies"): every strategy is spawned as its own task so a slow
        // backend's timeout doesn't serialize behind the others, then
        // joined back in the original strategy order so fusion stays
        // deterministic regardless of which task actually finished first.
        let query_owned = query.to_string();
        let tenant_id = ctx.tenant_id.clone();
        let handles: Vec<tokio::task::JoinHandle<(String, StrategyResults)>> = self
            .strategies
            .iter()
            .cloned()
            .map(|strategy| {
                let query = query_owned.clone();
                let tenant_id = tenant_id.clone();
                let filters = filters.clone();
                tokio::spawn(async move {
                    let name = strategy.name();
                    let results = match tokio::time::timeout(
                        timeout,
                        run_strategy_safely(strategy.as_ref(), &query, &tenant_id, &filters, fan_out_limit),
                    )
                    .await
                    {
                        Ok(results) => results,
                        Err(_) => {
                            tracing::warn!(strategy = name, "retrieval strategy timed out, degrading to empty");
                            Vec::new()
                        }
                    };
                    (name.to_string(), results)
                })
            })
            .collect();

        let mut outputs = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok((name, results)) => {
                    let weight = *decision.weights.get(name.as_str()).unwrap_or(&1.0);
                    outputs.push(StrategyOutput { name, weight, results });
                }
                Err(join_err) => {
                    tracing::warn!(error = %join_err, "retrieval strategy task panicked, degrading to empty");
                }
            }
        }

        let fused = match self.config.fusion_method {
            FusionMethod::WeightedSum => weighted_sum_fusion(&outputs),
            FusionMethod::ReciprocalRank => reciprocal_rank_fusion(&outputs, self.config.rrf_k),
            FusionMethod::Max => max_fusion(&outputs),
        };

        if fused.is_empty() {
            let hits = Vec::new();
            self.cache_hits(&key, &hits).await?;
            return Ok(SearchResponse { hits, decision });
        }

        let ids: Vec<Uuid> = fused.iter().map(|(id, _)| *id).collect();
        let record_filters = MemoryFilters {
            memory_ids_in: Some(ids.clone()),
            ..Default::default()
        };
        let records =
            with_backoff(BackoffConfig::default(), || self.metadata.list(&ctx.tenant_id, &record_filters)).await?;
        let mut by_id: HashMap<Uuid, MemoryRecord> = records.into_iter().map(|r| (r.id, r)).collect();

        let reranked: Vec<(Uuid, f32)> = if let Some(embeddings) = &self.embeddings {
            let window = rerank_window(fused.len());
            let head = &fused[..window];
            let tail = &fused[window..];

            let candidates: Vec<RerankCandidate> = head
                .iter()
                .filter_map(|(id, score)| {
                    by_id.get(id).map(|record| RerankCandidate {
                        id: *id,
                        content: record.content.clone(),
                        fused_score: *score,
                    })
                })
                .collect();

            if candidates.is_empty() {
                fused
            } else {
                let query_embedding = embeddings.embed_text(query, TaskType::SearchQuery).await?;
                let reranker = SemanticReranker::new(Arc::clone(embeddings));
                let mut combined = reranker.rerank(&query_embedding, candidates).await?;
                combined.extend_from_slice(tail);
                combined
            }
        } else {
            fused
        };

        let now = self.clock.now();
        let scored: Vec<(MemoryRecord, f32)> = reranked
            .into_iter()
            .filter_map(|(id, score)| by_id.remove(&id).map(|record| (record, score)))
            .collect();

        let filtered = self.isolation.validate_search_results(scored, &ctx);

        let mut touched_ids = Vec::with_capacity(limit.min(filtered.len()));
        let hits: Vec<SearchHit> = filtered
            .into_iter()
            .take(limit)
            .map(|(mut record, score)| {
                let explain = score_memory(
                    score as f64,
                    record.importance,
                    record.last_accessed_at,
                    record.created_at,
                    record.access_count,
                    now,
                    &self.scoring_weights,
                    &self.decay,
                );
                record.record_access(now);
                touched_ids.push(record.id);
                SearchHit {
                    memory: record,
                    score,
                    explain,
                }
            })
            .collect();

        if !touched_ids.is_empty() {
            self.metadata.batch_touch_access(&ctx.tenant_id, &touched_ids, now).await?;
        }

        self.cache_hits(&key, &hits).await?;

        Ok(SearchResponse { hits, decision })
    }

    async fn cache_hits(&self, key: &str, hits: &[SearchHit]) -> Result<()> {
        let bytes = serde_json::to_vec(hits)
            .map_err(|e| AmemError::Internal(format!("failed to serialize search cache entry: {e}")))?;
        self.cache.set(key, bytes, Some(self.config.cache_ttl_seconds)).await
    }

    /// Step 9 of §4.5: record a reward against the arm used for a prior
    /// `search` call. A no-op when that call's decision bypassed the
    /// bandit via the heuristic override — there is no arm to credit.
    pub fn record_feedback(&self, decision: &BanditDecision, reward: f64) {
        if decision.heuristic_override {
            return;
        }
        self.bandit.update(decision.arm, reward);
    }

    /// The write path's C2/C6/C4 half (§2 data flow). Embedding
    /// generation and C5 persistence happen externally; call
    /// [`Self::store_embedding`] once the caller has computed the vector.
    pub async fn store_memory(&self, input: StoreMemoryInput) -> Result<MemoryRecord> {
        if input.content.trim().is_empty() {
            return Err(AmemError::InvalidArgument("content must not be empty".into()));
        }
        if input.tenant_id.trim().is_empty() || input.agent_id.trim().is_empty() {
            return Err(AmemError::InvalidArgument("tenant_id and agent_id are required".into()));
        }

        let now = self.clock.now();
        let layer = input.layer.unwrap_or(Layer::Sensory);
        let importance = input.importance.unwrap_or(self.config.default_importance);

        let current_count = self
            .metadata
            .count(
                &input.tenant_id,
                &MemoryFilters {
                    layer: Some(layer),
                    ..Default::default()
                },
            )
            .await? as usize;
        self.layers.check_write_allowed(layer, current_count)?;

        let existing = self
            .metadata
            .list(
                &input.tenant_id,
                &MemoryFilters {
                    layer: Some(layer),
                    ..Default::default()
                },
            )
            .await?;
        let evictions = self.layers.eviction_candidates(layer, &existing);
        for victim in evictions {
            self.metadata.delete(&input.tenant_id, victim).await?;
            self.vectors.delete_vector(victim, &input.tenant_id).await?;
        }

        let mut record = MemoryRecord::new(
            input.tenant_id,
            input.agent_id,
            input.content,
            layer,
            importance,
            now,
        );
        record.project = input.project;
        record.session_id = input.session_id;
        record.tags = input.tags.into_iter().collect();
        record.metadata = input.metadata;
        if layer == Layer::Sensory {
            record.expires_at = Some(now + chrono::Duration::seconds(self.layers.sensory_ttl_seconds()));
        }

        self.metadata.store(record.clone()).await?;
        Ok(record)
    }

    /// Completes the write path once the caller has embedded the new
    /// memory's content: persists the vector (C5) and records the model
    /// name against the record.
    pub async fn store_embedding(
        &self,
        memory_id: Uuid,
        tenant_id: &str,
        embedding: Vec<f32>,
        model_name: &str,
    ) -> Result<()> {
        self.vectors
            .store_vector(memory_id, embedding, tenant_id, None)
            .await?;
        let mut record = self
            .metadata
            .fetch(tenant_id, memory_id)
            .await?
            .ok_or(AmemError::NotFound { id: memory_id })?;
        if !record.embedding_models.iter().any(|m| m == model_name) {
            record.embedding_models.push(model_name.to_string());
        }
        self.metadata.store(record).await
    }

    /// Runs one pass of the Consolidation FSM (C7) over `candidates`,
    /// applying every firing transition through the metadata store so
    /// `version` bumps happen in one place.
    pub async fn run_consolidation_pass(&self, tenant_id: &str, candidates: &[MemoryRecord]) -> Result<usize> {
        let now = self.clock.now();
        let transitions = self.consolidation.run_pass(candidates, now);
        let count = transitions.len();
        for transition in &transitions {
            self.metadata
                .update(
                    tenant_id,
                    transition.memory_id,
                    crate::ports::MemoryPatch {
                        layer: Some(transition.to),
                        ..Default::default()
                    },
                )
                .await?;
        }
        tracing::info!(tenant_id, promoted = count, "consolidation pass complete");
        Ok(count)
    }
}
