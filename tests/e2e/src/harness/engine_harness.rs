//! Wires the in-memory port fakes into a real [`RetrievalEngine`], plus the
//! other components (reconciler, reflection engine) that share the same
//! ports, so a scenario test can drive the public engine API directly.

use crate::mocks::ports::{
    FakeEmbeddingProvider, FakeLlmProvider, InMemoryCache, InMemoryMetadataStore, InMemoryVectorStore,
};
use amem_core::bandit::BanditConfig;
use amem_core::clock::{Clock, ManualClock};
use amem_core::consolidation::{ConsolidationConfig, ConsolidationFsm};
use amem_core::engine::{EngineConfig, RetrievalEngine};
use amem_core::isolation::IsolationGuard;
use amem_core::layer::{LayerManager, LayerManagerConfig};
use amem_core::reconcile::{ConsistencyReconciler, ReconcilerConfig};
use amem_core::reflection::{ReflectionConfig, ReflectionEngine};
use amem_core::scoring::{DecayConfig, ScoringWeights};
use amem_core::search::strategies::{DenseVectorStrategy, FullTextStrategy, SparseBm25Strategy};
use amem_core::sync::{SyncConfig, SyncCoordinator};
use chrono::{DateTime, Utc};
use std::sync::Arc;

const FAKE_EMBEDDING_DIMENSION: usize = 8;

/// Every port, live, plus a [`RetrievalEngine`] constructed over them. Each
/// field is reachable directly so a test can seed the metadata store,
/// register an embedding override, or advance the clock without going
/// through the engine's own API.
pub struct TestEngineHarness {
    pub clock: Arc<ManualClock>,
    pub metadata: Arc<InMemoryMetadataStore>,
    pub vectors: Arc<InMemoryVectorStore>,
    pub cache: Arc<InMemoryCache>,
    pub embeddings: Arc<FakeEmbeddingProvider>,
    pub llm: Arc<FakeLlmProvider>,
    pub engine: RetrievalEngine,
}

impl TestEngineHarness {
    /// The full hybrid stack: full-text, sparse BM25, and dense-vector
    /// strategies all registered, isolation in strict mode, every other
    /// component at its default configuration.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::builder(now).build()
    }

    /// Start building a harness with non-default configuration.
    pub fn builder(now: DateTime<Utc>) -> TestEngineHarnessBuilder {
        TestEngineHarnessBuilder::new(now)
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.clock.advance_seconds(seconds);
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn seed(&self, record: amem_core::model::MemoryRecord) {
        self.metadata.store(record).await.expect("seed store must not fail");
    }

    /// Build a [`ConsistencyReconciler`] over this harness's metadata and
    /// vector stores.
    pub fn reconciler(&self, config: ReconcilerConfig) -> ConsistencyReconciler {
        ConsistencyReconciler::new(self.metadata.clone(), self.vectors.clone(), config)
    }

    /// Build a [`ReflectionEngine`] over this harness's metadata store and
    /// fake LLM.
    pub fn reflection_engine(&self, config: ReflectionConfig) -> ReflectionEngine {
        let llm: Arc<dyn amem_core::ports::LlmProvider> = self.llm.clone();
        ReflectionEngine::new(self.metadata.clone(), Some(llm), config)
    }

    /// Build a [`SyncCoordinator`] over this harness's metadata store and
    /// `peer`, sharing the harness's clock.
    pub fn sync_coordinator(
        &self,
        peer: Arc<dyn amem_core::ports::PeerSync>,
        config: SyncConfig,
    ) -> SyncCoordinator {
        let clock: Arc<dyn Clock> = self.clock.clone();
        SyncCoordinator::new(self.metadata.clone(), peer, clock, config)
    }
}

/// Builder for [`TestEngineHarness`], letting a scenario override just the
/// knobs it cares about (e.g. a tighter layer capacity) while leaving
/// everything else at its default.
pub struct TestEngineHarnessBuilder {
    now: DateTime<Utc>,
    bandit_config: BanditConfig,
    isolation_strict: bool,
    layer_config: LayerManagerConfig,
    consolidation_config: ConsolidationConfig,
    scoring_weights: ScoringWeights,
    decay_config: DecayConfig,
    engine_config: EngineConfig,
    with_dense_strategy: bool,
}

impl TestEngineHarnessBuilder {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            bandit_config: BanditConfig::default(),
            isolation_strict: true,
            layer_config: LayerManagerConfig::default(),
            consolidation_config: ConsolidationConfig::default(),
            scoring_weights: ScoringWeights::default(),
            decay_config: DecayConfig::default(),
            engine_config: EngineConfig::default(),
            with_dense_strategy: true,
        }
    }

    pub fn layer_config(mut self, config: LayerManagerConfig) -> Self {
        self.layer_config = config;
        self
    }

    pub fn consolidation_config(mut self, config: ConsolidationConfig) -> Self {
        self.consolidation_config = config;
        self
    }

    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    pub fn without_dense_strategy(mut self) -> Self {
        self.with_dense_strategy = false;
        self
    }

    pub fn build(self) -> TestEngineHarness {
        let clock = Arc::new(ManualClock::new(self.now));
        let metadata = Arc::new(InMemoryMetadataStore::default());
        let vectors = Arc::new(InMemoryVectorStore::default());
        let cache = Arc::new(InMemoryCache::default());
        let embeddings = Arc::new(FakeEmbeddingProvider::new(FAKE_EMBEDDING_DIMENSION));
        let llm = Arc::new(FakeLlmProvider);

        let mut strategies: Vec<Arc<dyn amem_core::search::strategies::RetrievalStrategy>> = vec![
            Arc::new(FullTextStrategy::new(metadata.clone())),
            Arc::new(SparseBm25Strategy::new(metadata.clone())),
        ];
        if self.with_dense_strategy {
            strategies.push(Arc::new(DenseVectorStrategy::new(embeddings.clone(), vectors.clone())));
        }

        let embeddings_port: Arc<dyn amem_core::ports::EmbeddingProvider> = embeddings.clone();
        let engine = RetrievalEngine::new(
            metadata.clone(),
            vectors.clone(),
            Some(embeddings_port),
            cache.clone(),
            clock.clone(),
            strategies,
            self.bandit_config,
            IsolationGuard::new(self.isolation_strict),
            LayerManager::new(self.layer_config),
            ConsolidationFsm::new(self.consolidation_config),
            self.scoring_weights,
            self.decay_config,
            self.engine_config,
        );

        TestEngineHarness {
            clock,
            metadata,
            vectors,
            cache,
            embeddings,
            llm,
            engine,
        }
    }
}
