//! # Amem Core
//!
//! Multi-tenant agentic memory engine core: a layered cognitive memory
//! manifold (Sensory → Working → Long-Term Episodic/Semantic → Reflective
//! → Archived) with hybrid retrieval, scoring/decay math, a policy bandit
//! over fusion weights, cross-peer synchronization, and a tenant isolation
//! guard.
//!
//! This crate holds the engine's pure logic and port contracts only.
//! Concrete backends — a real metadata store, a real ANN index, a hosted
//! embedding or LLM provider — are the surrounding system's job; see
//! [`ports`] for the contracts they implement.
//!
//! ## Layout
//!
//! - [`clock`] — wall-clock abstraction every time-sensitive computation
//!   reads through, so tests can hold time fixed.
//! - [`scoring`] — the pure scoring kernel: cosine similarity, decay,
//!   the unified relevance/importance/recency score.
//! - [`isolation`] — the tenant isolation guard, a post-retrieval filter.
//! - [`ports`] — async trait contracts for metadata, vectors, embeddings,
//!   LLM generation, caching, and peer sync.
//! - [`model`] — the data model every other module exchanges.
//! - [`layer`] — per-layer capacity, TTL, and eviction policy.
//! - [`consolidation`] — the layer-transition state machine.
//! - [`search`] — retrieval strategies, fusion, and reranking.
//! - [`bandit`] — the policy bandit that picks fusion weights per query.
//! - [`engine`] — the retrieval engine orchestrator and write path.
//! - [`reflection`] — clusters long-term memories into reflective summaries.
//! - [`sync`] — diffing and conflict resolution for cross-peer sync.
//! - [`reconcile`] — the consistency reconciler for vector/metadata drift.
//! - [`retry`] — exponential-backoff retry for idempotent upstream calls.
//! - [`error`] — the crate-wide error taxonomy.

pub mod bandit;
pub mod clock;
pub mod consolidation;
pub mod engine;
pub mod error;
pub mod isolation;
pub mod layer;
pub mod model;
pub mod ports;
pub mod reconcile;
pub mod reflection;
pub mod retry;
pub mod search;
pub mod sync;

/// Ergonomic re-exports for common engine setup. Importing `prelude::*`
/// pulls in the types most callers construct an engine with, without
/// reaching into every submodule individually.
pub mod prelude {
    pub use crate::bandit::{BanditConfig, BanditDecision, PolicyBandit};
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::consolidation::{ConsolidationConfig, ConsolidationFsm};
    pub use crate::engine::{EngineConfig, FusionMethod, RetrievalEngine, SearchHit, SearchResponse};
    pub use crate::error::{AmemError, Result};
    pub use crate::isolation::{IsolationContext, IsolationGuard, IsolationStats};
    pub use crate::layer::{LayerManager, LayerManagerConfig};
    pub use crate::model::{Layer, MemoryFilters, MemoryRecord, Metadata, StoreMemoryInput, Value};
    pub use crate::ports::{Cache, EmbeddingProvider, LlmProvider, MetadataStore, PeerSync, VectorStore};
    pub use crate::reconcile::{ConsistencyReconciler, ReconcilerConfig};
    pub use crate::reflection::{ReflectionConfig, ReflectionEngine};
    pub use crate::retry::{with_backoff, BackoffConfig};
    pub use crate::scoring::{DecayConfig, ScoringWeights};
    pub use crate::sync::{
        calculate_memory_diff, resolve_conflict, ConflictResolution, DiffResult, SyncConfig, SyncCoordinator, SyncLog,
    };
}

pub mod scoring;
