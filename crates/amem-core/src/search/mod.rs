//! Hybrid Retrieval Pipeline: Retrieval Strategies (C8) plus Fusion &
//! Reranking (C9).

pub mod fusion;
pub mod rerank;
pub mod strategies;

pub use fusion::{reciprocal_rank_fusion, weighted_sum_fusion, max_fusion, StrategyOutput, DEFAULT_RRF_K};
pub use rerank::{rerank_window, RerankCandidate, SemanticReranker, MAX_RERANK_CANDIDATES};
pub use strategies::{run_strategy_safely, RetrievalStrategy, StrategyResults};
