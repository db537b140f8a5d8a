//! Ports consumed by the core (§6): the abstract capabilities the engine
//! depends on. No concrete backend lives in this crate — adapters (a real
//! SQL metadata store, a real ANN index, a hosted LLM, ...) are the
//! surrounding system's job; only the contracts matter here.

mod cache;
mod embedding;
mod llm;
mod metadata_store;
mod peer_sync;
mod vector_store;

pub use cache::Cache;
pub use embedding::{EmbeddingProvider, TaskType};
pub use llm::{ChatMessage, ChatRole, LlmProvider};
pub use metadata_store::{AggregateField, AggregateOp, CompareOp, DeletePredicate, MemoryPatch, MetadataStore};
pub use peer_sync::{PeerSync, SyncStatus};
pub use vector_store::{VectorFilters, VectorItem, VectorStore};

pub use crate::clock::Clock;
