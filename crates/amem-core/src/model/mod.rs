//! Data model (§3): the shapes every other module exchanges.

mod memory;
mod value;

pub use memory::{Layer, MemoryFilters, MemoryRecord, ReflectionType, StoreMemoryInput};
pub use value::{merge_metadata, Metadata, Value};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A dense-vector embedding for one `(memory_id, model_name)` pair.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingRecord {
    pub memory_id: Uuid,
    pub model_name: String,
    pub vector: Vec<f32>,
}

/// A peer's place in the replication topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeerRole {
    Primary,
    Replica,
    Peer,
}

/// A sync partner, as tracked by the Sync Coordinator (C13).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPeer {
    pub peer_id: String,
    pub role: PeerRole,
    pub protocol_version: u32,
    pub last_seen: DateTime<Utc>,
    pub capabilities: Vec<String>,
}

/// The engine's own protocol version, checked during handshake.
pub const PROTOCOL_VERSION: u32 = 1;
