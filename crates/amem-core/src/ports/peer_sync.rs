//! Peer-sync port (C13): the remote half of synchronization. The local
//! half — diffing, conflict resolution, direction rules — lives in
//! [`crate::sync`] and is pure; this port is only the RPC boundary.

use crate::error::Result;
use crate::model::{MemoryRecord, SyncPeer};
use async_trait::async_trait;

/// Per-bucket pending counts, the shape `get_sync_status` returns —
/// derived from the diff buckets of §4.7.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub pending_created: u64,
    pub pending_deleted: u64,
    pub pending_modified: u64,
    pub pending_conflicts: u64,
    pub last_sync_unix_seconds: Option<i64>,
}

/// Contract over a remote peer connection.
#[async_trait]
pub trait PeerSync: Send + Sync {
    /// Verify protocol compatibility and fetch the peer's descriptor.
    /// Implementations MUST refuse to connect (return
    /// [`crate::error::AmemError::Unavailable`] or similar) on a protocol
    /// version mismatch rather than silently degrading.
    async fn handshake(&self, peer_id: &str) -> Result<SyncPeer>;

    /// Push local memories to the peer.
    async fn push_memories(&self, peer_id: &str, tenant_id: &str, memories: Vec<MemoryRecord>) -> Result<()>;

    /// Pull the peer's memories for `tenant_id`, optionally only those
    /// with `version > since_version`.
    async fn pull_memories(
        &self,
        peer_id: &str,
        tenant_id: &str,
        since_version: Option<u64>,
    ) -> Result<Vec<MemoryRecord>>;

    /// Current sync status against this peer.
    async fn get_sync_status(&self, peer_id: &str, tenant_id: &str) -> Result<SyncStatus>;
}
