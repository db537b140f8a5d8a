//! Sync Coordinator (C13): diffing two memory sets, detecting conflicts,
//! and resolving them per a selectable policy. Pure logic — the RPC
//! boundary to an actual peer is [`crate::ports::PeerSync`].

use crate::clock::Clock;
use crate::error::{AmemError, Result};
use crate::model::{merge_metadata, MemoryFilters, MemoryRecord};
use crate::ports::{MetadataStore, PeerSync};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use uuid::Uuid;

/// Which bucket a `(tenant, agent)` pair's comparison placed a memory in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Created,
    Modified,
    Deleted,
    Unchanged,
}

/// One memory's comparison outcome, carrying enough of both sides'
/// bookkeeping to decide a sync direction without re-fetching.
#[derive(Debug, Clone)]
pub struct MemoryChange {
    pub memory_id: Uuid,
    pub change_type: ChangeType,
    pub local_version: Option<u64>,
    pub remote_version: Option<u64>,
    pub conflict_fields: Vec<&'static str>,
}

impl MemoryChange {
    pub fn conflicts(&self) -> bool {
        !self.conflict_fields.is_empty()
    }
}

/// The full classification of a local/remote comparison for one
/// `(tenant, agent)` pair (§4.7).
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    pub created: Vec<MemoryChange>,
    pub modified: Vec<MemoryChange>,
    pub deleted: Vec<MemoryChange>,
    pub unchanged: Vec<MemoryChange>,
    pub conflicts: Vec<MemoryChange>,
}

impl DiffResult {
    pub fn has_changes(&self) -> bool {
        !self.created.is_empty() || !self.modified.is_empty() || !self.deleted.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.created.len() + self.modified.len() + self.deleted.len()
    }
}

const COMPARE_FIELDS: [&str; 5] = ["content", "importance", "tags", "metadata", "version"];
const CONFLICT_FIELDS: [&str; 4] = ["content", "importance", "tags", "metadata"];

fn fields_differ(local: &MemoryRecord, remote: &MemoryRecord, field: &str) -> bool {
    match field {
        "content" => local.content != remote.content,
        "importance" => (local.importance - remote.importance).abs() > f64::EPSILON,
        "tags" => local.tags != remote.tags,
        "metadata" => local.metadata != remote.metadata,
        "version" => local.version != remote.version,
        _ => false,
    }
}

fn is_modified(local: &MemoryRecord, remote: &MemoryRecord) -> bool {
    COMPARE_FIELDS.iter().any(|f| fields_differ(local, remote, f))
}

/// Conflicts fire only when both sides' `modified_at` differ by more than
/// one second AND at least one of the compared fields disagrees (§4.7).
fn detect_conflicts(local: &MemoryRecord, remote: &MemoryRecord) -> Vec<&'static str> {
    let gap_millis = (local.modified_at - remote.modified_at).num_milliseconds().abs();
    if gap_millis < 1000 {
        return Vec::new();
    }
    CONFLICT_FIELDS
        .iter()
        .copied()
        .filter(|f| fields_differ(local, remote, f))
        .collect()
}

/// Compute the four-bucket diff (plus a `conflicts` bucket carved out of
/// `modified`) between a tenant/agent's local and remote memory sets.
pub fn calculate_memory_diff(local: &[MemoryRecord], remote: &[MemoryRecord]) -> DiffResult {
    let local_by_id: HashMap<Uuid, &MemoryRecord> = local.iter().map(|r| (r.id, r)).collect();
    let remote_by_id: HashMap<Uuid, &MemoryRecord> = remote.iter().map(|r| (r.id, r)).collect();

    let local_ids: BTreeSet<Uuid> = local_by_id.keys().copied().collect();
    let remote_ids: BTreeSet<Uuid> = remote_by_id.keys().copied().collect();

    let mut result = DiffResult::default();

    for id in remote_ids.difference(&local_ids) {
        let remote_mem = remote_by_id[id];
        result.created.push(MemoryChange {
            memory_id: *id,
            change_type: ChangeType::Created,
            local_version: None,
            remote_version: Some(remote_mem.version),
            conflict_fields: Vec::new(),
        });
    }

    for id in local_ids.difference(&remote_ids) {
        let local_mem = local_by_id[id];
        result.deleted.push(MemoryChange {
            memory_id: *id,
            change_type: ChangeType::Deleted,
            local_version: Some(local_mem.version),
            remote_version: None,
            conflict_fields: Vec::new(),
        });
    }

    for id in local_ids.intersection(&remote_ids) {
        let local_mem = local_by_id[id];
        let remote_mem = remote_by_id[id];

        if !is_modified(local_mem, remote_mem) {
            result.unchanged.push(MemoryChange {
                memory_id: *id,
                change_type: ChangeType::Unchanged,
                local_version: Some(local_mem.version),
                remote_version: Some(remote_mem.version),
                conflict_fields: Vec::new(),
            });
            continue;
        }

        let conflict_fields = detect_conflicts(local_mem, remote_mem);
        let change = MemoryChange {
            memory_id: *id,
            change_type: ChangeType::Modified,
            local_version: Some(local_mem.version),
            remote_version: Some(remote_mem.version),
            conflict_fields,
        };

        if change.conflicts() {
            result.conflicts.push(change);
        } else {
            result.modified.push(change);
        }
    }

    result
}

/// Which way a change should flow, per §4.7's direction rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    Push,
    Pull,
    Conflict,
}

/// Determine sync direction for one change. `Modified` needs both
/// records' `modified_at` to compare; `local_newer` carries that
/// comparison since [`MemoryChange`] itself doesn't hold timestamps.
pub fn sync_direction(change: &MemoryChange, local_newer: Option<bool>) -> SyncDirection {
    if change.conflicts() {
        return SyncDirection::Conflict;
    }
    match change.change_type {
        ChangeType::Created => SyncDirection::Pull,
        ChangeType::Deleted => SyncDirection::Push,
        ChangeType::Modified => match local_newer {
            Some(true) => SyncDirection::Push,
            _ => SyncDirection::Pull,
        },
        ChangeType::Unchanged => SyncDirection::Pull,
    }
}

/// Policy for resolving a detected conflict (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    LastWriteWins,
    KeepLocal,
    KeepRemote,
    FieldMerge,
    Manual,
}

/// Resolve one conflicting pair under `strategy`. Returns `None` under
/// `Manual` — the caller must surface the conflict instead of applying
/// anything. Every non-`Manual` branch bumps
/// `version = max(local.version, remote.version) + 1` (§4.7).
pub fn resolve_conflict(
    local: &MemoryRecord,
    remote: &MemoryRecord,
    strategy: ConflictResolution,
) -> Option<MemoryRecord> {
    let merged_version = local.version.max(remote.version) + 1;

    let mut resolved = match strategy {
        ConflictResolution::LastWriteWins => {
            let mut winner = if local.modified_at > remote.modified_at {
                local.clone()
            } else if remote.modified_at > local.modified_at {
                remote.clone()
            } else if local.version >= remote.version {
                local.clone()
            } else {
                remote.clone()
            };
            winner.version = merged_version;
            winner
        }
        ConflictResolution::KeepLocal => {
            let mut winner = local.clone();
            winner.version = merged_version;
            winner
        }
        ConflictResolution::KeepRemote => {
            let mut winner = remote.clone();
            winner.version = merged_version;
            winner
        }
        ConflictResolution::FieldMerge => {
            let mut merged = local.clone();
            merged.tags = local.tags.union(&remote.tags).cloned().collect();
            merged.metadata = merge_metadata(&local.metadata, &remote.metadata);
            merged.importance = local.importance.max(remote.importance);
            merged.content = if remote.modified_at > local.modified_at {
                remote.content.clone()
            } else {
                local.content.clone()
            };
            merged.version = merged_version;
            merged
        }
        ConflictResolution::Manual => return None,
    };

    resolved.modified_at = local.modified_at.max(remote.modified_at);
    Some(resolved)
}

/// Tunables for one [`SyncCoordinator::sync_with_peer`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub conflict_resolution: ConflictResolution,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            conflict_resolution: ConflictResolution::FieldMerge,
        }
    }
}

/// The record of one `sync_with_peer` pass, returned to the caller (§6:
/// "sync_with_peer(peer_id, tenant_id) → sync log").
#[derive(Debug, Clone, Default)]
pub struct SyncLog {
    pub peer_id: String,
    pub pulled: usize,
    pub pushed: usize,
    pub conflicts_resolved: usize,
    pub conflicts_unresolved: Vec<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Sync Coordinator (C13): drives one peer handshake/diff/resolve/apply
/// pass over the [`PeerSync`] port and the local [`MetadataStore`],
/// reusing the pure diff/resolve functions above for the decision logic.
pub struct SyncCoordinator {
    metadata: Arc<dyn MetadataStore>,
    peer: Arc<dyn PeerSync>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
}

impl SyncCoordinator {
    pub fn new(metadata: Arc<dyn MetadataStore>, peer: Arc<dyn PeerSync>, clock: Arc<dyn Clock>, config: SyncConfig) -> Self {
        Self { metadata, peer, clock, config }
    }

    /// One full sync pass against `peer_id` for `(tenant_id, agent_id)`:
    /// handshake (refusing on protocol mismatch), pull the peer's current
    /// set, diff against local, then apply each bucket per §4.7's
    /// direction rules before pushing anything the peer is missing.
    pub async fn sync_with_peer(&self, peer_id: &str, tenant_id: &str, agent_id: &str) -> Result<SyncLog> {
        self.peer.handshake(peer_id).await?;

        let local = self
            .metadata
            .list(
                tenant_id,
                &MemoryFilters {
                    agent_id: Some(agent_id.to_string()),
                    ..Default::default()
                },
            )
            .await?;
        let remote = self.peer.pull_memories(peer_id, tenant_id, None).await?;

        let local_by_id: HashMap<Uuid, MemoryRecord> = local.iter().cloned().map(|r| (r.id, r)).collect();
        let remote_by_id: HashMap<Uuid, MemoryRecord> = remote.iter().cloned().map(|r| (r.id, r)).collect();

        let diff = calculate_memory_diff(&local, &remote);
        let mut log = SyncLog {
            peer_id: peer_id.to_string(),
            ..Default::default()
        };
        let mut to_push: Vec<MemoryRecord> = Vec::new();

        for change in &diff.created {
            if let Some(remote_mem) = remote_by_id.get(&change.memory_id) {
                self.metadata.store(remote_mem.clone()).await?;
                log.pulled += 1;
            }
        }

        for change in &diff.deleted {
            if let Some(local_mem) = local_by_id.get(&change.memory_id) {
                to_push.push(local_mem.clone());
            }
        }

        for change in &diff.modified {
            let (Some(local_mem), Some(remote_mem)) =
                (local_by_id.get(&change.memory_id), remote_by_id.get(&change.memory_id))
            else {
                continue;
            };
            let local_newer = local_mem.modified_at > remote_mem.modified_at;
            match sync_direction(change, Some(local_newer)) {
                SyncDirection::Push => to_push.push(local_mem.clone()),
                SyncDirection::Pull => {
                    self.metadata.store(remote_mem.clone()).await?;
                    log.pulled += 1;
                }
                SyncDirection::Conflict => unreachable!("modified bucket excludes conflicts"),
            }
        }

        for change in &diff.conflicts {
            let (Some(local_mem), Some(remote_mem)) =
                (local_by_id.get(&change.memory_id), remote_by_id.get(&change.memory_id))
            else {
                continue;
            };
            match resolve_conflict(local_mem, remote_mem, self.config.conflict_resolution) {
                Some(merged) => {
                    self.metadata.store(merged.clone()).await?;
                    to_push.push(merged);
                    log.conflicts_resolved += 1;
                }
                None => {
                    log.conflicts_unresolved.push(change.memory_id);
                }
            }
        }

        if !to_push.is_empty() {
            log.pushed = to_push.len();
            self.peer.push_memories(peer_id, tenant_id, to_push).await?;
        }

        if !log.conflicts_unresolved.is_empty() && self.config.conflict_resolution == ConflictResolution::Manual {
            return Err(AmemError::Conflict {
                id: log.conflicts_unresolved[0],
            });
        }

        log.completed_at = Some(self.clock.now());
        tracing::info!(
            peer_id,
            tenant_id,
            pulled = log.pulled,
            pushed = log.pushed,
            conflicts_resolved = log.conflicts_resolved,
            "sync pass complete"
        );
        Ok(log)
    }
}
