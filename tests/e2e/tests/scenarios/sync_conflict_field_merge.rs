//! Field-merge conflict resolution: a local and remote edit of the same
//! memory, five seconds apart, resolve to the newer content, the union of
//! both tags, the higher importance, and a version past both sides'.

use amem_core::model::{Layer, MemoryRecord};
use amem_core::sync::{resolve_conflict, ConflictResolution};
use chrono::{Duration, Utc};
use std::collections::BTreeSet;

#[test]
fn field_merge_takes_newer_content_union_tags_and_max_importance() {
    let t = Utc::now();

    let mut local = MemoryRecord::new("tenant-a", "agent-a", "A", Layer::LongTermSemantic, 0.5, t);
    local.tags = BTreeSet::from(["x".to_string()]);
    local.version = 3;
    local.modified_at = t;

    let mut remote = local.clone();
    remote.content = "B".to_string();
    remote.tags = BTreeSet::from(["y".to_string()]);
    remote.importance = 0.8;
    remote.version = 5;
    remote.modified_at = t + Duration::seconds(5);

    let merged = resolve_conflict(&local, &remote, ConflictResolution::FieldMerge).unwrap();

    assert_eq!(merged.content, "B");
    assert_eq!(merged.tags, BTreeSet::from(["x".to_string(), "y".to_string()]));
    assert_eq!(merged.importance, 0.8);
    assert_eq!(merged.version, local.version.max(remote.version) + 1);
}
