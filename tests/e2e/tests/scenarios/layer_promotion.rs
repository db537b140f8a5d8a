//! A WORKING memory accessed twice across a ten-minute gap promotes to
//! LONG_TERM_EPISODIC after one consolidation pass, with its version
//! bumped exactly once.

use amem_core::model::{Layer, MemoryFilters, MemoryRecord};
use amem_core::ports::MetadataStore;
use amem_e2e_tests::TestEngineHarness;
use chrono::{Duration, Utc};

#[tokio::test]
async fn working_memory_promotes_to_episodic_after_one_pass() {
    let now = Utc::now();
    let harness = TestEngineHarness::new(now);

    let mut record = MemoryRecord::new("tenant-a", "agent-a", "a note worth remembering", Layer::Working, 0.7, now);
    let initial_version = record.version;
    harness.seed(record.clone()).await;

    record.record_access(harness.now());
    harness.seed(record.clone()).await;

    harness.advance_seconds(Duration::minutes(10).num_seconds());
    record.record_access(harness.now());
    harness.seed(record.clone()).await;

    let candidates = harness.metadata.list("tenant-a", &MemoryFilters::default()).await.unwrap();
    assert_eq!(candidates.len(), 1);

    let promoted = harness
        .engine
        .run_consolidation_pass("tenant-a", &candidates)
        .await
        .unwrap();
    assert_eq!(promoted, 1);

    let after = harness.metadata.fetch("tenant-a", record.id).await.unwrap().expect("memory still present");
    assert_eq!(after.layer, Layer::LongTermEpisodic);
    assert_eq!(after.version, initial_version + 1);
}
