//! A complete write-then-search journey through the public engine API:
//! store a memory, embed it, find it by a fulltext query, confirm the hit
//! carries a recorded access, then fetch it back directly and check the
//! store/get round trip holds on every field but the ones access bumps.

use amem_core::isolation::IsolationContext;
use amem_core::model::{Layer, MemoryFilters, StoreMemoryInput};
use amem_core::ports::MetadataStore;
use amem_e2e_tests::TestEngineHarness;
use chrono::Utc;

#[tokio::test]
async fn stored_memory_is_found_by_search_and_round_trips_through_fetch() {
    let now = Utc::now();
    let harness = TestEngineHarness::new(now);

    let record = harness
        .engine
        .store_memory(StoreMemoryInput {
            content: "quarterly roadmap review notes".to_string(),
            layer: Some(Layer::Working),
            tenant_id: "tenant-a".to_string(),
            agent_id: "agent-a".to_string(),
            tags: vec!["planning".to_string()],
            importance: Some(0.6),
            ..Default::default()
        })
        .await
        .unwrap();

    harness
        .engine
        .store_embedding(record.id, "tenant-a", vec![0.1; 8], "fake-embedder")
        .await
        .unwrap();

    let before_access_count = record.access_count;

    let response = harness
        .engine
        .search(
            "roadmap",
            IsolationContext::tenant_only("tenant-a"),
            MemoryFilters::default(),
            10,
        )
        .await
        .unwrap();

    assert_eq!(response.hits.len(), 1);
    let hit = &response.hits[0].memory;
    assert_eq!(hit.id, record.id);
    assert_eq!(hit.content, record.content);
    assert_eq!(hit.tags, record.tags);
    assert_eq!(hit.importance, record.importance);
    assert!(hit.access_count > before_access_count);

    let fetched = harness.metadata.fetch("tenant-a", record.id).await.unwrap().expect("memory persisted");
    assert_eq!(fetched.content, record.content);
    assert_eq!(fetched.tags, record.tags);
    assert_eq!(fetched.importance, record.importance);
    assert_eq!(fetched.metadata, record.metadata);
}
