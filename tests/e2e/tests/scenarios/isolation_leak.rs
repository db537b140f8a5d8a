//! Two memories sit under the same tenant but different agents. A query
//! scoped to `agent_1` must come back with only `agent_1`'s memory, and the
//! isolation guard's leak counter must reflect the one filtered record —
//! independent of whether the store beneath it honored the scope.

use amem_core::isolation::IsolationContext;
use amem_core::model::MemoryFilters;
use amem_e2e_tests::mocks::fixtures::TestDataFactory;
use amem_e2e_tests::TestEngineHarness;

#[tokio::test]
async fn leaked_cross_agent_memory_is_filtered_and_counted() {
    let now = chrono::Utc::now();
    let harness = TestEngineHarness::new(now);

    let (owned, leaked) = TestDataFactory::cross_agent_pair("tenant-a", "agent-1", "agent-2", now);
    harness.seed(owned.clone()).await;
    harness.seed(leaked).await;

    // Query scoped to agent_1 only, but with a tenant-wide filter so the
    // underlying store returns both rows and the guard must do the work.
    let response = harness
        .engine
        .search(
            "private note",
            IsolationContext {
                tenant_id: "tenant-a".to_string(),
                agent_id: Some("agent-1".to_string()),
                session_id: None,
                project: None,
            },
            MemoryFilters::default(),
            10,
        )
        .await
        .unwrap();

    assert_eq!(response.hits.len(), 1);
    assert_eq!(response.hits[0].memory.id, owned.id);

    let stats = harness.engine.isolation_stats();
    assert_eq!(stats.leak_count, 1);
}
