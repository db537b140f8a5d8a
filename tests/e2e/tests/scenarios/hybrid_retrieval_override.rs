//! A question-shaped query trips the bandit's lexical heuristic, pushing
//! `fulltext`/`sparse_bm25` weight to 20 and `dense_vector` down to 1. The
//! memory containing the literal phrase wins the fused score so decisively
//! that it outranks a memory on a distant topic that only the dense
//! strategy favors — even though that other memory's rerank cosine is the
//! higher of the two.

use amem_core::isolation::IsolationContext;
use amem_core::model::{Layer, MemoryFilters, MemoryRecord};
use amem_core::ports::TaskType;
use amem_e2e_tests::TestEngineHarness;
use chrono::Utc;

const DIMENSION: usize = 8;
const QUERY: &str = "what is the primary key for database tables?";

fn unit_vector(hot_index: usize) -> Vec<f32> {
    let mut v = vec![0.0_f32; DIMENSION];
    v[hot_index] = 1.0;
    v
}

#[tokio::test]
async fn literal_phrase_match_outranks_higher_cosine_vector_match() {
    let now = Utc::now();
    let harness = TestEngineHarness::new(now);

    let literal_match = MemoryRecord::new(
        "tenant-a",
        "agent-a",
        "the primary key for database tables is an auto-incrementing integer id",
        Layer::LongTermSemantic,
        0.5,
        now,
    );
    let topical_vector_match = MemoryRecord::new(
        "tenant-a",
        "agent-a",
        "the weather in the northern hemisphere turns colder every autumn",
        Layer::LongTermSemantic,
        0.5,
        now,
    );

    harness.seed(literal_match.clone()).await;
    harness.seed(topical_vector_match.clone()).await;

    // The query embeds to a unit vector on axis 0.
    harness.embeddings.set_vector(QUERY, TaskType::SearchQuery, unit_vector(0));

    // Stored raw vectors: the topical memory sits right on the query axis
    // (cosine 1.0), the literal-phrase memory is orthogonal to it (cosine
    // 0.0) — dense search alone would favor the topical memory.
    harness
        .engine
        .store_embedding(topical_vector_match.id, "tenant-a", unit_vector(0), "fake-embedder")
        .await
        .unwrap();
    harness
        .engine
        .store_embedding(literal_match.id, "tenant-a", unit_vector(1), "fake-embedder")
        .await
        .unwrap();

    // Rerank re-embeds each candidate's content text; keep that ranking
    // pointed the same way as the raw dense search so the topical memory's
    // cosine stays the higher of the two at every stage.
    harness
        .embeddings
        .set_vector(&topical_vector_match.content, TaskType::SearchDocument, unit_vector(0));
    harness
        .embeddings
        .set_vector(&literal_match.content, TaskType::SearchDocument, unit_vector(1));

    let response = harness
        .engine
        .search(QUERY, IsolationContext::tenant_only("tenant-a"), MemoryFilters::default(), 10)
        .await
        .unwrap();

    assert!(
        response.decision.heuristic_override,
        "expected the question-keyword heuristic to fire for this query"
    );
    assert!(!response.hits.is_empty());
    assert_eq!(
        response.hits[0].memory.id, literal_match.id,
        "literal phrase match should outrank the topically-distant but higher-cosine vector match"
    );
}
