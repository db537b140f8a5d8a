//! At the decay kernel's half-life (t = ln2 / 0.001 ≈ 693s), an untouched
//! memory's recency has fallen to ~0.5. A memory accessed 100 times by the
//! same instant decays far slower, since access count raises the
//! denominator of the effective decay rate — the rate is floored at
//! `min_decay_rate` rather than allowed to reach zero, so high access counts
//! buy a much slower decay, not an immortal one.

use amem_core::scoring::{recency_score, DecayConfig};
use chrono::Utc;

#[test]
fn untouched_memory_reaches_half_life_at_693_seconds() {
    let config = DecayConfig::default();
    let created_at = Utc::now();
    let now = created_at + chrono::Duration::seconds(693);

    let recency = recency_score(created_at, created_at, 0, now, &config);
    assert!((recency - 0.5).abs() < 0.01, "expected recency near 0.5, got {recency}");
}

#[test]
fn heavily_accessed_memory_decays_much_slower_over_the_same_span() {
    let config = DecayConfig::default();
    let created_at = Utc::now();
    let now = created_at + chrono::Duration::seconds(693);

    let untouched = recency_score(created_at, created_at, 0, now, &config);
    let frequently_accessed = recency_score(created_at, created_at, 100, now, &config);
    assert!(
        frequently_accessed > untouched + 0.3,
        "expected access count to meaningfully slow decay, got {frequently_accessed} vs {untouched}"
    );
}
