//! Cache port: used by the Retrieval Engine (C11) for search-result
//! caching and by the bandit/reconciler for lightweight counters.

use crate::error::Result;
use async_trait::async_trait;

/// Opaque byte-oriented cache, keyed by caller-chosen strings (callers
/// namespace keys with a family prefix themselves, e.g. `"search:"`).
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// `ttl_seconds == None` means no expiry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: Option<u64>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Atomically add `by` to the integer stored at `key` (starting from
    /// zero if absent), returning the new value.
    async fn increment(&self, key: &str, by: i64) -> Result<i64>;

    /// Remaining TTL in seconds, if the key exists and has one.
    async fn get_ttl(&self, key: &str) -> Result<Option<u64>>;
}
