//! Embedding-provider port: an opaque text-to-vector capability.

use crate::error::Result;
use async_trait::async_trait;

/// Whether a text is a search query or a document being indexed.
/// Prefix-sensitive embedding models (e.g. Nomic) want a different prefix
/// prepended for each (§4.3: `search_query:` / `search_document:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    SearchQuery,
    SearchDocument,
}

impl TaskType {
    /// The literal prefix string for this task type.
    pub fn prefix(&self) -> &'static str {
        match self {
            TaskType::SearchQuery => "search_query:",
            TaskType::SearchDocument => "search_document:",
        }
    }
}

/// Opaque text-to-vector capability. Concrete backends (local ONNX
/// inference, a hosted API, ...) are out of scope for the core; only the
/// contract matters.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text for the given task type. Implementations that
    /// are prefix-sensitive are responsible for prepending
    /// `task_type.prefix()` themselves.
    async fn embed_text(&self, text: &str, task_type: TaskType) -> Result<Vec<f32>>;

    /// Embed a batch of texts for the given task type.
    async fn embed_batch(&self, texts: &[String], task_type: TaskType) -> Result<Vec<Vec<f32>>>;

    /// The fixed dimension of vectors this provider produces.
    fn dimension(&self) -> usize;
}
