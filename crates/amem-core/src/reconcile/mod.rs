//! Consistency Reconciler (C14): periodically walks the vector store and
//! deletes any vector whose metadata row is gone (§4.8).

use crate::error::Result;
use crate::ports::{MetadataStore, VectorStore};
use std::sync::Arc;
use uuid::Uuid;

/// Tunables for one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcilerConfig {
    pub page_size: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

/// Outcome of one full pass over a tenant's vector store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconciliationReport {
    pub pages_scanned: usize,
    pub vectors_scanned: usize,
    pub orphans_deleted: usize,
    pub legacy_ids_skipped: usize,
}

/// Walks the vector store for `tenant_id` page by page, deleting any
/// vector whose corresponding metadata row is absent.
pub struct ConsistencyReconciler {
    metadata: Arc<dyn MetadataStore>,
    vectors: Arc<dyn VectorStore>,
    config: ReconcilerConfig,
}

impl ConsistencyReconciler {
    pub fn new(metadata: Arc<dyn MetadataStore>, vectors: Arc<dyn VectorStore>, config: ReconcilerConfig) -> Self {
        Self { metadata, vectors, config }
    }

    /// Run a full pass for `tenant_id`, paging until a short page signals
    /// the end of the store.
    pub async fn run(&self, tenant_id: &str) -> Result<ReconciliationReport> {
        let mut report = ReconciliationReport::default();
        let mut page = 0usize;

        loop {
            let ids = self
                .vectors
                .list_ids(tenant_id, page, self.config.page_size)
                .await?;
            if ids.is_empty() {
                break;
            }

            report.pages_scanned += 1;
            report.vectors_scanned += ids.len();

            // `list_ids` returns typed `Uuid`s already; the legacy-id skip
            // (§4.8) only matters at a real backend's string-id boundary,
            // so `legacy_ids_skipped` stays zero for every in-process port.
            let filters = crate::model::MemoryFilters {
                memory_ids_in: Some(ids.clone()),
                ..Default::default()
            };
            let present: std::collections::HashSet<Uuid> = self
                .metadata
                .list(tenant_id, &filters)
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect();

            for id in &ids {
                if !present.contains(id) {
                    self.vectors.delete_vector(*id, tenant_id).await?;
                    report.orphans_deleted += 1;
                }
            }

            let short_page = ids.len() < self.config.page_size;
            page += 1;
            if short_page {
                break;
            }
        }

        tracing::info!(
            tenant_id,
            pages = report.pages_scanned,
            orphans = report.orphans_deleted,
            "reconciliation pass complete"
        );
        Ok(report)
    }
}
