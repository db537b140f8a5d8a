//! Sparse BM25 strategy (§4.3): classical BM25 with `k1=1.5`, `b=0.75`,
//! whitespace-lowercase tokenization, over the tenant-scoped corpus.

use super::{RetrievalStrategy, StrategyResults};
use crate::error::Result;
use crate::model::MemoryFilters;
use crate::ports::MetadataStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// BM25 tuning constants. Defaults are the canonical `k1`/`b` values,
/// distinct from any BM25-like fallback a reranker might use internally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Config {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

/// `idf(t) = ln((N - df + 0.5) / (df + 0.5) + 1)`.
fn idf(corpus_size: usize, doc_freq: usize) -> f32 {
    let n = corpus_size as f32;
    let df = doc_freq as f32;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// Score one document's tokens against `query_terms`, given the corpus's
/// document frequencies and average document length.
pub fn bm25_score(
    query_terms: &[String],
    doc_tokens: &[String],
    doc_freq: &HashMap<String, usize>,
    corpus_size: usize,
    avg_doc_len: f32,
    config: &Bm25Config,
) -> f32 {
    if corpus_size == 0 || doc_tokens.is_empty() {
        return 0.0;
    }
    let doc_len = doc_tokens.len() as f32;
    let mut term_freq: HashMap<&str, usize> = HashMap::new();
    for t in doc_tokens {
        *term_freq.entry(t.as_str()).or_insert(0) += 1;
    }

    let mut score = 0.0_f32;
    for term in query_terms {
        let tf = *term_freq.get(term.as_str()).unwrap_or(&0) as f32;
        if tf == 0.0 {
            continue;
        }
        let df = *doc_freq.get(term).unwrap_or(&0);
        let term_idf = idf(corpus_size, df);
        let numerator = tf * (config.k1 + 1.0);
        let denominator = tf + config.k1 * (1.0 - config.b + config.b * (doc_len / avg_doc_len));
        score += term_idf * numerator / denominator;
    }
    score
}

/// BM25 over the full tenant-scoped corpus, fetched via the metadata
/// store's `list`.
pub struct SparseBm25Strategy {
    store: Arc<dyn MetadataStore>,
    config: Bm25Config,
}

impl SparseBm25Strategy {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self {
            store,
            config: Bm25Config::default(),
        }
    }

    pub fn with_config(store: Arc<dyn MetadataStore>, config: Bm25Config) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl RetrievalStrategy for SparseBm25Strategy {
    fn name(&self) -> &'static str {
        "sparse_bm25"
    }

    async fn search(
        &self,
        query: &str,
        tenant_id: &str,
        filters: &MemoryFilters,
        limit: usize,
    ) -> Result<StrategyResults> {
        let corpus = self.store.list(tenant_id, filters).await?;
        if corpus.is_empty() {
            return Ok(Vec::new());
        }

        let query_terms = tokenize(query);
        let tokenized_docs: Vec<(uuid::Uuid, Vec<String>)> =
            corpus.iter().map(|r| (r.id, tokenize(&r.content))).collect();

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for (_, tokens) in &tokenized_docs {
            let unique: std::collections::HashSet<&String> = tokens.iter().collect();
            for term in unique {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let total_len: usize = tokenized_docs.iter().map(|(_, t)| t.len()).sum();
        let avg_doc_len = total_len as f32 / tokenized_docs.len() as f32;
        let corpus_size = tokenized_docs.len();

        let mut scored: Vec<(uuid::Uuid, f32)> = tokenized_docs
            .into_iter()
            .map(|(id, tokens)| {
                let score = bm25_score(&query_terms, &tokens, &doc_freq, corpus_size, avg_doc_len, &self.config);
                (id, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}
