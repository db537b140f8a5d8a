//! Reflection Engine (C12): clusters long-term memories into REFLECTIVE
//! summaries (§4.9).

use crate::error::Result;
use crate::model::{Layer, MemoryFilters, MemoryRecord, ReflectionType};
use crate::ports::{LlmProvider, MetadataStore};
use crate::scoring::cosine_similarity;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

/// Tunables for one reflection cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionConfig {
    pub min_cluster_size: usize,
    pub min_confidence: f64,
    pub max_summary_tokens: u32,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            min_cluster_size: 5,
            min_confidence: 0.3,
            max_summary_tokens: 200,
        }
    }
}

/// Summary of one completed reflection cycle (§4.9 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleSummary {
    pub reflections_created: usize,
    pub memories_consolidated: usize,
    pub tokens_saved: u64,
}

/// Candidate cluster of co-accessed/co-tagged long-term memories, before a
/// reflection is generated from it.
#[derive(Debug, Clone)]
struct Cluster {
    members: Vec<MemoryRecord>,
}

fn shares_a_tag(a: &MemoryRecord, b: &MemoryRecord) -> bool {
    a.tags.intersection(&b.tags).next().is_some()
}

/// Group `records` into clusters of mutually co-tagged memories via
/// simple union-find over the "shares at least one tag" relation —
/// "co-accessed or co-tagged" per §4.9; tag overlap is the signal
/// available without an access-log port.
fn cluster_by_shared_tags(records: Vec<MemoryRecord>) -> Vec<Cluster> {
    let n = records.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], x: usize) -> usize {
        if parent[x] != x {
            parent[x] = find(parent, parent[x]);
        }
        parent[x]
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if shares_a_tag(&records[i], &records[j]) {
                let ri = find(&mut parent, i);
                let rj = find(&mut parent, j);
                if ri != rj {
                    parent[ri] = rj;
                }
            }
        }
    }

    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(i);
    }

    groups
        .into_values()
        .map(|indices| Cluster {
            members: indices.into_iter().map(|i| records[i].clone()).collect(),
        })
        .collect()
}

/// Mean pairwise cosine similarity across a cluster's embeddings, used as
/// the cluster's internal-cohesion confidence signal (§4.9 step 3).
fn mean_pairwise_similarity(embeddings: &[Vec<f32>]) -> f64 {
    if embeddings.len() < 2 {
        return 1.0;
    }
    let mut total = 0.0_f64;
    let mut count = 0usize;
    for i in 0..embeddings.len() {
        for j in (i + 1)..embeddings.len() {
            total += cosine_similarity(&embeddings[i], &embeddings[j]) as f64;
            count += 1;
        }
    }
    if count == 0 {
        1.0
    } else {
        (total / count as f64).clamp(0.0, 1.0)
    }
}

fn rule_based_summary(cluster: &Cluster) -> String {
    let tags: HashSet<&str> = cluster
        .members
        .iter()
        .flat_map(|m| m.tags.iter().map(|t| t.as_str()))
        .collect();
    let mut tag_list: Vec<&str> = tags.into_iter().collect();
    tag_list.sort_unstable();
    format!(
        "{} related memories ({}): {}",
        cluster.members.len(),
        tag_list.join(", "),
        cluster
            .members
            .iter()
            .map(|m| m.content.as_str())
            .take(3)
            .collect::<Vec<_>>()
            .join(" | ")
    )
}

/// Runs reflection cycles: clustering long-term memories and producing
/// REFLECTIVE summaries from each qualifying cluster.
pub struct ReflectionEngine {
    metadata: Arc<dyn MetadataStore>,
    llm: Option<Arc<dyn LlmProvider>>,
    config: ReflectionConfig,
}

impl ReflectionEngine {
    pub fn new(metadata: Arc<dyn MetadataStore>, llm: Option<Arc<dyn LlmProvider>>, config: ReflectionConfig) -> Self {
        Self { metadata, llm, config }
    }

    /// One reflection cycle over `tenant_id`'s long-term memories, given
    /// their embeddings (keyed by memory id) for cohesion scoring.
    pub async fn run_cycle(
        &self,
        tenant_id: &str,
        agent_id: &str,
        embeddings: &HashMap<Uuid, Vec<f32>>,
        now: DateTime<Utc>,
    ) -> Result<(Vec<MemoryRecord>, CycleSummary)> {
        let episodic = self
            .metadata
            .list(
                tenant_id,
                &MemoryFilters {
                    agent_id: Some(agent_id.to_string()),
                    layer: Some(Layer::LongTermEpisodic),
                    ..Default::default()
                },
            )
            .await?;
        let semantic = self
            .metadata
            .list(
                tenant_id,
                &MemoryFilters {
                    agent_id: Some(agent_id.to_string()),
                    layer: Some(Layer::LongTermSemantic),
                    ..Default::default()
                },
            )
            .await?;

        let mut candidates = episodic;
        candidates.extend(semantic);

        let clusters: Vec<Cluster> = cluster_by_shared_tags(candidates)
            .into_iter()
            .filter(|c| c.members.len() >= self.config.min_cluster_size)
            .collect();

        let mut reflections = Vec::new();
        let mut summary = CycleSummary::default();

        for cluster in &clusters {
            let cluster_embeddings: Vec<Vec<f32>> = cluster
                .members
                .iter()
                .filter_map(|m| embeddings.get(&m.id).cloned())
                .collect();
            let confidence = mean_pairwise_similarity(&cluster_embeddings);
            if confidence < self.config.min_confidence {
                continue;
            }

            let source_text = cluster
                .members
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n");

            let (summary_text, tokens_saved) = match &self.llm {
                Some(llm) => {
                    let generated = llm
                        .summarize(&source_text, self.config.max_summary_tokens)
                        .await?;
                    let saved = llm.count_tokens(&source_text).saturating_sub(llm.count_tokens(&generated));
                    (generated, saved as u64)
                }
                None => (rule_based_summary(cluster), 0),
            };

            let source_ids: Vec<Uuid> = cluster.members.iter().map(|m| m.id).collect();
            let importance = cluster
                .members
                .iter()
                .map(|m| m.importance)
                .fold(0.0_f64, f64::max);

            let mut reflection = MemoryRecord::new(
                tenant_id.to_string(),
                agent_id.to_string(),
                summary_text,
                Layer::Reflective,
                importance,
                now,
            );
            reflection.source_memory_ids = source_ids;
            reflection.reflection_type = Some(ReflectionType::Pattern);
            reflection.confidence = Some(confidence);

            self.metadata.store(reflection.clone()).await?;

            summary.memories_consolidated += cluster.members.len();
            summary.tokens_saved += tokens_saved;
            reflections.push(reflection);
        }

        summary.reflections_created = reflections.len();
        tracing::info!(
            tenant_id,
            agent_id,
            reflections = summary.reflections_created,
            consolidated = summary.memories_consolidated,
            "reflection cycle complete"
        );
        Ok((reflections, summary))
    }
}
