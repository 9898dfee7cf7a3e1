//! # global-memory
//!
//! The single process-wide entity/topic document shared across every
//! conversation: enrichment, update, feedback, and periodic decay. Grounded
//! in the teacher's `memory::MemoryStore` trait shape, generalized from
//! per-conversation documents to the one shared [`GlobalMemoryDoc`] behind
//! a [`KeyValueStore`], cached with a dynamic TTL per request volume.

mod enrichment;
mod feedback;
mod kv_store;
mod maintenance;
mod sensitivity;
mod ttl;
mod update;

pub use enrichment::EnrichmentOptions;
pub use feedback::FeedbackKind;
pub use kv_store::{FileKeyValueStore, KeyValueStore};

use async_trait::async_trait;
use cag_types::{Entity, EntityType, GlobalMemoryContext, GlobalMemoryDoc, GlobalMemoryStats, SensitivityLevel, Topic};
use chrono::Utc;
use metrics::MetricsApi;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

const GLOBAL_MEMORY_KEY: &str = "global_memory";

/// The `GlobalMemory` capability contract.
#[async_trait]
pub trait GlobalMemoryApi: Send + Sync {
    async fn get_global_memory_context(&self, context: &cag_types::ContextMap, options: &EnrichmentOptions) -> cag_core::Result<GlobalMemoryContext>;

    async fn update_global_memory(
        &self,
        conversation_id: &str,
        entities: Vec<Entity>,
        topics: Vec<Topic>,
        source_text: &str,
        overrides: &HashMap<String, SensitivityLevel>,
    ) -> cag_core::Result<()>;

    async fn reset_global_memory(&self) -> cag_core::Result<()>;

    async fn provide_feedback(&self, name: &str, entity_type: EntityType, kind: FeedbackKind) -> cag_core::Result<bool>;

    async fn perform_maintenance(&self) -> cag_core::Result<()>;

    async fn get_global_memory_stats(&self) -> cag_core::Result<GlobalMemoryStats>;
}

/// [`GlobalMemoryApi`] backed by a [`KeyValueStore`] with an in-process,
/// TTL-bounded read cache (per [`ttl::dynamic_ttl`]).
pub struct GlobalMemory {
    store: Arc<dyn KeyValueStore>,
    semantic: Arc<dyn semantic_service::SemanticService>,
    feedback_log_path: PathBuf,
    cache: RwLock<Option<(GlobalMemoryDoc, chrono::DateTime<Utc>)>>,
    metrics: Option<Arc<dyn MetricsApi>>,
}

impl GlobalMemory {
    pub fn new(store: Arc<dyn KeyValueStore>, semantic: Arc<dyn semantic_service::SemanticService>, feedback_log_path: impl Into<PathBuf>) -> Self {
        Self { store, semantic, feedback_log_path: feedback_log_path.into(), cache: RwLock::new(None), metrics: None }
    }

    /// Wires a [`MetricsApi`] sink so `provide_feedback` also emits a
    /// usage event, in addition to its own append-only feedback log.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsApi>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    async fn load(&self) -> cag_core::Result<GlobalMemoryDoc> {
        let now = Utc::now();
        if let Some((doc, cached_at)) = self.cache.read().await.as_ref() {
            if now - *cached_at < ttl::dynamic_ttl(doc.stats.updates_last_24h) {
                return Ok(doc.clone());
            }
        }

        let doc = match self.store.read(GLOBAL_MEMORY_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(cag_core::Error::from)?,
            None => GlobalMemoryDoc::new(now),
        };
        self.cache.write().await.replace((doc.clone(), now));
        Ok(doc)
    }

    async fn persist(&self, doc: GlobalMemoryDoc) -> cag_core::Result<()> {
        let bytes = serde_json::to_vec(&doc).map_err(cag_core::Error::from)?;
        self.store.write(GLOBAL_MEMORY_KEY, &bytes).await?;
        self.cache.write().await.replace((doc, Utc::now()));
        Ok(())
    }
}

#[async_trait]
impl GlobalMemoryApi for GlobalMemory {
    async fn get_global_memory_context(&self, context: &cag_types::ContextMap, options: &EnrichmentOptions) -> cag_core::Result<GlobalMemoryContext> {
        let doc = self.load().await?;
        Ok(enrichment::enrich(&doc, context, self.semantic.as_ref(), options, Utc::now()).await)
    }

    async fn update_global_memory(
        &self,
        conversation_id: &str,
        entities: Vec<Entity>,
        topics: Vec<Topic>,
        source_text: &str,
        overrides: &HashMap<String, SensitivityLevel>,
    ) -> cag_core::Result<()> {
        let mut doc = self.load().await?;
        let now = Utc::now();
        update::merge(&mut doc, entities, topics, source_text, overrides, now);
        update::record_conversation(&mut doc, conversation_id);
        self.persist(doc).await
    }

    async fn reset_global_memory(&self) -> cag_core::Result<()> {
        self.persist(GlobalMemoryDoc::new(Utc::now())).await
    }

    async fn provide_feedback(&self, name: &str, entity_type: EntityType, kind: FeedbackKind) -> cag_core::Result<bool> {
        let mut doc = self.load().await?;
        let applied = feedback::provide_feedback(&mut doc, &self.feedback_log_path, name, entity_type, kind, Utc::now()).await?;
        if applied {
            self.persist(doc).await?;
        }
        if let Some(metrics) = &self.metrics {
            let details = serde_json::json!({"entity_type": entity_type, "entity_name": name, "kind": kind, "applied": applied});
            if let Err(e) = metrics.record_event("feedback", details, Some(matches!(kind, FeedbackKind::Confirmation))).await {
                warn!(error = %e, "failed to record feedback metrics event");
            }
        }
        Ok(applied)
    }

    async fn perform_maintenance(&self) -> cag_core::Result<()> {
        let mut doc = self.load().await?;
        let before_entities = doc.entities.len();
        let before_topics = doc.topics.len();
        maintenance::run(&mut doc, Utc::now());
        info!(
            entities_dropped = before_entities.saturating_sub(doc.entities.len()),
            topics_dropped = before_topics.saturating_sub(doc.topics.len()),
            "global memory maintenance complete"
        );
        self.persist(doc).await
    }

    async fn get_global_memory_stats(&self) -> cag_core::Result<GlobalMemoryStats> {
        Ok(self.load().await?.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_types::ContextMap;
    use semantic_service::HashedBagOfWordsEmbedder;

    fn new_memory(dir: &std::path::Path) -> GlobalMemory {
        GlobalMemory::new(Arc::new(FileKeyValueStore::new(dir)), Arc::new(HashedBagOfWordsEmbedder::new()), dir.join("feedback.jsonl"))
    }

    #[tokio::test]
    async fn update_then_enrich_surfaces_the_new_entity() {
        let dir = tempfile::tempdir().unwrap();
        let memory = new_memory(dir.path());
        memory
            .update_global_memory("c1", vec![Entity::new("Rust", EntityType::Technology, 0.9, Utc::now())], vec![], "", &HashMap::new())
            .await
            .unwrap();

        let context = ContextMap::minimal("hablemos de programacion", "c2", Utc::now());
        let enriched = memory.get_global_memory_context(&context, &EnrichmentOptions::default()).await.unwrap();
        assert!(enriched.entities.iter().any(|e| e.name == "Rust"));
    }

    #[tokio::test]
    async fn reset_clears_entities_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let memory = new_memory(dir.path());
        memory
            .update_global_memory("c1", vec![Entity::new("Rust", EntityType::Technology, 0.9, Utc::now())], vec![], "", &HashMap::new())
            .await
            .unwrap();

        memory.reset_global_memory().await.unwrap();
        let stats = memory.get_global_memory_stats().await.unwrap();
        assert_eq!(stats.total_updates, 0);
    }

    #[tokio::test]
    async fn feedback_on_unknown_entity_reports_not_applied() {
        let dir = tempfile::tempdir().unwrap();
        let memory = new_memory(dir.path());
        let applied = memory.provide_feedback("ghost", EntityType::Person, FeedbackKind::Confirmation).await.unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn confirmed_feedback_is_also_recorded_as_a_metrics_event() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = Arc::new(metrics::FileMetrics::new(dir.path().join("events.jsonl")));
        let memory = new_memory(dir.path()).with_metrics(metrics.clone());
        memory
            .update_global_memory("c1", vec![Entity::new("Rust", EntityType::Technology, 0.5, Utc::now())], vec![], "", &HashMap::new())
            .await
            .unwrap();

        memory.provide_feedback("Rust", EntityType::Technology, FeedbackKind::Confirmation).await.unwrap();

        let stats = metrics.get_entity_usage_stats().await.unwrap();
        assert_eq!(stats["technology"].total_uses, 1);
        assert_eq!(stats["technology"].helpful_uses, 1);
    }

    #[tokio::test]
    async fn maintenance_persists_pruned_document() {
        let dir = tempfile::tempdir().unwrap();
        let memory = new_memory(dir.path());
        let stale = Entity::new("ghost", EntityType::Concept, 0.05, Utc::now() - chrono::Duration::days(400));
        memory.update_global_memory("c1", vec![stale], vec![], "", &HashMap::new()).await.unwrap();

        memory.perform_maintenance().await.unwrap();
        let stats = memory.get_global_memory_stats().await.unwrap();
        assert_eq!(stats.updates_last_24h, 0);
    }
}
