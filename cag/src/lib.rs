//! # cag
//!
//! Context-Augmented Generation middleware: per-conversation context
//! analysis and lifecycle management, a shared cross-conversation memory,
//! and the background maintenance that keeps both tidy.
//!
//! [`Cag::bootstrap`] wires every component crate together against a
//! [`cag_core::Config`] and the two collaborator traits a host application
//! supplies (`ConversationStore`, `DocumentProcessor`); the resulting
//! [`Cag`] exposes `context_manager`/`global_memory`/`metrics` as trait
//! objects and owns the maintenance scheduler for the process's lifetime.
//! Mirrors the teacher's `memory` crate, which re-exports `types`/`store`/
//! `embedding` as one facade over the same kind of layered components.
//!
//! ## Modules
//!
//! - [`context_analyzer`] — builds a [`cag_types::ContextMap`] from a message
//! - [`context_manager`] — owns the `ContextMap` lifecycle
//! - [`global_memory`] — the shared, process-wide entity/topic store
//! - [`memory_store`] — per-conversation short/long-term memory
//! - [`entity_extractor`] — catalog-backed named-entity recognition
//! - [`analysis_cache`] — caches the semantic-analysis pipeline's output
//! - [`semantic_service`] — the embedding/similarity capability contract
//! - [`maintenance`] — the four periodic background jobs
//! - [`metrics`] — usage/feedback event log and aggregates

pub use analysis_cache;
pub use cag_core;
pub use cag_types;
pub use context_analyzer;
pub use context_manager;
pub use entity_extractor;
pub use global_memory;
pub use maintenance;
pub use memory_store;
pub use metrics;
pub use semantic_service;

pub use cag_core::{Config, Error, Result};
pub use context_manager::{ContextManager, ContextManagerApi};
pub use global_memory::{GlobalMemory, GlobalMemoryApi};
pub use maintenance::MaintenanceScheduler;
pub use metrics::{FileMetrics, MetricsApi};

use analysis_cache::AnalysisCache;
use cag_core::{ConversationStore, DocumentProcessor};
use context_analyzer::ContextAnalyzer;
use entity_extractor::EntityExtractor;
use global_memory::{FileKeyValueStore, GlobalMemory as GlobalMemoryImpl};
use memory_store::FileMemoryStore;
use semantic_service::HashedBagOfWordsEmbedder;
use std::path::Path;
use std::sync::Arc;

/// A fully wired CAG middleware instance: the public capability contracts a
/// host application drives, plus the background jobs that keep them tidy.
pub struct Cag {
    pub context_manager: Arc<dyn ContextManagerApi>,
    pub global_memory: Arc<dyn GlobalMemoryApi>,
    pub metrics: Arc<dyn MetricsApi>,
    maintenance: MaintenanceScheduler,
}

impl Cag {
    /// Wires every component crate's default (file-backed) implementation
    /// together under `config.data_dir`, and starts the maintenance jobs.
    ///
    /// `conversation_store` and `document_processor` are the host
    /// application's own collaborators — this crate only defines the
    /// contracts ([`cag_core::ConversationStore`],
    /// [`cag_core::DocumentProcessor`]) it needs from them.
    pub fn bootstrap(config: &Config, conversation_store: Arc<dyn ConversationStore>, document_processor: Arc<dyn DocumentProcessor>) -> cag_core::Result<Self> {
        let data_dir = Path::new(&config.data_dir);

        let entity_extractor = Arc::new(EntityExtractor::load(data_dir.join("entities"))?);
        let semantic: Arc<dyn semantic_service::SemanticService> = Arc::new(HashedBagOfWordsEmbedder::new());
        let memory_store = Arc::new(FileMemoryStore::new(data_dir.join("memory")));

        let metrics: Arc<dyn MetricsApi> = Arc::new(FileMetrics::new(data_dir.join("metrics/events.jsonl")));

        let global_memory_store = Arc::new(FileKeyValueStore::new(data_dir.join("global_memory")));
        let global_memory: Arc<dyn GlobalMemoryApi> =
            Arc::new(GlobalMemoryImpl::new(global_memory_store, semantic.clone(), data_dir.join("global_memory/feedback.jsonl")).with_metrics(metrics.clone()));

        let analyzer = Arc::new(ContextAnalyzer::new(
            entity_extractor.clone(),
            AnalysisCache::new(data_dir.join("contexts/cache")),
            conversation_store,
            memory_store.clone(),
            document_processor.clone(),
            semantic,
            data_dir.join("contexts"),
        ));

        let context_manager: Arc<dyn ContextManagerApi> = Arc::new(ContextManager::new(
            analyzer,
            global_memory.clone(),
            entity_extractor,
            memory_store.clone(),
            document_processor,
            data_dir.join("contexts"),
            data_dir.join("context-history"),
        ));

        // The scheduler sweeps the same on-disk cache directory through its
        // own `AnalysisCache` handle; cleanup only touches the disk tier, so
        // a second in-process LRU here costs nothing beyond its own memory.
        let scheduler_cache = Arc::new(AnalysisCache::new(data_dir.join("contexts/cache")));
        let maintenance = MaintenanceScheduler::start(scheduler_cache, memory_store, global_memory.clone(), metrics.clone());

        Ok(Self { context_manager, global_memory, metrics, maintenance })
    }

    /// Stops the background maintenance jobs. Also runs on `Drop`.
    pub fn shutdown(&self) {
        self.maintenance.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_core::test_support::{FakeConversationStore, FakeDocumentProcessor};
    use cag_core::ids::ConversationId;

    #[tokio::test]
    async fn bootstrap_wires_a_usable_context_manager() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { data_dir: dir.path().to_string_lossy().to_string(), ..Config::default() };

        let cag = Cag::bootstrap(&config, Arc::new(FakeConversationStore::new()), Arc::new(FakeDocumentProcessor::new())).unwrap();

        let conversation_id = ConversationId::new("c1");
        let context = cag.context_manager.process_message(&conversation_id, Some("u1".into()), "hola, gracias por tu ayuda").await.unwrap();
        assert_eq!(context.owner_id.as_deref(), Some("u1"));

        cag.shutdown();
    }
}
