//! # context-manager
//!
//! Owns the `ContextMap` lifecycle: cache, per-conversation locking,
//! authorization, fragmentation, versioned history, validation, merging,
//! and the `processMessage`/`processResponse`/`searchContext`
//! orchestration. Grounded in the teacher's `ContextBuilder`
//! orchestration style and `langgraph-bot`'s per-key `DashMap` state table.

mod cache;
mod fragmentation;
mod history;
mod lock;
mod merge;
mod validation;

pub use cache::{cache_key, ContextCache, CACHE_TTL_SECONDS, MAX_CACHE_SIZE};
pub use lock::LockTable;
pub use merge::MergeStrategy;
pub use validation::{ValidationIssue, MAX_ENTITIES, MAX_TOPICS};

use async_trait::async_trait;
use cag_core::{ConversationId, Document, DocumentProcessor};
use cag_types::{ContextMap, Entity, MemoryItem, SensitivityLevel};
use context_analyzer::ContextAnalyzerApi;
use entity_extractor::EntityExtraction;
use global_memory::{EnrichmentOptions, GlobalMemoryApi};
use memory_store::MemoryStoreApi;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 300;

/// Per-call options for `update_context_map`.
#[derive(Debug, Clone, Copy)]
pub struct UpdateOptions {
    pub save_history: bool,
    pub strict_validation: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self { save_history: true, strict_validation: false }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextManagerStats {
    pub cached_contexts: usize,
}

/// Result of `search_context`: each collaborator's slot, independently
/// degraded to empty on failure.
#[derive(Debug, Default)]
pub struct SearchResult {
    pub entities: Vec<Entity>,
    pub memory: Vec<MemoryItem>,
    pub documents: Vec<Document>,
}

/// The `ContextManager` capability contract.
#[async_trait]
pub trait ContextManagerApi: Send + Sync {
    async fn get_context_map(&self, conversation_id: &ConversationId, user_id: Option<&str>) -> cag_core::Result<Option<ContextMap>>;

    async fn update_context_map(&self, user_id: Option<&str>, context: ContextMap, options: UpdateOptions) -> cag_core::Result<ContextMap>;

    async fn enrich_context(&self, context: ContextMap, authorized_access_level: SensitivityLevel) -> ContextMap;

    async fn process_message(&self, conversation_id: &ConversationId, user_id: Option<String>, message: &str) -> cag_core::Result<ContextMap>;

    async fn process_response(&self, conversation_id: &ConversationId, user_id: Option<String>, context: ContextMap, user_message: &str, bot_response: &str) -> cag_core::Result<ContextMap>;

    async fn search_context(&self, conversation_id: &ConversationId, query: &str) -> SearchResult;

    async fn delete_context(&self, conversation_id: &ConversationId, user_id: Option<&str>) -> cag_core::Result<()>;

    async fn get_context_version(&self, conversation_id: &ConversationId, version_id: &str) -> cag_core::Result<Option<ContextMap>>;

    async fn get_context_versions(&self, conversation_id: &ConversationId) -> cag_core::Result<Vec<String>>;

    fn get_context_stats(&self) -> ContextManagerStats;

    fn merge_contexts(&self, target: &ContextMap, source: &ContextMap, strategy: MergeStrategy) -> cag_core::Result<ContextMap>;
}

/// Default [`ContextManagerApi`] implementation.
pub struct ContextManager {
    analyzer: Arc<dyn ContextAnalyzerApi>,
    global_memory: Arc<dyn GlobalMemoryApi>,
    entity_extractor: Arc<dyn EntityExtraction>,
    memory_store: Arc<dyn MemoryStoreApi>,
    document_processor: Arc<dyn DocumentProcessor>,
    cache: ContextCache,
    locks: LockTable,
    contexts_dir: PathBuf,
    history_dir: PathBuf,
}

impl ContextManager {
    pub fn new(
        analyzer: Arc<dyn ContextAnalyzerApi>,
        global_memory: Arc<dyn GlobalMemoryApi>,
        entity_extractor: Arc<dyn EntityExtraction>,
        memory_store: Arc<dyn MemoryStoreApi>,
        document_processor: Arc<dyn DocumentProcessor>,
        contexts_dir: impl Into<PathBuf>,
        history_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            analyzer,
            global_memory,
            entity_extractor,
            memory_store,
            document_processor,
            cache: ContextCache::new(),
            locks: LockTable::new(),
            contexts_dir: contexts_dir.into(),
            history_dir: history_dir.into(),
        }
    }

    fn base_path(&self, conversation_id: &str) -> PathBuf {
        self.contexts_dir.join(format!("{conversation_id}.json"))
    }

    fn check_authorized(context: &ContextMap, user_id: Option<&str>) -> cag_core::Result<()> {
        let (Some(owner), Some(caller)) = (context.owner_id.as_deref(), user_id) else { return Ok(()) };
        if owner == caller || context.authorized_users.iter().any(|u| u == caller) {
            return Ok(());
        }
        Err(cag_core::Error::PermissionDenied(format!("user {caller} is not authorized for conversation {}", context.conversation_id)))
    }

    async fn load_from_disk(&self, conversation_id: &str) -> cag_core::Result<Option<ContextMap>> {
        let path = self.base_path(conversation_id);
        let Some(value): Option<serde_json::Value> = cag_core::atomic::read_json(&path).await? else { return Ok(None) };
        let reassembled = fragmentation::reassemble(&self.contexts_dir, conversation_id, value).await?;
        Ok(Some(serde_json::from_value(reassembled)?))
    }

    async fn persist(&self, context: &ContextMap, save_history: bool) -> cag_core::Result<()> {
        let value = serde_json::to_value(context)?;
        let stripped = fragmentation::fragment_if_oversized(&self.contexts_dir, &context.conversation_id, value).await?;
        cag_core::atomic::atomic_write_json(&self.base_path(&context.conversation_id), &stripped).await?;

        if save_history {
            history::write_version(&self.history_dir, context.clone()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ContextManagerApi for ContextManager {
    async fn get_context_map(&self, conversation_id: &ConversationId, user_id: Option<&str>) -> cag_core::Result<Option<ContextMap>> {
        let key = cache_key(conversation_id.as_str(), user_id);
        if let Some(context) = self.cache.get(&key) {
            return Ok(Some(context));
        }

        let context = self.load_from_disk(conversation_id.as_str()).await?;
        if let Some(context) = &context {
            self.cache.put(key, context.clone());
        }
        Ok(context)
    }

    async fn update_context_map(&self, user_id: Option<&str>, context: ContextMap, options: UpdateOptions) -> cag_core::Result<ContextMap> {
        Self::check_authorized(&context, user_id)?;
        validation::validate_or_log(&context, options.strict_validation)?;

        let lock_id = self.locks.acquire_lock(&context.conversation_id).await?;
        let result = self.persist(&context, options.save_history).await;
        self.locks.release_lock(&context.conversation_id, lock_id);
        result?;

        self.cache.put(cache_key(&context.conversation_id, user_id), context.clone());
        Ok(context)
    }

    async fn enrich_context(&self, mut context: ContextMap, authorized_access_level: SensitivityLevel) -> ContextMap {
        let options = EnrichmentOptions { current_topics: context.topics.iter().map(|t| t.name.clone()).collect(), authorized_access_level };
        match self.global_memory.get_global_memory_context(&context, &options).await {
            Ok(global) => context.global_memory = Some(global),
            Err(e) => warn!(conversation_id = %context.conversation_id, error = %e, "global memory enrichment failed, leaving context unenriched"),
        }
        context
    }

    async fn process_message(&self, conversation_id: &ConversationId, user_id: Option<String>, message: &str) -> cag_core::Result<ContextMap> {
        let analyzer = self.analyzer.clone();
        let cid = conversation_id.clone();
        let uid = user_id.clone();
        let msg = message.to_string();
        let context = cag_core::retry_with_backoff(RETRY_ATTEMPTS, Duration::from_millis(RETRY_BASE_DELAY_MS), "analyze_message", move || {
            let analyzer = analyzer.clone();
            let cid = cid.clone();
            let uid = uid.clone();
            let msg = msg.clone();
            async move { analyzer.analyze_message(&cid, uid, &msg).await }
        })
        .await?;

        let context = self.enrich_context(context, SensitivityLevel::Public).await;
        self.update_context_map(user_id.as_deref(), context, UpdateOptions::default()).await
    }

    async fn process_response(&self, conversation_id: &ConversationId, user_id: Option<String>, context: ContextMap, user_message: &str, bot_response: &str) -> cag_core::Result<ContextMap> {
        let analyzer = self.analyzer.clone();
        let cid = conversation_id.clone();
        let um = user_message.to_string();
        let br = bot_response.to_string();
        let updated = cag_core::retry_with_backoff(RETRY_ATTEMPTS, Duration::from_millis(RETRY_BASE_DELAY_MS), "update_after_response", move || {
            let analyzer = analyzer.clone();
            let cid = cid.clone();
            let context = context.clone();
            let um = um.clone();
            let br = br.clone();
            async move { analyzer.update_after_response(&cid, context, &um, &br).await }
        })
        .await?;

        if let Err(e) = self.global_memory.update_global_memory(conversation_id.as_str(), updated.entities.clone(), updated.topics.clone(), bot_response, &std::collections::HashMap::new()).await {
            warn!(conversation_id = %conversation_id, error = %e, "global memory update after response failed");
        }

        self.update_context_map(user_id.as_deref(), updated, UpdateOptions { save_history: true, strict_validation: false }).await
    }

    async fn search_context(&self, conversation_id: &ConversationId, query: &str) -> SearchResult {
        let (entities, memory, documents) = tokio::join!(
            self.entity_extractor.search_entities(query, None),
            self.memory_store.search_memory(conversation_id, query),
            self.document_processor.search_documents(conversation_id, query),
        );

        SearchResult {
            entities: entities.unwrap_or_else(|e| {
                warn!(error = %e, "search_entities failed, returning empty slot");
                Vec::new()
            }),
            memory: memory.unwrap_or_else(|e| {
                warn!(error = %e, "search_memory failed, returning empty slot");
                Vec::new()
            }),
            documents: documents.unwrap_or_else(|e| {
                warn!(error = %e, "search_documents failed, returning empty slot");
                Vec::new()
            }),
        }
    }

    async fn delete_context(&self, conversation_id: &ConversationId, user_id: Option<&str>) -> cag_core::Result<()> {
        if let Some(context) = self.load_from_disk(conversation_id.as_str()).await? {
            Self::check_authorized(&context, user_id)?;
        }

        let lock_id = self.locks.acquire_lock(conversation_id.as_str()).await?;
        let path = self.base_path(conversation_id.as_str());
        let result = match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(cag_core::Error::from(e)),
        };
        self.locks.release_lock(conversation_id.as_str(), lock_id);

        self.cache.invalidate(&cache_key(conversation_id.as_str(), user_id));
        result
    }

    async fn get_context_version(&self, conversation_id: &ConversationId, version_id: &str) -> cag_core::Result<Option<ContextMap>> {
        history::read_version(&self.history_dir, conversation_id.as_str(), version_id).await
    }

    async fn get_context_versions(&self, conversation_id: &ConversationId) -> cag_core::Result<Vec<String>> {
        history::list_versions(&self.history_dir, conversation_id.as_str()).await
    }

    fn get_context_stats(&self) -> ContextManagerStats {
        ContextManagerStats { cached_contexts: self.cache.len() }
    }

    fn merge_contexts(&self, target: &ContextMap, source: &ContextMap, strategy: MergeStrategy) -> cag_core::Result<ContextMap> {
        merge::merge_contexts(target, source, strategy)
    }
}
