//! # context-analyzer
//!
//! Builds a [`ContextMap`] from a user message: semantic extraction
//! (language, entities, intent, topics, sentiment, structure), relationship
//! analysis, memory attachment, and document enrichment. Grounded in the
//! teacher's `ContextBuilder::build` (ordered multi-stage pipeline over
//! injected strategies, `tracing`-wrapped error isolation per stage).

mod documents;
mod intent;
mod language;
mod relationship;
mod semantic;
mod sentiment;
mod structure;
mod topics;

use analysis_cache::{AnalysisCache, CacheStats};
use async_trait::async_trait;
use cag_core::{ConversationId, ConversationStore, DocumentProcessor};
use cag_types::{ContextMap, MemoryView, MessageRole, RecentMessage};
use chrono::Utc;
use entity_extractor::EntityExtraction;
use memory_store::MemoryStoreApi;
use semantic_service::SemanticService;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

const RECENT_HISTORY_LIMIT: usize = 10;
const RECENT_MEMORY_LIMIT: usize = 5;
const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 300;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ContextAnalyzerStats {
    pub cache: CacheStats,
    pub context_count: usize,
}

/// The `ContextAnalyzer` capability contract.
#[async_trait]
pub trait ContextAnalyzerApi: Send + Sync {
    async fn analyze_message(&self, conversation_id: &ConversationId, user_id: Option<String>, message: &str) -> cag_core::Result<ContextMap>;

    async fn update_after_response(&self, conversation_id: &ConversationId, context: ContextMap, user_message: &str, bot_response: &str) -> cag_core::Result<ContextMap>;

    async fn get_stats(&self) -> cag_core::Result<ContextAnalyzerStats>;
}

/// Default [`ContextAnalyzerApi`] implementation, wired to the entity
/// extractor, analysis cache, memory store, and the conversation/document
/// collaborators.
pub struct ContextAnalyzer {
    entity_extractor: Arc<dyn EntityExtraction>,
    cache: AnalysisCache,
    conversation_store: Arc<dyn ConversationStore>,
    memory_store: Arc<dyn MemoryStoreApi>,
    document_processor: Arc<dyn DocumentProcessor>,
    semantic: Arc<dyn SemanticService>,
    contexts_dir: PathBuf,
}

impl ContextAnalyzer {
    pub fn new(
        entity_extractor: Arc<dyn EntityExtraction>,
        cache: AnalysisCache,
        conversation_store: Arc<dyn ConversationStore>,
        memory_store: Arc<dyn MemoryStoreApi>,
        document_processor: Arc<dyn DocumentProcessor>,
        semantic: Arc<dyn SemanticService>,
        contexts_dir: impl Into<PathBuf>,
    ) -> Self {
        Self { entity_extractor, cache, conversation_store, memory_store, document_processor, semantic, contexts_dir: contexts_dir.into() }
    }

    fn path_for(&self, conversation_id: &str) -> PathBuf {
        self.contexts_dir.join(format!("{conversation_id}.json"))
    }

    async fn persist(&self, context: &ContextMap) -> cag_core::Result<()> {
        cag_core::atomic::atomic_write_json(&self.path_for(&context.conversation_id), context).await
    }

    async fn recent_messages(&self, conversation_id: &ConversationId) -> Vec<RecentMessage> {
        let result = cag_core::retry_with_backoff(RETRY_ATTEMPTS, Duration::from_millis(RETRY_BASE_DELAY_MS), "get_conversation", || self.conversation_store.get_conversation(conversation_id)).await;

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(conversation_id = conversation_id.as_str(), error = %e, "failed to load conversation history, degrading to empty");
                Default::default()
            }
        };

        let start = snapshot.messages.len().saturating_sub(RECENT_HISTORY_LIMIT);
        snapshot.messages[start..]
            .iter()
            .map(|m| RecentMessage { role: if m.role.eq_ignore_ascii_case("user") { MessageRole::User } else { MessageRole::Bot }, content: m.content.clone(), timestamp: m.timestamp })
            .collect()
    }
}

#[async_trait]
impl ContextAnalyzerApi for ContextAnalyzer {
    async fn analyze_message(&self, conversation_id: &ConversationId, user_id: Option<String>, message: &str) -> cag_core::Result<ContextMap> {
        let now = Utc::now();

        if message.is_empty() {
            return Ok(ContextMap::minimal("", conversation_id.as_str(), now));
        }
        if conversation_id.as_str().is_empty() {
            return Ok(ContextMap::minimal(message, "", now));
        }

        let recent_messages = self.recent_messages(conversation_id).await;

        let analysis = match self.cache.get(message).await? {
            Some(cached) => cached,
            None => {
                let computed = semantic::extract(message, self.entity_extractor.as_ref(), now).await;
                self.cache.put(message, computed.clone()).await?;
                computed
            }
        };

        let relationship = relationship::analyze(message, &recent_messages, self.semantic.as_ref()).await;

        let memory = match self.memory_store.get_memory(conversation_id).await {
            Ok(mem) => {
                let relevant = self.memory_store.search_memory(conversation_id, message).await.unwrap_or_default();
                MemoryView { recent: mem.short_term.into_iter().take(RECENT_MEMORY_LIMIT).collect(), relevant }
            }
            Err(e) => {
                warn!(conversation_id = conversation_id.as_str(), error = %e, "failed to read memory, degrading to empty view");
                MemoryView::default()
            }
        };

        let documents = self.document_processor.get_conversation_documents(conversation_id).await.unwrap_or_else(|e| {
            warn!(conversation_id = conversation_id.as_str(), error = %e, "failed to load documents, degrading to none");
            Vec::new()
        });
        let (available_documents, relevant_documents) = documents::enrich(message, &documents, &analysis.entities, &analysis.topics, self.semantic.as_ref()).await;

        let last_bot_response = recent_messages.iter().rev().find(|m| m.role == MessageRole::Bot).map(|m| m.content.clone());

        let context = ContextMap {
            current_message: message.to_string(),
            timestamp: now,
            conversation_id: conversation_id.as_str().to_string(),
            last_updated: now,
            recent_messages,
            entities: analysis.entities,
            topics: analysis.topics,
            intent: Some(analysis.intent),
            sentiment: Some(analysis.sentiment),
            language: Some(analysis.language),
            message_structure: Some(analysis.message_structure),
            question_type: analysis.question_type,
            is_follow_up: relationship.is_follow_up,
            follow_up_score: relationship.follow_up_score,
            references: relationship.references,
            memory,
            available_documents,
            relevant_documents,
            last_bot_response,
            global_memory: None,
            owner_id: user_id,
            authorized_users: Vec::new(),
            is_fragmented: false,
            version_id: None,
            version_timestamp: None,
        };

        self.persist(&context).await?;
        Ok(context)
    }

    async fn update_after_response(&self, conversation_id: &ConversationId, mut context: ContextMap, user_message: &str, bot_response: &str) -> cag_core::Result<ContextMap> {
        let now = Utc::now();
        let language_hint = context.language.as_ref().map(|l| l.code.name().to_lowercase()).unwrap_or_else(|| "spanish".to_string());

        let response_entities = self.entity_extractor.extract_entities(bot_response, &language_hint).await.unwrap_or_default();
        let response_topics = topics::extract(bot_response, now);

        let mut seen_entities: HashSet<(String, cag_types::EntityType)> = context.entities.iter().map(|e| e.key()).collect();
        for entity in response_entities {
            if seen_entities.insert(entity.key()) {
                context.entities.push(entity);
            }
        }

        let mut seen_topics: HashSet<String> = context.topics.iter().map(|t| t.key()).collect();
        for topic in response_topics {
            if seen_topics.insert(topic.key()) {
                context.topics.push(topic);
            }
        }

        let mut item = cag_types::MemoryItem::new(user_message, bot_response, 0.0, now);
        item.entities = context.entities.clone();
        item.topics = context.topics.clone();
        item.sentiment = context.sentiment.clone();
        item.intent = context.intent.clone();
        item.language = context.language.clone();
        item.is_follow_up = Some(context.is_follow_up);

        let user_id = context.owner_id.clone();
        if let Err(e) = cag_core::retry_with_backoff(RETRY_ATTEMPTS, Duration::from_millis(RETRY_BASE_DELAY_MS), "update_memory", || self.memory_store.update_memory(conversation_id, user_id.clone(), item.clone())).await {
            warn!(conversation_id = conversation_id.as_str(), error = %e, "failed to update memory after response");
        }

        context.last_bot_response = Some(bot_response.to_string());
        context.last_updated = now;

        self.persist(&context).await?;
        Ok(context)
    }

    async fn get_stats(&self) -> cag_core::Result<ContextAnalyzerStats> {
        let cache = self.cache.stats();
        let mut context_count = 0;
        match tokio::fs::read_dir(&self.contexts_dir).await {
            Ok(mut entries) => {
                while let Ok(Some(entry)) = entries.next_entry().await {
                    if entry.path().extension().and_then(|e| e.to_str()) == Some("json") {
                        context_count += 1;
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(ContextAnalyzerStats { cache, context_count })
    }
}
