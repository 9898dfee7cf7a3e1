//! # memory-store
//!
//! Per-conversation memory: short/long-term tiers, relevance scoring and
//! decay, search, promotion, and maintenance. Grounded in the teacher's
//! `memory::MemoryStore` trait (`add`/`get`/`update`/`delete`/`search_by_*`)
//! and `InMemoryVectorStore`'s `Arc<RwLock<HashMap<...>>>` concurrency
//! idiom, here holding whole [`Memory`] documents instead of individual
//! entries and write-through to disk on every mutation.

mod backup;
mod maintenance;
mod relevance;
mod search;

use async_trait::async_trait;
use cag_core::ConversationId;
use cag_types::{Memory, MemoryItem};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// The `MemoryStore` capability contract: `get_memory`, `update_memory`,
/// `search_memory`, `delete_memory`, `reset_memory`,
/// `promote_to_long_term_memory`.
#[async_trait]
pub trait MemoryStoreApi: Send + Sync {
    /// Loads a conversation's memory, applying read-time decay and access
    /// bookkeeping. Returns a fresh, empty [`Memory`] if none exists yet.
    async fn get_memory(&self, conversation_id: &ConversationId) -> cag_core::Result<Memory>;

    /// Scores `item`, prepends it to the short-term tier (spilling
    /// overflow into long-term), and persists the result.
    async fn update_memory(&self, conversation_id: &ConversationId, user_id: Option<String>, item: MemoryItem) -> cag_core::Result<Memory>;

    async fn search_memory(&self, conversation_id: &ConversationId, query: &str) -> cag_core::Result<Vec<MemoryItem>>;

    async fn delete_memory(&self, conversation_id: &ConversationId) -> cag_core::Result<()>;

    /// Backs up the conversation's memory file, then deletes it.
    async fn reset_memory(&self, conversation_id: &ConversationId) -> cag_core::Result<()>;

    async fn promote_to_long_term_memory(&self, conversation_id: &ConversationId, ids: &[Uuid]) -> cag_core::Result<Memory>;

    /// Runs daily maintenance (short-term pruning, long-term compaction)
    /// across every conversation currently on disk.
    async fn run_maintenance(&self) -> cag_core::Result<usize>;
}

/// Disk-backed [`MemoryStoreApi`] with an in-memory read/write-through
/// cache, one JSON document per conversation.
pub struct FileMemoryStore {
    dir: PathBuf,
    cache: RwLock<HashMap<String, Memory>>,
}

impl FileMemoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), cache: RwLock::new(HashMap::new()) }
    }

    fn path_for(&self, conversation_id: &str) -> PathBuf {
        self.dir.join(format!("{conversation_id}.json"))
    }

    async fn load(&self, conversation_id: &str) -> cag_core::Result<Memory> {
        if let Some(memory) = self.cache.read().await.get(conversation_id) {
            return Ok(memory.clone());
        }
        let loaded = cag_core::atomic::read_json(&self.path_for(conversation_id)).await?;
        let memory = loaded.unwrap_or_else(|| Memory::new(conversation_id, None, Utc::now()));
        self.cache.write().await.insert(conversation_id.to_string(), memory.clone());
        Ok(memory)
    }

    async fn persist(&self, memory: &Memory) -> cag_core::Result<()> {
        cag_core::atomic::atomic_write_json(&self.path_for(&memory.conversation_id), memory).await?;
        self.cache.write().await.insert(memory.conversation_id.clone(), memory.clone());
        Ok(())
    }
}

#[async_trait]
impl MemoryStoreApi for FileMemoryStore {
    async fn get_memory(&self, conversation_id: &ConversationId) -> cag_core::Result<Memory> {
        let mut memory = self.load(conversation_id.as_str()).await?;
        maintenance::apply_read_effects(&mut memory, Utc::now());
        self.persist(&memory).await?;
        Ok(memory)
    }

    async fn update_memory(&self, conversation_id: &ConversationId, user_id: Option<String>, mut item: MemoryItem) -> cag_core::Result<Memory> {
        let mut memory = self.load(conversation_id.as_str()).await?;
        if memory.user_id.is_none() {
            memory.user_id = user_id;
        }
        item.relevance = relevance::score(&item);
        maintenance::prepend_short_term(&mut memory, item);
        self.persist(&memory).await?;
        Ok(memory)
    }

    async fn search_memory(&self, conversation_id: &ConversationId, query: &str) -> cag_core::Result<Vec<MemoryItem>> {
        let memory = self.load(conversation_id.as_str()).await?;
        Ok(search::search(&memory, query))
    }

    async fn delete_memory(&self, conversation_id: &ConversationId) -> cag_core::Result<()> {
        self.cache.write().await.remove(conversation_id.as_str());
        match tokio::fs::remove_file(self.path_for(conversation_id.as_str())).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn reset_memory(&self, conversation_id: &ConversationId) -> cag_core::Result<()> {
        backup::backup_before_reset(&self.dir, conversation_id.as_str(), Utc::now()).await?;
        self.delete_memory(conversation_id).await
    }

    async fn promote_to_long_term_memory(&self, conversation_id: &ConversationId, ids: &[Uuid]) -> cag_core::Result<Memory> {
        let mut memory = self.load(conversation_id.as_str()).await?;
        maintenance::promote(&mut memory, ids, Utc::now());
        self.persist(&memory).await?;
        Ok(memory)
    }

    async fn run_maintenance(&self) -> cag_core::Result<usize> {
        let now = Utc::now();
        let mut processed = 0;
        let mut read_dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(conversation_id) = path.file_stem().and_then(|s| s.to_str()) else { continue };
            let Some(mut memory): Option<Memory> = cag_core::atomic::read_json(&path).await? else { continue };
            maintenance::compact(&mut memory, now);
            if let Err(e) = self.persist(&memory).await {
                warn!(conversation_id, error = %e, "memory maintenance failed to persist compacted document");
                continue;
            }
            processed += 1;
        }
        info!(processed, "memory store maintenance complete");
        Ok(processed)
    }
}
