//! Collaborator traits: the boundary of this repository. Real adapters
//! (HTTP conversation log, PDF/DOCX/XLSX parsers, ...) live in a host
//! binary and are injected here by constructor, breaking the
//! ContextAnalyzer↔MemoryStore↔GlobalMemory cycle the way the teacher's
//! `ContextStrategy` trait lets `memory-strategies` depend on
//! `memory-core` without depending on `memory`.

use crate::ids::ConversationId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One turn of conversation history as seen by the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// A conversation's history as returned by the external conversation store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<ConversationMessage>,
}

/// External store of conversation turns. Out of scope for this repo
/// (usually backed by the chat endpoint's own database); treated as a
/// black box here.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get_conversation(&self, id: &ConversationId) -> anyhow::Result<ConversationSnapshot>;
}

/// A document uploaded to a conversation, already parsed to plain text by
/// the (out-of-scope) `DocumentProcessor` implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub content: String,
}

/// External document parsing/search service (PDF/DOCX/XLSX parsing is out
/// of scope; this is the black-box contract the analyzer enriches against).
#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    async fn get_conversation_documents(&self, id: &ConversationId) -> anyhow::Result<Vec<Document>>;
    async fn search_documents(&self, id: &ConversationId, query: &str) -> anyhow::Result<Vec<Document>>;
}
