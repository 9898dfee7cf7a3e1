//! In-memory fakes of the collaborator traits, for use in other crates'
//! test suites (enable the `test-support` feature as a dev-dependency).
//! Grounded in the teacher's `memory-inmemory`-style test doubles
//! (`Arc<RwLock<HashMap<...>>>`).

use crate::collaborators::{ConversationSnapshot, ConversationStore, Document, DocumentProcessor};
use crate::ids::ConversationId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A `ConversationStore` fake backed by an in-memory map, seeded by tests.
#[derive(Default, Clone)]
pub struct FakeConversationStore {
    conversations: Arc<RwLock<HashMap<String, ConversationSnapshot>>>,
}

impl FakeConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, id: &ConversationId, snapshot: ConversationSnapshot) {
        self.conversations.write().await.insert(id.0.clone(), snapshot);
    }
}

#[async_trait]
impl ConversationStore for FakeConversationStore {
    async fn get_conversation(&self, id: &ConversationId) -> anyhow::Result<ConversationSnapshot> {
        Ok(self.conversations.read().await.get(&id.0).cloned().unwrap_or_default())
    }
}

/// A `DocumentProcessor` fake backed by an in-memory map, seeded by tests.
#[derive(Default, Clone)]
pub struct FakeDocumentProcessor {
    documents: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl FakeDocumentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, id: &ConversationId, docs: Vec<Document>) {
        self.documents.write().await.insert(id.0.clone(), docs);
    }
}

#[async_trait]
impl DocumentProcessor for FakeDocumentProcessor {
    async fn get_conversation_documents(&self, id: &ConversationId) -> anyhow::Result<Vec<Document>> {
        Ok(self.documents.read().await.get(&id.0).cloned().unwrap_or_default())
    }

    async fn search_documents(&self, id: &ConversationId, query: &str) -> anyhow::Result<Vec<Document>> {
        let query = query.to_lowercase();
        Ok(self
            .documents
            .read()
            .await
            .get(&id.0)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|d| d.content.to_lowercase().contains(&query))
            .collect())
    }
}
