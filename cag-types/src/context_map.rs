//! `ContextMap`: the per-conversation document produced by the context
//! pipeline and consumed by the generation model.

use crate::entity::Entity;
use crate::global_memory::DomainKnowledge;
use crate::intent::Intent;
use crate::language::Language;
use crate::memory::MemoryItem;
use crate::reference::Reference;
use crate::sentiment::Sentiment;
use crate::structure::{MessageStructure, QuestionType};
use crate::topic::Topic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Short/long-term memory relevant to the current turn, attached to the
/// `ContextMap` at enrichment time. Not the full [`crate::Memory`] document:
/// only what the model needs to see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryView {
    #[serde(default)]
    pub recent: Vec<MemoryItem>,
    #[serde(default)]
    pub relevant: Vec<MemoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevantDocument {
    pub id: String,
    pub name: String,
    pub relevance: f32,
    pub excerpt: String,
}

/// Subset of [`crate::GlobalMemoryDoc`] injected into a `ContextMap` by
/// `enrichContextWithGlobalMemory`; never the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalMemoryContext {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub domain_knowledge: HashMap<String, DomainKnowledge>,
}

/// The per-conversation structured snapshot produced and consumed by the
/// core. Fields prefixed `_` are metadata never surfaced to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMap {
    pub current_message: String,
    pub timestamp: DateTime<Utc>,
    pub conversation_id: String,
    pub last_updated: DateTime<Utc>,

    #[serde(default)]
    pub recent_messages: Vec<RecentMessage>,

    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    pub intent: Option<Intent>,
    pub sentiment: Option<Sentiment>,
    pub language: Option<Language>,
    pub message_structure: Option<MessageStructure>,
    pub question_type: Option<QuestionType>,

    pub is_follow_up: bool,
    pub follow_up_score: f32,
    #[serde(default)]
    pub references: Vec<Reference>,

    pub memory: MemoryView,
    #[serde(default)]
    pub available_documents: Vec<DocumentSummary>,
    #[serde(default)]
    pub relevant_documents: Vec<RelevantDocument>,

    pub last_bot_response: Option<String>,
    pub global_memory: Option<GlobalMemoryContext>,

    #[serde(rename = "_owner_id")]
    pub owner_id: Option<String>,
    #[serde(rename = "_authorized_users", default)]
    pub authorized_users: Vec<String>,
    #[serde(rename = "_is_fragmented", default)]
    pub is_fragmented: bool,
    #[serde(rename = "_version_id")]
    pub version_id: Option<String>,
    #[serde(rename = "_version_timestamp")]
    pub version_timestamp: Option<DateTime<Utc>>,
}

impl ContextMap {
    /// The minimal valid shape used for input-guard fallbacks: empty
    /// message, missing conversation id. Always has `current_message` and
    /// `timestamp` set, per the error-handling design's "every externally
    /// visible method documents an empty-but-valid fallback" rule.
    pub fn minimal(current_message: impl Into<String>, conversation_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            current_message: current_message.into(),
            timestamp: now,
            conversation_id: conversation_id.into(),
            last_updated: now,
            recent_messages: Vec::new(),
            entities: Vec::new(),
            topics: Vec::new(),
            intent: None,
            sentiment: None,
            language: None,
            message_structure: None,
            question_type: None,
            is_follow_up: false,
            follow_up_score: 0.0,
            references: Vec::new(),
            memory: MemoryView::default(),
            available_documents: Vec::new(),
            relevant_documents: Vec::new(),
            last_bot_response: None,
            global_memory: None,
            owner_id: None,
            authorized_users: Vec::new(),
            is_fragmented: false,
            version_id: None,
            version_timestamp: None,
        }
    }
}
