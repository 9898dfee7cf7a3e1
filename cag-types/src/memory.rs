//! Per-conversation memory: one [`MemoryItem`] per (user turn, bot turn)
//! pair, held in a two-tier [`Memory`] document.

use crate::entity::Entity;
use crate::intent::Intent;
use crate::language::Language;
use crate::sentiment::Sentiment;
use crate::topic::Topic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single remembered exchange plus the metadata extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: Uuid,
    pub user_message: String,
    pub bot_response: String,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    pub sentiment: Option<Sentiment>,
    pub intent: Option<Intent>,
    pub language: Option<Language>,
    pub is_follow_up: Option<bool>,
    pub relevant_documents: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
    /// In `[0, 1]`; decays on read and drives short-term → long-term
    /// retention.
    pub relevance: f32,
    pub access_count: u32,
    pub last_accessed: DateTime<Utc>,
    /// Set by [`crate::Memory`] promotion; absent for items still in
    /// short-term.
    pub promoted_at: Option<DateTime<Utc>>,
}

impl MemoryItem {
    pub fn new(user_message: impl Into<String>, bot_response: impl Into<String>, relevance: f32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_message: user_message.into(),
            bot_response: bot_response.into(),
            entities: Vec::new(),
            topics: Vec::new(),
            sentiment: None,
            intent: None,
            language: None,
            is_follow_up: None,
            relevant_documents: None,
            timestamp: now,
            relevance: relevance.clamp(0.0, 1.0),
            access_count: 0,
            last_accessed: now,
            promoted_at: None,
        }
    }
}

/// Per-conversation memory: short-term (recent, capped at 25) and
/// long-term (relevance-filtered, capped at 100).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub conversation_id: String,
    pub user_id: Option<String>,
    #[serde(default)]
    pub short_term: Vec<MemoryItem>,
    #[serde(default)]
    pub long_term: Vec<MemoryItem>,
    pub last_accessed: DateTime<Utc>,
    pub item_count: usize,
}

impl Memory {
    pub fn new(conversation_id: impl Into<String>, user_id: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            user_id,
            short_term: Vec::new(),
            long_term: Vec::new(),
            last_accessed: now,
            item_count: 0,
        }
    }
}
