//! The process-wide shared memory document: entities/topics aggregated
//! across every conversation, plus lightweight domain knowledge snippets.

use crate::entity::Entity;
use crate::topic::Topic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A small bag of facts associated with a domain keyword (e.g. "cooking",
/// "finance"), surfaced when a current topic matches the domain name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainKnowledge {
    pub facts: Vec<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalMemoryStats {
    pub total_updates: u64,
    pub total_conversations: u64,
    #[serde(default)]
    pub conversation_ids: Vec<String>,
    pub updates_last_24h: u64,
}

/// The single process-wide document. Mutated only under `GlobalMemory`'s
/// own critical section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalMemoryDoc {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub domain_knowledge: HashMap<String, DomainKnowledge>,
    pub last_updated: DateTime<Utc>,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub stats: GlobalMemoryStats,
}

impl GlobalMemoryDoc {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            entities: Vec::new(),
            topics: Vec::new(),
            domain_knowledge: HashMap::new(),
            last_updated: now,
            last_maintenance: None,
            stats: GlobalMemoryStats::default(),
        }
    }
}
