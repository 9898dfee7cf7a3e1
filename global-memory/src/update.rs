//! Merges freshly observed entities/topics into the global memory
//! document: bump-in-place on a known key, append with sensitivity
//! classification otherwise. Grounded in `memory-strategies`'s
//! accumulate-then-cap shape.

use crate::sensitivity;
use cag_types::{Entity, GlobalMemoryDoc, SensitivityLevel, Topic};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub const MAX_ENTITIES: usize = 200;
pub const MAX_TOPICS: usize = 50;

/// Merges `new_entities`/`new_topics` into `doc`, classifying the
/// sensitivity of any newly appended entity from `source_text` and
/// `overrides`, then truncates both collections to their caps.
pub fn merge(doc: &mut GlobalMemoryDoc, new_entities: Vec<Entity>, new_topics: Vec<Topic>, source_text: &str, overrides: &HashMap<String, SensitivityLevel>, now: DateTime<Utc>) {
    for incoming in new_entities {
        let key = incoming.key();
        if let Some(existing) = doc.entities.iter_mut().find(|e| e.key() == key) {
            existing.occurrences += 1;
            existing.confidence = existing.confidence.max(incoming.confidence);
            existing.last_seen = now;
            if existing.description.is_none() {
                existing.description = incoming.description;
            }
            if existing.embedding.is_none() {
                existing.embedding = incoming.embedding;
            }
            existing.sensitivity_level = existing.sensitivity_level.more_restrictive(incoming.sensitivity_level);
        } else {
            let mut entity = incoming;
            entity.sensitivity_level = sensitivity::classify(&entity.name, entity.entity_type, source_text, overrides);
            doc.entities.push(entity);
        }
    }

    for incoming in new_topics {
        let key = incoming.key();
        if let Some(existing) = doc.topics.iter_mut().find(|t| t.key() == key) {
            let weight = 1.0 / (existing.occurrences as f32 + 1.0);
            existing.confidence = existing.confidence * (1.0 - weight) + incoming.confidence * weight;
            existing.occurrences += 1;
            existing.last_seen = now;
        } else {
            doc.topics.push(incoming);
        }
    }

    doc.entities.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    doc.entities.truncate(MAX_ENTITIES);
    doc.topics.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    doc.topics.truncate(MAX_TOPICS);

    doc.last_updated = now;
    doc.stats.total_updates += 1;
    doc.stats.updates_last_24h += 1;
}

/// Records `conversation_id` in the document's stats, capped at the most
/// recent 1000 (actual capping happens during maintenance; this just
/// appends and bumps the conversation count on first sight).
pub fn record_conversation(doc: &mut GlobalMemoryDoc, conversation_id: &str) {
    if !doc.stats.conversation_ids.iter().any(|id| id == conversation_id) {
        doc.stats.conversation_ids.push(conversation_id.to_string());
        doc.stats.total_conversations += 1;
    }
}
