//! The 12h maintenance sweep: decay stale entities/topics, drop the ones
//! that fall below their thresholds, and bound the stats' conversation log.

use cag_types::GlobalMemoryDoc;
use chrono::{DateTime, Utc};

const DECAY_BASE: f32 = 0.98;
const STALE_AFTER_DAYS: i64 = 7;
const MIN_ENTITY_CONFIDENCE: f32 = 0.1;
const MIN_ENTITY_OCCURRENCES: u32 = 2;
const MIN_TOPIC_CONFIDENCE: f32 = 0.1;
const MAX_CONVERSATION_IDS: usize = 1000;

fn decay_factor(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let days = (now - last_seen).num_days();
    if days <= STALE_AFTER_DAYS {
        1.0
    } else {
        DECAY_BASE.powf(days as f32 / 7.0)
    }
}

/// Decays confidence for entities/topics untouched in the last week, prunes
/// anything that falls under its floor, caps the conversation id log, and
/// resets the rolling 24h update counter.
pub fn run(doc: &mut GlobalMemoryDoc, now: DateTime<Utc>) {
    for entity in &mut doc.entities {
        entity.confidence *= decay_factor(entity.last_seen, now);
    }
    doc.entities.retain(|e| e.confidence >= MIN_ENTITY_CONFIDENCE && e.occurrences >= MIN_ENTITY_OCCURRENCES);

    for topic in &mut doc.topics {
        topic.confidence *= decay_factor(topic.last_seen, now);
    }
    doc.topics.retain(|t| t.confidence >= MIN_TOPIC_CONFIDENCE);

    if doc.stats.conversation_ids.len() > MAX_CONVERSATION_IDS {
        let drop = doc.stats.conversation_ids.len() - MAX_CONVERSATION_IDS;
        doc.stats.conversation_ids.drain(0..drop);
    }

    doc.stats.updates_last_24h = 0;
    doc.last_maintenance = Some(now);
}
