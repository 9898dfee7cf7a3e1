//! Relation extraction between entities already found in the same message:
//! a verb-pattern pass between ordered entity-type pairs, followed by a
//! looser co-occurrence pass. Grounded in the same ordered-pass shape as
//! `patterns.rs`, applied to pairs of entities instead of raw regexes.

use cag_types::{Entity, EntityType, Relation, RelationType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Confidence assigned to a verb-pattern relation.
const VERB_RELATION_CONFIDENCE: f32 = 0.75;
/// Confidence assigned to a bare co-occurrence relation.
const CO_OCCURRENCE_CONFIDENCE: f32 = 0.6;
/// Maximum character span between two mentions for co-occurrence to apply.
const CO_OCCURRENCE_WINDOW: usize = 50;

static FOUNDER_OF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)fundador(?:a)?\s+de").unwrap());
static WORKS_AT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)trabaja(?:ba)?\s+(?:en|para)").unwrap());
static LOCATED_IN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:ubicad[oa]|situad[oa]|con sede)\s+en").unwrap());

static VERB_PATTERNS: &[fn() -> (&'static Regex, &'static str, EntityType, EntityType)] = &[
    || (&FOUNDER_OF, "fundador_de", EntityType::Person, EntityType::Organization),
    || (&WORKS_AT, "trabaja_en", EntityType::Person, EntityType::Organization),
    || (&LOCATED_IN, "ubicado_en", EntityType::Organization, EntityType::Location),
];

/// Finds the byte offset of the first occurrence of `entity.name` in `text`
/// (case-insensitive). Returns `None` if the entity was never literally
/// mentioned (e.g. a catalog hit whose canonical name differs from the
/// text's wording).
fn first_occurrence(text: &str, entity: &Entity) -> Option<usize> {
    let lower_text = text.to_lowercase();
    let lower_name = entity.name.to_lowercase();
    lower_text.find(&lower_name)
}

/// Extracts both verb-pattern and co-occurrence relations among `entities`
/// as they appear in `text`.
pub fn extract_relations(entities: &[Entity], text: &str) -> Vec<Relation> {
    let positions: Vec<(usize, &Entity)> = entities
        .iter()
        .filter_map(|e| first_occurrence(text, e).map(|pos| (pos, e)))
        .collect();

    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut relations = Vec::new();

    for pattern_fn in VERB_PATTERNS {
        let (regex, name, source_type, target_type) = pattern_fn();
        for (src_pos, source) in &positions {
            if source.entity_type != source_type {
                continue;
            }
            for (tgt_pos, target) in &positions {
                if target.entity_type != target_type || source.key() == target.key() {
                    continue;
                }
                let (lo, hi) = if src_pos < tgt_pos { (*src_pos, *tgt_pos) } else { (*tgt_pos, *src_pos) };
                let Some(between) = text.get(lo..hi) else { continue };
                if regex.is_match(between) {
                    push_relation(&mut relations, &mut seen, source, target, RelationType::Named(name.to_string()), VERB_RELATION_CONFIDENCE);
                }
            }
        }
    }

    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let (pos_a, a) = positions[i];
            let (pos_b, b) = positions[j];
            if a.key() == b.key() {
                continue;
            }
            if pos_a.abs_diff(pos_b) <= CO_OCCURRENCE_WINDOW {
                push_relation(&mut relations, &mut seen, a, b, RelationType::CoOccurrence, CO_OCCURRENCE_CONFIDENCE);
            }
        }
    }

    relations.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    relations
}

fn push_relation(
    out: &mut Vec<Relation>,
    seen: &mut HashSet<(String, String, String)>,
    source: &Entity,
    target: &Entity,
    relation_type: RelationType,
    confidence: f32,
) {
    let type_key = match &relation_type {
        RelationType::Named(n) => n.clone(),
        RelationType::CoOccurrence => "co_occurrence".to_string(),
    };
    let dedup_key = (source.name.to_lowercase(), target.name.to_lowercase(), type_key);
    if !seen.insert(dedup_key) {
        return;
    }
    out.push(Relation { source: source.name.clone(), target: target.name.clone(), relation_type, confidence });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn detects_founder_of_relation() {
        let now = Utc::now();
        let text = "Elena es la fundadora de Acme Corp.";
        let entities = vec![
            Entity::new("Elena", EntityType::Person, 0.8, now),
            Entity::new("Acme Corp", EntityType::Organization, 0.8, now),
        ];
        let relations = extract_relations(&entities, text);
        assert!(relations.iter().any(|r| matches!(&r.relation_type, RelationType::Named(n) if n == "fundador_de")));
    }

    #[test]
    fn nearby_entities_without_a_verb_pattern_get_co_occurrence() {
        let now = Utc::now();
        let text = "Juan y Maria fueron a la tienda juntos ayer";
        let entities = vec![Entity::new("Juan", EntityType::Person, 0.8, now), Entity::new("Maria", EntityType::Person, 0.8, now)];
        let relations = extract_relations(&entities, text);
        assert!(relations.iter().any(|r| r.relation_type == RelationType::CoOccurrence));
    }

    #[test]
    fn distant_entities_get_no_co_occurrence_relation() {
        let now = Utc::now();
        let filler = "x".repeat(200);
        let text = format!("Juan dijo {filler} y mucho despues aparece Maria");
        let entities = vec![Entity::new("Juan", EntityType::Person, 0.8, now), Entity::new("Maria", EntityType::Person, 0.8, now)];
        assert!(extract_relations(&entities, &text).is_empty());
    }

    #[test]
    fn relations_are_deduplicated() {
        let now = Utc::now();
        let text = "Elena, fundadora de Acme, fundadora de Acme otra vez";
        let entities = vec![
            Entity::new("Elena", EntityType::Person, 0.8, now),
            Entity::new("Acme", EntityType::Organization, 0.8, now),
        ];
        let relations = extract_relations(&entities, text);
        assert_eq!(relations.iter().filter(|r| matches!(&r.relation_type, RelationType::Named(n) if n == "fundador_de")).count(), 1);
    }
}
