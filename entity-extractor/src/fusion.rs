//! Merges pattern-matched and catalog-matched entities into the final,
//! bounded result set. Grounded in `memory/src/inmemory_store.rs`'s
//! dedup-by-key-then-sort-then-truncate shape used when ranking memories.

use cag_types::Entity;
use std::collections::HashMap;

/// Hard cap on entities returned from a single extraction pass.
pub const MAX_ENTITIES: usize = 15;

/// Deduplicates `candidates` by `(lower(name), type)`, keeping the
/// highest-confidence observation of each (ties broken by occurrence count),
/// sorts by confidence descending then name length descending, and
/// truncates to [`MAX_ENTITIES`].
pub fn fuse(candidates: Vec<Entity>) -> Vec<Entity> {
    let mut by_key: HashMap<(String, cag_types::EntityType), Entity> = HashMap::new();

    for candidate in candidates {
        let key = candidate.key();
        match by_key.get_mut(&key) {
            Some(existing) => {
                existing.occurrences += 1;
                if candidate.confidence > existing.confidence {
                    existing.confidence = candidate.confidence;
                }
                if existing.description.is_none() {
                    existing.description = candidate.description;
                }
                for alias in candidate.aliases {
                    if !existing.aliases.contains(&alias) {
                        existing.aliases.push(alias);
                    }
                }
                if candidate.last_seen > existing.last_seen {
                    existing.last_seen = candidate.last_seen;
                }
            }
            None => {
                by_key.insert(key, candidate);
            }
        }
    }

    let mut merged: Vec<Entity> = by_key.into_values().collect();
    merged.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.name.len().cmp(&a.name.len()))
    });
    merged.truncate(MAX_ENTITIES);
    merged
}
