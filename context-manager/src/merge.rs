//! `mergeContexts(target, source, {strategy})`: recursively merges two
//! `ContextMap`s as JSON values. Strategies: `append | replace | keep |
//! smart` (default). For arrays under `smart`, items are deduplicated by
//! their JSON-canonical form and new ones appended; scalars follow `keep`
//! (existing wins) or `replace` (new wins).

use cag_types::ContextMap;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    Append,
    Replace,
    Keep,
    #[default]
    Smart,
}

fn canonical(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn merge_arrays(target: Vec<Value>, source: Vec<Value>, strategy: MergeStrategy) -> Vec<Value> {
    match strategy {
        MergeStrategy::Keep => target,
        MergeStrategy::Replace => source,
        MergeStrategy::Append => target.into_iter().chain(source).collect(),
        MergeStrategy::Smart => {
            let mut seen: std::collections::HashSet<String> = target.iter().map(canonical).collect();
            let mut merged = target;
            for item in source {
                let key = canonical(&item);
                if seen.insert(key) {
                    merged.push(item);
                }
            }
            merged
        }
    }
}

fn merge_scalars(target: Value, source: Value, strategy: MergeStrategy) -> Value {
    match strategy {
        MergeStrategy::Keep => target,
        MergeStrategy::Replace | MergeStrategy::Append => source,
        MergeStrategy::Smart => {
            if source.is_null() {
                target
            } else {
                source
            }
        }
    }
}

fn merge_values(target: Value, source: Value, strategy: MergeStrategy) -> Value {
    match (target, source) {
        (Value::Object(mut target_obj), Value::Object(source_obj)) => {
            for (key, source_value) in source_obj {
                let merged = match target_obj.remove(&key) {
                    Some(target_value) => merge_values(target_value, source_value, strategy),
                    None => source_value,
                };
                target_obj.insert(key, merged);
            }
            Value::Object(target_obj)
        }
        (Value::Array(target_arr), Value::Array(source_arr)) => Value::Array(merge_arrays(target_arr, source_arr, strategy)),
        (target_value, source_value) => merge_scalars(target_value, source_value, strategy),
    }
}

/// Merges `source` into `target` per `strategy`, returning the merged
/// `ContextMap`.
pub fn merge_contexts(target: &ContextMap, source: &ContextMap, strategy: MergeStrategy) -> cag_core::Result<ContextMap> {
    let target_value = serde_json::to_value(target)?;
    let source_value = serde_json::to_value(source)?;
    let merged_value = merge_values(target_value, source_value, strategy);
    Ok(serde_json::from_value(merged_value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_types::{Entity, EntityType};
    use chrono::Utc;

    fn context_with_entities(id: &str, names: &[&str]) -> ContextMap {
        let now = Utc::now();
        let mut context = ContextMap::minimal("hola", id, now);
        context.entities = names.iter().map(|n| Entity::new(*n, EntityType::Concept, 0.5, now)).collect();
        context
    }

    #[test]
    fn smart_merge_deduplicates_and_appends_new_entities() {
        let target = context_with_entities("c1", &["rust"]);
        let source = context_with_entities("c1", &["rust", "tokio"]);
        let merged = merge_contexts(&target, &source, MergeStrategy::Smart).unwrap();
        assert_eq!(merged.entities.len(), 2);
    }

    #[test]
    fn keep_strategy_preserves_the_target_array() {
        let target = context_with_entities("c1", &["rust"]);
        let source = context_with_entities("c1", &["tokio"]);
        let merged = merge_contexts(&target, &source, MergeStrategy::Keep).unwrap();
        assert_eq!(merged.entities.len(), 1);
        assert_eq!(merged.entities[0].name, "rust");
    }

    #[test]
    fn replace_strategy_prefers_the_source_array() {
        let target = context_with_entities("c1", &["rust"]);
        let source = context_with_entities("c1", &["tokio"]);
        let merged = merge_contexts(&target, &source, MergeStrategy::Replace).unwrap();
        assert_eq!(merged.entities.len(), 1);
        assert_eq!(merged.entities[0].name, "tokio");
    }

    #[test]
    fn append_strategy_concatenates_without_deduplicating() {
        let target = context_with_entities("c1", &["rust"]);
        let source = context_with_entities("c1", &["rust"]);
        let merged = merge_contexts(&target, &source, MergeStrategy::Append).unwrap();
        assert_eq!(merged.entities.len(), 2);
    }
}
