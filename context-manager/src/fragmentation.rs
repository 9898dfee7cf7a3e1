//! Context fragmentation: a `ContextMap` whose serialized size exceeds
//! 100KB is split so no single write exceeds a reasonable file size. Array
//! fields longer than 10 are chunked into `{id}_fragment_{n}.json` files;
//! the base document keeps `_is_fragmented = true` and empties those fields.

use cag_core::atomic::atomic_write_json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

pub const MAX_FRAGMENT_SIZE_BYTES: usize = 100 * 1024;
pub const CHUNK_SIZE: usize = 10;

const FRAGMENTABLE_KEYS: &[&str] = &["entities", "topics", "recent_messages", "references", "available_documents", "relevant_documents"];

#[derive(Debug, Serialize, Deserialize)]
struct FragmentFile {
    r#type: String,
    key: String,
    index: usize,
    data: Vec<Value>,
    total: usize,
}

fn as_object_mut(value: &mut Value) -> &mut Map<String, Value> {
    value.as_object_mut().expect("ContextMap serializes to a JSON object")
}

/// Splits `value` (a serialized `ContextMap`) across fragment files under
/// `dir` if its size exceeds the 100KB threshold. Returns the (possibly
/// stripped) base value to persist at `{id}.json`.
pub async fn fragment_if_oversized(dir: &Path, id: &str, mut value: Value) -> cag_core::Result<Value> {
    let size = serde_json::to_vec(&value)?.len();
    if size <= MAX_FRAGMENT_SIZE_BYTES {
        return Ok(value);
    }

    let mut fragment_index = 0usize;
    {
        let object = as_object_mut(&mut value);
        for key in FRAGMENTABLE_KEYS {
            let Some(Value::Array(items)) = object.get(*key) else { continue };
            if items.len() <= CHUNK_SIZE {
                continue;
            }
            let chunks: Vec<Vec<Value>> = items.chunks(CHUNK_SIZE).map(|c| c.to_vec()).collect();
            let total = chunks.len();
            for (chunk_index, chunk) in chunks.into_iter().enumerate() {
                let fragment = FragmentFile { r#type: "fragment".to_string(), key: key.to_string(), index: chunk_index, data: chunk, total };
                let path = dir.join(format!("{id}_fragment_{fragment_index}.json"));
                atomic_write_json(&path, &fragment).await?;
                fragment_index += 1;
            }
            object.insert((*key).to_string(), Value::Array(Vec::new()));
        }
        object.insert("_is_fragmented".to_string(), Value::Bool(true));
    }

    Ok(value)
}

/// Reassembles a fragmented base document by enumerating `{id}_fragment_*.json`
/// files under `dir`, grouping by key, sorting by index, and concatenating.
pub async fn reassemble(dir: &Path, id: &str, mut value: Value) -> cag_core::Result<Value> {
    let is_fragmented = value.get("_is_fragmented").and_then(Value::as_bool).unwrap_or(false);
    if !is_fragmented {
        return Ok(value);
    }

    let prefix = format!("{id}_fragment_");
    let mut by_key: std::collections::HashMap<String, Vec<FragmentFile>> = std::collections::HashMap::new();

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with(&prefix) || !name.ends_with(".json") {
            continue;
        }
        let bytes = tokio::fs::read(entry.path()).await?;
        let fragment: FragmentFile = serde_json::from_slice(&bytes)?;
        by_key.entry(fragment.key.clone()).or_default().push(fragment);
    }

    let object = as_object_mut(&mut value);
    for (key, mut fragments) in by_key {
        fragments.sort_by_key(|f| f.index);
        let items: Vec<Value> = fragments.into_iter().flat_map(|f| f.data).collect();
        object.insert(key, Value::Array(items));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_types::{ContextMap, Entity, EntityType};
    use chrono::Utc;

    fn big_context() -> ContextMap {
        let now = Utc::now();
        let mut context = ContextMap::minimal("hola", "c1", now);
        context.entities = (0..25).map(|i| Entity::new(format!("entity-{i}"), EntityType::Concept, 0.5, now)).collect();
        context
    }

    #[tokio::test]
    async fn a_small_context_is_not_fragmented() {
        let dir = tempfile::tempdir().unwrap();
        let context = ContextMap::minimal("hola", "c1", Utc::now());
        let value = serde_json::to_value(&context).unwrap();
        let result = fragment_if_oversized(dir.path(), "c1", value).await.unwrap();
        assert_eq!(result.get("_is_fragmented").and_then(Value::as_bool), None);
    }

    #[tokio::test]
    async fn fragments_round_trip_through_reassembly() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = big_context();
        context.current_message = "x".repeat(200_000);
        let value = serde_json::to_value(&context).unwrap();

        let stripped = fragment_if_oversized(dir.path(), "c1", value).await.unwrap();
        assert_eq!(stripped.get("_is_fragmented").and_then(Value::as_bool), Some(true));
        assert_eq!(stripped.get("entities").and_then(Value::as_array).map(Vec::len), Some(0));

        let reassembled = reassemble(dir.path(), "c1", stripped).await.unwrap();
        assert_eq!(reassembled.get("entities").and_then(Value::as_array).map(Vec::len), Some(25));
    }
}
