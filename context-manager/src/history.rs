//! Versioned history: every `update_context_map` (unless history saving is
//! disabled) writes a stamped copy to `context-history/{id}_{versionId}.json`.

use cag_core::atomic::atomic_write_json;
use cag_types::ContextMap;
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

/// Stamps `context` with a fresh version id/timestamp and writes it to
/// `history_dir`. Returns the stamped copy (the caller persists the base
/// document separately; this only covers the history snapshot).
pub async fn write_version(history_dir: &Path, mut context: ContextMap) -> cag_core::Result<ContextMap> {
    let version_id = Uuid::new_v4().to_string();
    context.version_id = Some(version_id.clone());
    context.version_timestamp = Some(Utc::now());

    let path = history_dir.join(format!("{}_{}.json", context.conversation_id, version_id));
    atomic_write_json(&path, &context).await?;
    Ok(context)
}

/// Lists the version ids for `conversation_id`, newest first.
pub async fn list_versions(history_dir: &Path, conversation_id: &str) -> cag_core::Result<Vec<String>> {
    let prefix = format!("{conversation_id}_");
    let mut versions: Vec<(String, chrono::DateTime<Utc>)> = Vec::new();

    let mut entries = match tokio::fs::read_dir(history_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(stripped) = name.strip_prefix(&prefix).and_then(|s| s.strip_suffix(".json")) else { continue };
        let bytes = tokio::fs::read(entry.path()).await?;
        let context: ContextMap = serde_json::from_slice(&bytes)?;
        let timestamp = context.version_timestamp.unwrap_or(context.last_updated);
        versions.push((stripped.to_string(), timestamp));
    }

    versions.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(versions.into_iter().map(|(id, _)| id).collect())
}

/// Reads a single historical version by id.
pub async fn read_version(history_dir: &Path, conversation_id: &str, version_id: &str) -> cag_core::Result<Option<ContextMap>> {
    let path = history_dir.join(format!("{conversation_id}_{version_id}.json"));
    cag_core::atomic::read_json(&path).await
}
