//! The disk tier: one JSON file per cache key under a configured
//! directory. Grounded in `cag-core::atomic` for crash-safe writes and in
//! `storage`'s repository style of one file/row per key.

use crate::CachedAnalysis;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct DiskEntry {
    analysis: CachedAnalysis,
    cached_at: DateTime<Utc>,
}

fn path_for(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

/// Writes `analysis` to the disk tier under `key`.
pub async fn write(dir: &Path, key: &str, analysis: &CachedAnalysis, now: DateTime<Utc>) -> cag_core::Result<()> {
    let entry = DiskEntry { analysis: analysis.clone(), cached_at: now };
    cag_core::atomic::atomic_write_json(&path_for(dir, key), &entry).await
}

/// Reads `key` from the disk tier. If the entry is older than `ttl`, it is
/// unlinked and treated as a miss, matching the read-time TTL eviction
/// policy.
pub async fn read(dir: &Path, key: &str, ttl: Duration, now: DateTime<Utc>) -> cag_core::Result<Option<CachedAnalysis>> {
    let path = path_for(dir, key);
    let Some(entry): Option<DiskEntry> = cag_core::atomic::read_json(&path).await? else {
        return Ok(None);
    };
    if now - entry.cached_at > ttl {
        let _ = tokio::fs::remove_file(&path).await;
        return Ok(None);
    }
    Ok(Some(entry.analysis))
}

/// Lists `(key, age)` pairs for every entry currently on disk, used by the
/// periodic decay sweep.
pub async fn list_ages(dir: &Path, now: DateTime<Utc>) -> cag_core::Result<Vec<(String, Duration)>> {
    let mut out = Vec::new();
    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = read_dir.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|s| s.to_str()) else { continue };
        let Some(disk_entry): Option<DiskEntry> = cag_core::atomic::read_json(&path).await? else { continue };
        out.push((key.to_string(), now - disk_entry.cached_at));
    }
    Ok(out)
}

/// Removes `key` from the disk tier, ignoring a missing-file error.
pub async fn remove(dir: &Path, key: &str) -> cag_core::Result<()> {
    match tokio::fs::remove_file(path_for(dir, key)).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
