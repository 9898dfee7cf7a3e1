//! Atomic on-disk writes: write to a temp file in the same directory, then
//! rename over the destination. Guarantees readers never observe a
//! partially-written file, per the concurrency model's durability rule.

use std::path::Path;
use tokio::fs;

/// Writes `contents` to `path` atomically. Creates parent directories if
/// missing.
pub async fn atomic_write(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("")
    ));
    fs::write(&tmp_path, contents).await?;
    fs::rename(&tmp_path, path).await?;
    Ok(())
}

/// Writes a serde-serializable value to `path` atomically as JSON.
pub async fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> crate::Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &bytes).await?;
    Ok(())
}

/// Reads and deserializes a JSON file. Returns `Ok(None)` if the file does
/// not exist so callers can degrade gracefully instead of treating a
/// missing document as an error.
pub async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> crate::Result<Option<T>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
