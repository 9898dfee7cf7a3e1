//! `resetMemory`'s backup-before-delete step: copy the conversation's
//! memory file into a timestamped backup directory before removing it.

use chrono::{DateTime, Utc};
use std::path::Path;

/// Copies `{dir}/{conversation_id}.json` into `{dir}/backup/{timestamp}/`
/// if it exists. A no-op (not an error) when there is nothing to back up.
pub async fn backup_before_reset(dir: &Path, conversation_id: &str, now: DateTime<Utc>) -> cag_core::Result<()> {
    let source = dir.join(format!("{conversation_id}.json"));
    if !source.exists() {
        return Ok(());
    }

    let backup_dir = dir.join("backup").join(now.format("%Y%m%dT%H%M%S").to_string());
    tokio::fs::create_dir_all(&backup_dir).await?;
    tokio::fs::copy(&source, backup_dir.join(format!("{conversation_id}.json"))).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn backs_up_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("conv-1.json"), b"{}").await.unwrap();

        let now = Utc::now();
        backup_before_reset(dir.path(), "conv-1", now).await.unwrap();

        let backup_dir = dir.path().join("backup").join(now.format("%Y%m%dT%H%M%S").to_string());
        assert!(backup_dir.join("conv-1.json").exists());
    }

    #[tokio::test]
    async fn missing_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        backup_before_reset(dir.path(), "nope", Utc::now()).await.unwrap();
    }
}
