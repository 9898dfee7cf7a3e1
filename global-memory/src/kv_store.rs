//! The key-value abstraction the global memory document sits behind, per
//! spec: `read("global_memory")` / `write("global_memory", doc)`.
//! Grounded in `storage`'s repository-over-a-backend pattern, generalized
//! here from a sqlite-specific store to a small trait so a different
//! backend can be swapped in without touching `GlobalMemoryStore`.

use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn read(&self, key: &str) -> cag_core::Result<Option<Vec<u8>>>;
    async fn write(&self, key: &str, value: &[u8]) -> cag_core::Result<()>;
}

/// File-per-key `KeyValueStore`, written atomically.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn read(&self, key: &str) -> cag_core::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &[u8]) -> cag_core::Result<()> {
        cag_core::atomic::atomic_write(&self.path_for(key), value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        store.write("global_memory", b"hello").await.unwrap();
        assert_eq!(store.read("global_memory").await.unwrap(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path());
        assert!(store.read("nope").await.unwrap().is_none());
    }
}
