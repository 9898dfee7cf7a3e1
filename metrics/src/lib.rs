//! Append-only usage/feedback event log plus an aggregated per-entity-type
//! usage counter. Grounded in the teacher's `MessageRepository`
//! (`save` + `get_stats` + `cleanup_old_messages`), adapted from SQLite
//! rows to a JSONL file since this workspace has no database layer.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

pub const DEFAULT_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEvent {
    pub timestamp: DateTime<Utc>,
    pub operation_type: String,
    pub details: serde_json::Value,
    pub was_helpful: Option<bool>,
}

impl MetricEvent {
    fn entity_type(&self) -> Option<&str> {
        self.details.get("entity_type").and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntityUsageStats {
    pub total_uses: u64,
    pub helpful_uses: u64,
}

/// The `Metrics` capability contract: `{timestamp, operationType, details,
/// wasHelpful?}` events in, an `{entityType -> {totalUses, helpfulUses}}`
/// aggregate out.
#[async_trait]
pub trait MetricsApi: Send + Sync {
    async fn record_event(&self, operation_type: &str, details: serde_json::Value, was_helpful: Option<bool>) -> cag_core::Result<()>;

    async fn get_entity_usage_stats(&self) -> cag_core::Result<HashMap<String, EntityUsageStats>>;

    async fn prune(&self, retention_days: i64) -> cag_core::Result<usize>;
}

/// [`MetricsApi`] backed by an append-only JSONL file, one event per line.
/// The aggregate is derived on demand rather than cached, since the log is
/// expected to stay small between 30-day prunes.
pub struct FileMetrics {
    log_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileMetrics {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self { log_path: log_path.into(), write_lock: Mutex::new(()) }
    }

    async fn read_all(&self) -> cag_core::Result<Vec<MetricEvent>> {
        let bytes = match tokio::fs::read(&self.log_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let text = String::from_utf8_lossy(&bytes);
        let mut events = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(line)?);
        }
        Ok(events)
    }
}

#[async_trait]
impl MetricsApi for FileMetrics {
    async fn record_event(&self, operation_type: &str, details: serde_json::Value, was_helpful: Option<bool>) -> cag_core::Result<()> {
        let event = MetricEvent { timestamp: Utc::now(), operation_type: operation_type.to_string(), details, was_helpful };
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.log_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.log_path).await?;
        file.write_all(line.as_bytes()).await?;
        info!(operation_type, "recorded metrics event");
        Ok(())
    }

    async fn get_entity_usage_stats(&self) -> cag_core::Result<HashMap<String, EntityUsageStats>> {
        let events = self.read_all().await?;
        let mut stats: HashMap<String, EntityUsageStats> = HashMap::new();
        for event in &events {
            let Some(entity_type) = event.entity_type() else { continue };
            let entry = stats.entry(entity_type.to_string()).or_default();
            entry.total_uses += 1;
            if event.was_helpful == Some(true) {
                entry.helpful_uses += 1;
            }
        }
        Ok(stats)
    }

    async fn prune(&self, retention_days: i64) -> cag_core::Result<usize> {
        let cutoff = Utc::now() - Duration::days(retention_days);
        let events = self.read_all().await?;
        let before = events.len();
        let kept: Vec<MetricEvent> = events.into_iter().filter(|e| e.timestamp >= cutoff).collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        let _guard = self.write_lock.lock().await;
        let mut buffer = String::new();
        for event in &kept {
            buffer.push_str(&serde_json::to_string(event)?);
            buffer.push('\n');
        }
        cag_core::atomic::atomic_write(&self.log_path, buffer.as_bytes()).await?;
        info!(removed, retention_days, "pruned metrics events");
        Ok(removed)
    }
}
