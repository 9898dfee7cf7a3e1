//! Hosts the four periodic jobs: AnalysisCache cleanup (30 min), MemoryStore
//! maintenance (24 h), GlobalMemory maintenance (12 h), Metrics retention
//! pruning (30 d). Each runs in its own `tokio::spawn` loop driven by
//! `tokio::time::interval`; a failing tick is logged and the loop keeps
//! going, the same isolation the teacher relies on when it hands a handler
//! chain invocation to `tokio::spawn` and logs rather than propagates.

use analysis_cache::AnalysisCache;
use global_memory::GlobalMemoryApi;
use memory_store::MemoryStoreApi;
use metrics::MetricsApi;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const MEMORY_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
pub const GLOBAL_MEMORY_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(12 * 60 * 60);
pub const METRICS_RETENTION_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
pub const METRICS_RETENTION_DAYS: i64 = metrics::DEFAULT_RETENTION_DAYS;

/// Runs one `AnalysisCache::cleanup` pass, returning the number of entries
/// evicted for expiry.
pub async fn run_cache_cleanup(cache: &AnalysisCache) -> cag_core::Result<usize> {
    cache.cleanup().await
}

/// Runs one `MemoryStore::run_maintenance` pass, returning the number of
/// conversations compacted.
pub async fn run_memory_maintenance(store: &dyn MemoryStoreApi) -> cag_core::Result<usize> {
    store.run_maintenance().await
}

/// Runs one `GlobalMemory::perform_maintenance` decay/prune pass.
pub async fn run_global_memory_maintenance(global: &dyn GlobalMemoryApi) -> cag_core::Result<()> {
    global.perform_maintenance().await
}

/// Runs one `Metrics::prune` pass, returning the number of events dropped.
pub async fn run_metrics_retention(metrics: &dyn MetricsApi) -> cag_core::Result<usize> {
    metrics.prune(METRICS_RETENTION_DAYS).await
}

fn log_tick<T: Debug>(job: &'static str, result: cag_core::Result<T>) {
    match result {
        Ok(value) => info!(job, ?value, "maintenance job tick complete"),
        Err(e) => error!(job, error = %e, "maintenance job tick failed"),
    }
}

fn spawn_job<F, Fut>(name: &'static str, interval: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            tick().await;
        }
    })
}

/// Owns the four background job tasks. Dropping or calling [`abort`] stops
/// them; otherwise they run for the lifetime of the process.
///
/// [`abort`]: MaintenanceScheduler::abort
pub struct MaintenanceScheduler {
    handles: Vec<JoinHandle<()>>,
}

impl MaintenanceScheduler {
    /// Spawns all four jobs. Each fires once immediately (the `tokio::time::
    /// interval` default) and then on its own cadence.
    pub fn start(cache: Arc<AnalysisCache>, memory_store: Arc<dyn MemoryStoreApi>, global_memory: Arc<dyn GlobalMemoryApi>, metrics: Arc<dyn MetricsApi>) -> Self {
        let cache_job = cache.clone();
        let memory_job = memory_store.clone();
        let global_memory_job = global_memory.clone();
        let metrics_job = metrics.clone();

        let handles = vec![
            spawn_job("analysis_cache_cleanup", CACHE_CLEANUP_INTERVAL, move || {
                let cache = cache_job.clone();
                async move { log_tick("analysis_cache_cleanup", run_cache_cleanup(&cache).await) }
            }),
            spawn_job("memory_store_maintenance", MEMORY_MAINTENANCE_INTERVAL, move || {
                let store = memory_job.clone();
                async move { log_tick("memory_store_maintenance", run_memory_maintenance(store.as_ref()).await) }
            }),
            spawn_job("global_memory_maintenance", GLOBAL_MEMORY_MAINTENANCE_INTERVAL, move || {
                let global = global_memory_job.clone();
                async move { log_tick("global_memory_maintenance", run_global_memory_maintenance(global.as_ref()).await) }
            }),
            spawn_job("metrics_retention", METRICS_RETENTION_INTERVAL, move || {
                let metrics = metrics_job.clone();
                async move { log_tick("metrics_retention", run_metrics_retention(metrics.as_ref()).await) }
            }),
        ];

        Self { handles }
    }

    /// Stops every job. Safe to call more than once.
    pub fn abort(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

impl Drop for MaintenanceScheduler {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_core::ids::ConversationId;
    use chrono::{Duration as ChronoDuration, Utc};
    use global_memory::{FileKeyValueStore, GlobalMemory};
    use memory_store::FileMemoryStore;
    use metrics::FileMetrics;
    use semantic_service::HashedBagOfWordsEmbedder;

    #[tokio::test]
    async fn run_memory_maintenance_compacts_every_conversation_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileMemoryStore::new(dir.path());
        let conversation_id = ConversationId::new("c1");
        let old_item = cag_types::MemoryItem::new("hola", "hola, en que te ayudo", 0.0, Utc::now() - ChronoDuration::days(45));
        store.update_memory(&conversation_id, None, old_item).await.unwrap();

        let processed = run_memory_maintenance(&store).await.unwrap();
        assert_eq!(processed, 1);
    }

    #[tokio::test]
    async fn run_global_memory_maintenance_resets_the_24h_counter() {
        let dir = tempfile::tempdir().unwrap();
        let semantic = Arc::new(HashedBagOfWordsEmbedder::new());
        let global = GlobalMemory::new(Arc::new(FileKeyValueStore::new(dir.path())), semantic, dir.path().join("feedback.jsonl"));
        global
            .update_global_memory("c1", vec![cag_types::Entity::new("Rust", cag_types::EntityType::Technology, 0.9, Utc::now())], vec![], "", &std::collections::HashMap::new())
            .await
            .unwrap();

        run_global_memory_maintenance(&global).await.unwrap();
        let stats = global.get_global_memory_stats().await.unwrap();
        assert_eq!(stats.updates_last_24h, 0);
    }

    #[tokio::test]
    async fn run_metrics_retention_drops_events_past_30_days() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("events.jsonl");
        let old = metrics::MetricEvent { timestamp: Utc::now() - ChronoDuration::days(40), operation_type: "context_built".into(), details: serde_json::json!({}), was_helpful: None };
        let mut line = serde_json::to_string(&old).unwrap();
        line.push('\n');
        tokio::fs::write(&log_path, line).await.unwrap();

        let metrics = FileMetrics::new(log_path);
        metrics.record_event("context_built", serde_json::json!({}), None).await.unwrap();

        let removed = run_metrics_retention(&metrics).await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn scheduler_start_and_abort_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(AnalysisCache::new(dir.path().join("cache")));
        let memory_store: Arc<dyn MemoryStoreApi> = Arc::new(FileMemoryStore::new(dir.path().join("memory")));
        let semantic = Arc::new(HashedBagOfWordsEmbedder::new());
        let global_memory: Arc<dyn GlobalMemoryApi> = Arc::new(GlobalMemory::new(Arc::new(FileKeyValueStore::new(dir.path().join("global"))), semantic, dir.path().join("global/feedback.jsonl")));
        let metrics: Arc<dyn MetricsApi> = Arc::new(FileMetrics::new(dir.path().join("events.jsonl")));

        let scheduler = MaintenanceScheduler::start(cache, memory_store, global_memory, metrics);
        scheduler.abort();
    }
}
