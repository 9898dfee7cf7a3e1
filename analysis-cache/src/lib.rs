//! # analysis-cache
//!
//! Content-addressed cache of semantic analyses: an in-memory LRU in front
//! of a disk tier, keyed by an MD5 hash of the normalized message text.
//! Grounded in `other_examples`'s `tokio::sync::Mutex<lru::LruCache<...>>`
//! pattern, with the disk tier modeled on `cag-core::atomic`'s crash-safe
//! writes.

mod cleanup;
mod disk;
mod key;
mod stats;

pub use cleanup::sweep;
pub use key::cache_key;
pub use stats::CacheStats;

use cag_types::{Entity, Intent, Language, MessageStructure, QuestionType, Sentiment, Topic};
use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Mutex;
use stats::StatsCounters;
use tracing::debug;

/// Capacity of the in-memory tier.
pub const MEMORY_CAPACITY: usize = 1000;
/// Time-to-live of both tiers.
pub const TTL: i64 = 3600;

/// The semantic-analysis fields a cache entry carries — everything
/// `ContextAnalyzer`'s semantic-extraction step produces that is safe to
/// reuse verbatim on a cache hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub entities: Vec<Entity>,
    pub topics: Vec<Topic>,
    pub intent: Intent,
    pub sentiment: Sentiment,
    pub language: Language,
    pub message_structure: MessageStructure,
    pub question_type: Option<QuestionType>,
}

struct MemoryTier {
    lru: LruCache<String, (CachedAnalysis, DateTime<Utc>)>,
}

/// Two-tier cache of semantic analyses. Cloneable: both tiers are
/// `Arc`-less here since the cache is expected to be held behind a single
/// `Arc<AnalysisCache>` by its owner, matching the teacher's ownership
/// style for shared collaborators.
pub struct AnalysisCache {
    memory: Mutex<MemoryTier>,
    disk_dir: PathBuf,
    counters: StatsCounters,
}

impl AnalysisCache {
    /// Creates a cache backed by `disk_dir` for its disk tier (created if
    /// missing on first write).
    pub fn new(disk_dir: impl Into<PathBuf>) -> Self {
        Self {
            memory: Mutex::new(MemoryTier { lru: LruCache::new(NonZeroUsize::new(MEMORY_CAPACITY).unwrap()) }),
            disk_dir: disk_dir.into(),
            counters: StatsCounters::default(),
        }
    }

    /// Looks up the cached analysis for `text`, checking the memory tier
    /// first and falling back to disk on a miss.
    pub async fn get(&self, text: &str) -> cag_core::Result<Option<CachedAnalysis>> {
        let key = cache_key(text);
        let now = Utc::now();
        let ttl = Duration::seconds(TTL);

        {
            let mut guard = self.memory.lock().expect("analysis cache memory lock poisoned");
            if let Some((analysis, cached_at)) = guard.lru.get(&key) {
                if now - *cached_at <= ttl {
                    let analysis = analysis.clone();
                    self.counters.record_hit();
                    return Ok(Some(analysis));
                }
                guard.lru.pop(&key);
            }
        }

        match disk::read(&self.disk_dir, &key, ttl, now).await? {
            Some(analysis) => {
                let mut guard = self.memory.lock().expect("analysis cache memory lock poisoned");
                guard.lru.put(key, (analysis.clone(), now));
                self.counters.record_hit();
                Ok(Some(analysis))
            }
            None => {
                self.counters.record_miss();
                Ok(None)
            }
        }
    }

    /// Stores `analysis` under the key derived from `text` in both tiers.
    pub async fn put(&self, text: &str, analysis: CachedAnalysis) -> cag_core::Result<()> {
        let key = cache_key(text);
        let now = Utc::now();
        disk::write(&self.disk_dir, &key, &analysis, now).await?;
        let mut guard = self.memory.lock().expect("analysis cache memory lock poisoned");
        guard.lru.put(key, (analysis, now));
        Ok(())
    }

    /// Runs the periodic probabilistic decay sweep over the disk tier.
    pub async fn cleanup(&self) -> cag_core::Result<usize> {
        let removed = sweep(&self.disk_dir).await?;
        debug!(removed, "analysis cache cleanup ran");
        Ok(removed)
    }

    /// Snapshot of hits/misses/current memory-tier size.
    pub fn stats(&self) -> CacheStats {
        let guard = self.memory.lock().expect("analysis cache memory lock poisoned");
        self.counters.snapshot(guard.lru.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_types::{IntentName, LanguageCode, MessageType, Complexity, SentimentLabel, SentimentStats};

    fn sample() -> CachedAnalysis {
        CachedAnalysis {
            entities: vec![],
            topics: vec![],
            intent: Intent { name: IntentName::Saludar, confidence: 0.9 },
            sentiment: Sentiment { label: SentimentLabel::Neutral, score: 0.0, intensity: 0.0, stats: SentimentStats::default() },
            language: Language::new(LanguageCode::Es, 0.9),
            message_structure: MessageStructure {
                message_type: MessageType::Casual,
                is_question: false,
                is_command: false,
                is_request: false,
                is_casual: true,
                complexity: Complexity::Simple,
                word_count: 1,
                sentence_count: 1,
                contains_code: false,
            },
            question_type: None,
        }
    }

    #[tokio::test]
    async fn put_then_get_is_a_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AnalysisCache::new(dir.path());
        cache.put("hola mundo", sample()).await.unwrap();
        assert!(cache.get("hola mundo").await.unwrap().is_some());
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn unknown_text_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AnalysisCache::new(dir.path());
        assert!(cache.get("nunca visto").await.unwrap().is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test]
    async fn memory_tier_survives_being_evicted_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AnalysisCache::new(dir.path());
        cache.put("texto de prueba", sample()).await.unwrap();
        std::fs::remove_file(dir.path().join(format!("{}.json", cache_key("texto de prueba")))).unwrap();
        assert!(cache.get("texto de prueba").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn key_normalization_makes_lookups_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AnalysisCache::new(dir.path());
        cache.put("Hola Mundo", sample()).await.unwrap();
        assert!(cache.get("hola   mundo").await.unwrap().is_some());
    }
}
