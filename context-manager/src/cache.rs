//! In-memory LRU+TTL cache of `ContextMap`s, keyed by `conversationId:userId`.
//! Grounded in `analysis-cache`'s `Mutex<LruCache<...>>` tier.

use cag_types::ContextMap;
use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

pub const MAX_CACHE_SIZE: usize = 100;
pub const CACHE_TTL_SECONDS: i64 = 600;

pub fn cache_key(conversation_id: &str, user_id: Option<&str>) -> String {
    format!("{conversation_id}:{}", user_id.unwrap_or(""))
}

pub struct ContextCache {
    inner: Mutex<LruCache<String, (ContextMap, DateTime<Utc>)>>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self { inner: Mutex::new(LruCache::new(NonZeroUsize::new(MAX_CACHE_SIZE).unwrap())) }
    }

    pub fn get(&self, key: &str) -> Option<ContextMap> {
        let mut guard = self.inner.lock().expect("context cache lock poisoned");
        if let Some((context, cached_at)) = guard.get(key) {
            if Utc::now() - *cached_at <= Duration::seconds(CACHE_TTL_SECONDS) {
                return Some(context.clone());
            }
            guard.pop(key);
        }
        None
    }

    pub fn put(&self, key: String, context: ContextMap) {
        let mut guard = self.inner.lock().expect("context cache lock poisoned");
        guard.put(key, (context, Utc::now()));
    }

    pub fn invalidate(&self, key: &str) {
        let mut guard = self.inner.lock().expect("context cache lock poisoned");
        guard.pop(key);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("context cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ContextCache {
    fn default() -> Self {
        Self::new()
    }
}
