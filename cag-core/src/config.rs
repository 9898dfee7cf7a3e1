//! Runtime configuration: every named constant from the external-interfaces
//! section is a `Config` field with the spec's default, overridable via
//! environment variable. Mirrors the teacher's `EnvEmbeddingConfig::from_env`
//! / `validate` split.

use std::env;
use std::time::Duration;

/// All tunables of the context pipeline and memory fabric, loaded from the
/// environment with the spec's defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for the persisted layout (`contexts/`, `memory/`, ...).
    pub data_dir: String,

    pub max_context_messages: usize,
    pub max_topics: usize,
    pub max_entities: usize,
    pub similarity_threshold: f32,

    pub max_cache_entries: usize,
    pub cache_expiry: Duration,

    pub max_short_term_items: usize,
    pub max_long_term_items: usize,
    pub memory_decay_factor: f64,
    pub relevance_threshold: f32,

    pub max_global_entities: usize,
    pub max_global_topics: usize,
    pub min_entity_occurrences: u32,
    pub global_memory_decay: f64,

    pub context_cache_ttl: Duration,
    pub max_context_cache_size: usize,
    pub max_context_fragment_size: usize,
    pub lock_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            max_context_messages: 10,
            max_topics: 5,
            max_entities: 15,
            similarity_threshold: 0.75,
            max_cache_entries: 1000,
            cache_expiry: Duration::from_secs(3600),
            max_short_term_items: 25,
            max_long_term_items: 100,
            memory_decay_factor: 0.95,
            relevance_threshold: 0.2,
            max_global_entities: 200,
            max_global_topics: 50,
            min_entity_occurrences: 2,
            global_memory_decay: 0.98,
            context_cache_ttl: Duration::from_secs(600),
            max_context_cache_size: 100,
            max_context_fragment_size: 100 * 1024,
            lock_timeout: Duration::from_secs(3),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to the
    /// spec's defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env::var("CAG_DATA_DIR").unwrap_or(defaults.data_dir),
            max_context_messages: env_usize("CAG_MAX_CONTEXT_MESSAGES", defaults.max_context_messages),
            max_topics: env_usize("CAG_MAX_TOPICS", defaults.max_topics),
            max_entities: env_usize("CAG_MAX_ENTITIES", defaults.max_entities),
            similarity_threshold: env_f32("CAG_SIMILARITY_THRESHOLD", defaults.similarity_threshold),
            max_cache_entries: env_usize("CAG_MAX_CACHE_ENTRIES", defaults.max_cache_entries),
            cache_expiry: defaults.cache_expiry,
            max_short_term_items: env_usize("CAG_MAX_SHORT_TERM_ITEMS", defaults.max_short_term_items),
            max_long_term_items: env_usize("CAG_MAX_LONG_TERM_ITEMS", defaults.max_long_term_items),
            memory_decay_factor: defaults.memory_decay_factor,
            relevance_threshold: env_f32("CAG_RELEVANCE_THRESHOLD", defaults.relevance_threshold),
            max_global_entities: env_usize("CAG_MAX_GLOBAL_ENTITIES", defaults.max_global_entities),
            max_global_topics: env_usize("CAG_MAX_GLOBAL_TOPICS", defaults.max_global_topics),
            min_entity_occurrences: defaults.min_entity_occurrences,
            global_memory_decay: defaults.global_memory_decay,
            context_cache_ttl: defaults.context_cache_ttl,
            max_context_cache_size: env_usize("CAG_MAX_CONTEXT_CACHE_SIZE", defaults.max_context_cache_size),
            max_context_fragment_size: env_usize(
                "CAG_MAX_CONTEXT_FRAGMENT_SIZE",
                defaults.max_context_fragment_size,
            ),
            lock_timeout: defaults.lock_timeout,
        }
    }

    /// Validates cross-field constraints. Currently only checks that caps
    /// are non-zero, the way `EnvEmbeddingConfig::validate` checks
    /// provider-specific requirements.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_short_term_items == 0 || self.max_long_term_items == 0 {
            anyhow::bail!("memory tier caps must be non-zero");
        }
        if self.similarity_threshold < 0.0 || self.similarity_threshold > 1.0 {
            anyhow::bail!("CAG_SIMILARITY_THRESHOLD must be in [0,1]");
        }
        Ok(())
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
