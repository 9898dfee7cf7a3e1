use analysis_cache::{AnalysisCache, CachedAnalysis};
use cag_types::{Complexity, Intent, IntentName, Language, LanguageCode, MessageStructure, MessageType, Sentiment, SentimentLabel, SentimentStats};

fn sample() -> CachedAnalysis {
    CachedAnalysis {
        entities: vec![],
        topics: vec![],
        intent: Intent { name: IntentName::Conversar, confidence: 0.6 },
        sentiment: Sentiment { label: SentimentLabel::Neutral, score: 0.0, intensity: 0.0, stats: SentimentStats::default() },
        language: Language::new(LanguageCode::Es, 0.8),
        message_structure: MessageStructure {
            message_type: MessageType::Statement,
            is_question: false,
            is_command: false,
            is_request: false,
            is_casual: false,
            complexity: Complexity::Simple,
            word_count: 3,
            sentence_count: 1,
            contains_code: false,
        },
        question_type: None,
    }
}

#[tokio::test]
async fn disk_tier_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let cache = AnalysisCache::new(dir.path());
        cache.put("el clima está agradable hoy", sample()).await.unwrap();
    }

    let reopened = AnalysisCache::new(dir.path());
    let hit = reopened.get("el clima está agradable hoy").await.unwrap();
    assert!(hit.is_some());
}

#[tokio::test]
async fn cleanup_sweep_leaves_recent_entries_alone() {
    let dir = tempfile::tempdir().unwrap();
    let cache = AnalysisCache::new(dir.path());
    cache.put("entrada reciente", sample()).await.unwrap();

    let removed = cache.cleanup().await.unwrap();
    assert_eq!(removed, 0);
    assert!(cache.get("entrada reciente").await.unwrap().is_some());
}

#[tokio::test]
async fn stats_track_hits_and_misses_across_tiers() {
    let dir = tempfile::tempdir().unwrap();
    let cache = AnalysisCache::new(dir.path());

    cache.get("no existe todavía").await.unwrap();
    cache.put("ya cacheado", sample()).await.unwrap();
    cache.get("ya cacheado").await.unwrap();

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert!(stats.hit_rate() > 0.0);
}
