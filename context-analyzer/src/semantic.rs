//! Semantic extraction (§4.4a): the single analysis pass whose result is
//! cacheable — language, entities, intent, topics, sentiment, structure,
//! question type — wrapped in `analysis_cache::CachedAnalysis` so a cache
//! hit and a fresh run produce the exact same shape.

use crate::{intent, language, sentiment, structure, topics};
use analysis_cache::CachedAnalysis;
use entity_extractor::EntityExtraction;
use chrono::{DateTime, Utc};

/// Runs the full semantic-extraction pipeline over `text`.
pub async fn extract(text: &str, extractor: &dyn EntityExtraction, now: DateTime<Utc>) -> CachedAnalysis {
    let detected_language = language::detect(text);
    let entities = extractor.extract_entities(text, &detected_language.code.name().to_lowercase()).await.unwrap_or_default();
    let detected_intent = intent::classify(text);
    let detected_topics = topics::extract(text, now);
    let detected_sentiment = sentiment::analyze(text);
    let (message_structure, question_type) = structure::analyze(text);

    CachedAnalysis {
        entities,
        topics: detected_topics,
        intent: detected_intent,
        sentiment: detected_sentiment,
        language: detected_language,
        message_structure,
        question_type,
    }
}
