//! `enrichContextWithGlobalMemory`: picks the global entities/topics most
//! relevant to the current turn and attaches them (sensitivity-filtered)
//! plus any keyword-matched domain knowledge.

use cag_types::{ContextMap, DomainKnowledge, Entity, GlobalMemoryContext, GlobalMemoryDoc, SensitivityLevel, Topic};
use chrono::{DateTime, Utc};
use semantic_service::SemanticService;
use std::collections::{HashMap, HashSet};

const ENTITY_TEMPORAL_WEIGHT: f32 = 0.4;
const ENTITY_SEMANTIC_WEIGHT: f32 = 0.6;
const TOPIC_TEMPORAL_WEIGHT: f32 = 0.3;
const TOPIC_SEMANTIC_WEIGHT: f32 = 0.7;
const RECENT_WINDOW_DAYS: i64 = 7;
const TEMPORAL_DECAY_BASE: f32 = 0.98;
const TOP_ENTITIES: usize = 10;
const TOP_TOPICS: usize = 5;

/// Options governing enrichment scope.
pub struct EnrichmentOptions {
    pub current_topics: Vec<String>,
    pub authorized_access_level: SensitivityLevel,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self { current_topics: Vec::new(), authorized_access_level: SensitivityLevel::Public }
    }
}

fn temporal_factor(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f32 {
    let days = (now - last_seen).num_days();
    if days <= RECENT_WINDOW_DAYS {
        1.0
    } else {
        TEMPORAL_DECAY_BASE.powf((days - RECENT_WINDOW_DAYS) as f32 / RECENT_WINDOW_DAYS as f32)
    }
}

/// Similarity between `own_embedding` and `context_embedding` if both are
/// present; otherwise `fallback_embedding` (the concatenated-topic-string
/// embedding) stands in for the context side.
fn semantic_relevance(semantic: &dyn SemanticService, own_embedding: Option<&[f32]>, context_embedding: &[f32], fallback_embedding: &[f32]) -> f32 {
    match own_embedding {
        Some(embedding) => semantic.similarity(embedding, context_embedding),
        None => semantic.similarity(fallback_embedding, context_embedding),
    }
}

/// Builds the [`GlobalMemoryContext`] attached to a `ContextMap` for the
/// current turn.
pub async fn enrich(doc: &GlobalMemoryDoc, context: &ContextMap, semantic: &dyn SemanticService, options: &EnrichmentOptions, now: DateTime<Utc>) -> GlobalMemoryContext {
    let mut current_topics: HashSet<String> = context.topics.iter().map(|t| t.name.to_lowercase()).collect();
    current_topics.extend(options.current_topics.iter().map(|t| t.to_lowercase()));

    let context_keys: HashSet<(String, cag_types::EntityType)> = context.entities.iter().map(|e| e.key()).collect();
    let topic_keys: HashSet<String> = context.topics.iter().map(|t| t.key()).collect();

    let topic_fallback_text = current_topics.iter().cloned().collect::<Vec<_>>().join(" ");
    let context_embedding = semantic.embed(&context.current_message).await.ok();
    let fallback_embedding = if topic_fallback_text.is_empty() { None } else { semantic.embed(&topic_fallback_text).await.ok() };

    let entities = select_entities(doc, &context_keys, semantic, context_embedding.as_deref(), fallback_embedding.as_deref(), options.authorized_access_level, now);
    let topics = select_topics(doc, &topic_keys, semantic, context_embedding.as_deref(), fallback_embedding.as_deref(), now);

    let domain_knowledge: HashMap<String, DomainKnowledge> = doc
        .domain_knowledge
        .iter()
        .filter(|(domain, _)| current_topics.iter().any(|t| t.contains(domain.as_str()) || domain.contains(t.as_str())))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    GlobalMemoryContext { entities, topics, domain_knowledge }
}

fn select_entities(
    doc: &GlobalMemoryDoc,
    exclude: &HashSet<(String, cag_types::EntityType)>,
    semantic: &dyn SemanticService,
    context_embedding: Option<&[f32]>,
    fallback_embedding: Option<&[f32]>,
    allowed: SensitivityLevel,
    now: DateTime<Utc>,
) -> Vec<Entity> {
    let mut scored: Vec<(f32, &Entity)> = doc
        .entities
        .iter()
        .filter(|e| !exclude.contains(&e.key()) && e.sensitivity_level <= allowed)
        .map(|e| {
            let score = match (context_embedding, fallback_embedding) {
                (Some(ctx), _) => {
                    let semantic_score = semantic_relevance(semantic, e.embedding.as_deref(), ctx, fallback_embedding.unwrap_or(ctx));
                    ENTITY_TEMPORAL_WEIGHT * temporal_factor(e.last_seen, now) + ENTITY_SEMANTIC_WEIGHT * semantic_score
                }
                (None, _) => e.occurrences as f32 * e.confidence,
            };
            (score, e)
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(TOP_ENTITIES).map(|(_, e)| e.clone()).collect()
}

fn select_topics(
    doc: &GlobalMemoryDoc,
    exclude: &HashSet<String>,
    semantic: &dyn SemanticService,
    context_embedding: Option<&[f32]>,
    fallback_embedding: Option<&[f32]>,
    now: DateTime<Utc>,
) -> Vec<Topic> {
    let mut scored: Vec<(f32, &Topic)> = doc
        .topics
        .iter()
        .filter(|t| !exclude.contains(&t.key()))
        .map(|t| {
            let score = match context_embedding {
                Some(ctx) => {
                    let semantic_score = semantic_relevance(semantic, t.embedding.as_deref(), ctx, fallback_embedding.unwrap_or(ctx));
                    TOPIC_TEMPORAL_WEIGHT * temporal_factor(t.last_seen, now) + TOPIC_SEMANTIC_WEIGHT * semantic_score
                }
                None => t.occurrences as f32 * t.confidence,
            };
            (score, t)
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().take(TOP_TOPICS).map(|(_, t)| t.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_types::EntityType;
    use semantic_service::HashedBagOfWordsEmbedder;

    fn sample_doc(now: DateTime<Utc>) -> GlobalMemoryDoc {
        let mut doc = GlobalMemoryDoc::new(now);
        doc.entities.push(Entity::new("Rust", EntityType::Technology, 0.9, now));
        doc.entities.push(Entity::new("Cobol", EntityType::Technology, 0.2, now - chrono::Duration::days(400)));
        doc
    }

    #[tokio::test]
    async fn excludes_entities_already_in_context() {
        let now = Utc::now();
        let doc = sample_doc(now);
        let mut context = ContextMap::minimal("hablemos de rust", "c1", now);
        context.entities.push(Entity::new("Rust", EntityType::Technology, 0.9, now));
        let embedder = HashedBagOfWordsEmbedder::new();

        let result = enrich(&doc, &context, &embedder, &EnrichmentOptions::default(), now).await;
        assert!(!result.entities.iter().any(|e| e.name == "Rust"));
    }

    #[tokio::test]
    async fn sensitivity_filter_excludes_entities_above_allowed_level() {
        let now = Utc::now();
        let mut doc = sample_doc(now);
        doc.entities[0].sensitivity_level = SensitivityLevel::Sensitive;
        let context = ContextMap::minimal("hablemos de tecnologia", "c1", now);
        let embedder = HashedBagOfWordsEmbedder::new();

        let result = enrich(&doc, &context, &embedder, &EnrichmentOptions::default(), now).await;
        assert!(!result.entities.iter().any(|e| e.name == "Rust"));
    }

    #[tokio::test]
    async fn domain_knowledge_is_included_on_topic_keyword_match() {
        let now = Utc::now();
        let mut doc = sample_doc(now);
        doc.domain_knowledge.insert("cocina".to_string(), DomainKnowledge { facts: vec!["usa sal".into()], last_updated: Some(now) });
        let mut context = ContextMap::minimal("como preparo esto", "c1", now);
        context.topics.push(Topic::new("cocina", 0.9, now));
        let embedder = HashedBagOfWordsEmbedder::new();

        let result = enrich(&doc, &context, &embedder, &EnrichmentOptions::default(), now).await;
        assert!(result.domain_knowledge.contains_key("cocina"));
    }
}
