//! Document enrichment (§4.4c): scores a conversation's documents against
//! the current message and keeps the top 3 as `relevantDocuments`.

use cag_core::Document;
use cag_types::{DocumentSummary, Entity, RelevantDocument, Topic};
use semantic_service::SemanticService;

const CONTENT_PREFIX_CHARS: usize = 5000;
const SIMILARITY_WEIGHT: f32 = 0.6;
const ENTITY_OVERLAP_WEIGHT: f32 = 0.2;
const TOPIC_OVERLAP_WEIGHT: f32 = 0.15;
const RELEVANCE_FLOOR: f32 = 0.1;
const TOP_DOCUMENTS: usize = 3;

fn excerpt(content: &str) -> String {
    content.chars().take(200).collect()
}

fn entity_overlap_boost(content: &str, entities: &[Entity]) -> f32 {
    if entities.is_empty() {
        return 0.0;
    }
    let lower = content.to_lowercase();
    let hits = entities.iter().filter(|e| lower.contains(&e.name.to_lowercase())).count();
    (hits as f32 / entities.len() as f32).min(1.0)
}

fn topic_overlap_boost(content: &str, topics: &[Topic]) -> f32 {
    if topics.is_empty() {
        return 0.0;
    }
    let lower = content.to_lowercase();
    let hits = topics.iter().filter(|t| lower.contains(&t.name.replace('_', " "))).count();
    (hits as f32 / topics.len() as f32).min(1.0)
}

/// Scores `documents` against `message`, returning `(availableDocuments,
/// relevantDocuments)`. Degrades to an empty relevant list (but a full
/// available list) if embedding fails.
pub async fn enrich(message: &str, documents: &[Document], entities: &[Entity], topics: &[Topic], semantic: &dyn SemanticService) -> (Vec<DocumentSummary>, Vec<RelevantDocument>) {
    let available: Vec<DocumentSummary> = documents.iter().map(|d| DocumentSummary { id: d.id.clone(), name: d.name.clone() }).collect();

    let Ok(message_embedding) = semantic.embed(message).await else {
        return (available, Vec::new());
    };

    let mut scored = Vec::new();
    for doc in documents {
        let truncated: String = doc.content.chars().take(CONTENT_PREFIX_CHARS).collect();
        let Ok(doc_embedding) = semantic.embed(&truncated).await else { continue };
        let similarity = semantic.similarity(&message_embedding, &doc_embedding);
        let relevance = SIMILARITY_WEIGHT * similarity + ENTITY_OVERLAP_WEIGHT * entity_overlap_boost(&doc.content, entities) + TOPIC_OVERLAP_WEIGHT * topic_overlap_boost(&doc.content, topics);
        if relevance > RELEVANCE_FLOOR {
            scored.push(RelevantDocument { id: doc.id.clone(), name: doc.name.clone(), relevance, excerpt: excerpt(&doc.content) });
        }
    }

    scored.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(TOP_DOCUMENTS);

    (available, scored)
}
