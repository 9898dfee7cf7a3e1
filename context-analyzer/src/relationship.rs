//! Follow-up detection and reference resolution (§4.4b): a weighted-signal
//! follow-up score, plus semantic-similarity references against recent bot
//! turns.

use cag_types::{MessageRole, Reference, ReferenceType, RecentMessage};
use once_cell::sync::Lazy;
use regex::Regex;
use semantic_service::SemanticService;

const FOLLOW_UP_THRESHOLD: f32 = 0.7;
const SIMILARITY_THRESHOLD: f32 = 0.75;
const SEMANTIC_REFERENCE_FACTOR: f32 = 0.7;
const MAX_REFERENCES: usize = 3;

static PRONOMINAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(eso|esto|aquello|el|ella|lo|ellos|ellas|este|esta)\b").unwrap());
static SEQUENTIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(despues|luego|entonces|ahora|a continuacion)\b").unwrap());
static IMPERATIVE_ACK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(hazlo|sigue|continua|listo|entendido|vale|ok)\b").unwrap());
static CONJUNCTION_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(y|pero|aunque|o)\b").unwrap());
static DIRECT_RESPONSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(si|no|claro|exacto|por supuesto)\b").unwrap());

/// Result of relationship analysis: whether the message is a follow-up,
/// its score, and the references it resolves to.
pub struct RelationshipResult {
    pub is_follow_up: bool,
    pub follow_up_score: f32,
    pub references: Vec<Reference>,
}

fn follow_up_score(text: &str) -> f32 {
    let trimmed = text.trim();
    let word_count = trimmed.split_whitespace().count();
    let mut score = 0.0;

    if PRONOMINAL_RE.is_match(trimmed) {
        score += 0.5;
    }
    if SEQUENTIAL_RE.is_match(trimmed) {
        score += 0.4;
    }
    if word_count <= 5 {
        score += 0.3;
    }
    if IMPERATIVE_ACK_RE.is_match(trimmed) {
        score += 0.6;
    }
    if CONJUNCTION_START_RE.is_match(trimmed) {
        score += 0.7;
    }
    if DIRECT_RESPONSE_RE.is_match(trimmed) {
        score += 0.8;
    }

    score
}

/// Runs follow-up detection and reference resolution against the recent
/// message history (oldest first) and the last bot message's embedding, if
/// a semantic service is available.
pub async fn analyze(text: &str, recent_messages: &[RecentMessage], semantic: &dyn SemanticService) -> RelationshipResult {
    let score = follow_up_score(text);
    let is_follow_up = score >= FOLLOW_UP_THRESHOLD;
    let word_count = text.trim().split_whitespace().count();

    let mut references = Vec::new();

    if is_follow_up {
        let bot_messages: Vec<(usize, &RecentMessage)> = recent_messages.iter().enumerate().filter(|(_, m)| m.role == MessageRole::Bot).collect();

        if word_count <= 5 {
            if let Some((index, _)) = bot_messages.last() {
                references.push(Reference { message_index: *index, confidence: 0.85, reference_type: ReferenceType::Response, similarity: None });
            }
        } else if PRONOMINAL_RE.is_match(text) {
            let mut confidences = [0.75, 0.65].into_iter();
            for (index, _) in bot_messages.iter().rev().take(2) {
                if let Some(confidence) = confidences.next() {
                    references.push(Reference { message_index: *index, confidence, reference_type: ReferenceType::Contextual, similarity: None });
                }
            }
        }
    }

    if let Ok(current_embedding) = semantic.embed(text).await {
        for (index, message) in recent_messages.iter().enumerate() {
            if message.role != MessageRole::Bot {
                continue;
            }
            if let Ok(bot_embedding) = semantic.embed(&message.content).await {
                let similarity = semantic.similarity(&current_embedding, &bot_embedding);
                if similarity > SEMANTIC_REFERENCE_FACTOR * SIMILARITY_THRESHOLD {
                    references.push(Reference { message_index: index, confidence: (similarity + 0.1).min(0.9), reference_type: ReferenceType::Semantic, similarity: Some(similarity) });
                }
            }
        }
    }

    references.sort_by_key(|r| r.message_index);
    references.dedup_by_key(|r| r.message_index);
    references.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    references.truncate(MAX_REFERENCES);

    RelationshipResult { is_follow_up, follow_up_score: score, references }
}
