//! Relevance scoring for a freshly formed [`MemoryItem`], and the
//! read-time decay applied to long-term items. Grounded in the same
//! weighted-signal-sum shape as `memory-strategies`'s scoring strategies.

use cag_types::{MemoryItem, SentimentLabel};

const BASE: f32 = 0.5;
const MAX_ENTITY_BONUS: f32 = 0.3;
const ENTITY_BONUS_PER: f32 = 0.05;
const HIGH_INTENSITY_BONUS: f32 = 0.1;
const STRONGLY_POSITIVE_BONUS: f32 = 0.1;
const STRONGLY_NEGATIVE_BONUS: f32 = 0.15;
const URGENT_OR_CONFUSED_BONUS: f32 = 0.2;
const MAX_TOPIC_BONUS: f32 = 0.2;
const TOPIC_BONUS_PER: f32 = 0.05;
const TOPIC_CONFIDENCE_THRESHOLD: f32 = 0.7;
const LONG_MESSAGE_BONUS: f32 = 0.15;
const LONG_MESSAGE_WORD_THRESHOLD: usize = 50;

/// The `0.95^days` per-day decay applied to long-term relevance.
const DAILY_DECAY: f32 = 0.95;
/// Long-term items below this relevance are dropped on read.
pub const MIN_RETAINED_RELEVANCE: f32 = 0.2;

/// Scores a new memory item: base 0.5 plus weighted bonuses for entity
/// count, sentiment, topic confidence, and message length, clamped to
/// `[0, 1]`.
pub fn score(item: &MemoryItem) -> f32 {
    let mut score = BASE;

    score += (item.entities.len() as f32 * ENTITY_BONUS_PER).min(MAX_ENTITY_BONUS);

    if let Some(sentiment) = &item.sentiment {
        if sentiment.intensity > 0.5 {
            score += HIGH_INTENSITY_BONUS;
        }
        match sentiment.label {
            SentimentLabel::Positive if sentiment.score > 0.5 => score += STRONGLY_POSITIVE_BONUS,
            SentimentLabel::Negative if sentiment.score < -0.5 => score += STRONGLY_NEGATIVE_BONUS,
            SentimentLabel::Urgent | SentimentLabel::Confused => score += URGENT_OR_CONFUSED_BONUS,
            _ => {}
        }
    }

    let topic_bonus: f32 = item.topics.iter().filter(|t| t.confidence > TOPIC_CONFIDENCE_THRESHOLD).count() as f32 * TOPIC_BONUS_PER;
    score += topic_bonus.min(MAX_TOPIC_BONUS);

    let word_count = item.user_message.split_whitespace().count() + item.bot_response.split_whitespace().count();
    if word_count > LONG_MESSAGE_WORD_THRESHOLD {
        score += LONG_MESSAGE_BONUS;
    }

    score.clamp(0.0, 1.0)
}

/// Applies the per-day decay for a long-term item read `days` after its
/// timestamp.
pub fn decay(relevance: f32, days: i64) -> f32 {
    relevance * DAILY_DECAY.powi(days.max(0) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_types::{Entity, EntityType, Sentiment, SentimentStats, Topic};
    use chrono::Utc;

    fn base_item() -> MemoryItem {
        MemoryItem::new("hola", "hola, como puedo ayudarte", 0.0, Utc::now())
    }

    #[test]
    fn base_score_with_no_signals_is_half() {
        assert_eq!(score(&base_item()), 0.5);
    }

    #[test]
    fn entity_count_adds_bonus_capped_at_point_three() {
        let now = Utc::now();
        let mut item = base_item();
        item.entities = (0..20).map(|i| Entity::new(format!("e{i}"), EntityType::Concept, 0.9, now)).collect();
        assert!((score(&item) - (0.5 + 0.3)).abs() < 1e-6);
    }

    #[test]
    fn urgent_sentiment_adds_bonus() {
        let mut item = base_item();
        item.sentiment = Some(Sentiment { label: SentimentLabel::Urgent, score: 0.0, intensity: 0.2, stats: SentimentStats::default() });
        assert!((score(&item) - (0.5 + 0.2)).abs() < 1e-6);
    }

    #[test]
    fn long_message_adds_bonus() {
        let mut item = base_item();
        item.user_message = "palabra ".repeat(60);
        assert!((score(&item) - (0.5 + 0.15)).abs() < 1e-6);
    }

    #[test]
    fn score_never_exceeds_one() {
        let now = Utc::now();
        let mut item = base_item();
        item.entities = (0..20).map(|i| Entity::new(format!("e{i}"), EntityType::Concept, 0.9, now)).collect();
        item.sentiment = Some(Sentiment { label: SentimentLabel::Urgent, score: 0.0, intensity: 0.9, stats: SentimentStats::default() });
        item.topics = (0..10).map(|i| Topic::new(format!("t{i}"), 0.9, now)).collect();
        item.user_message = "palabra ".repeat(60);
        assert!(score(&item) <= 1.0);
    }

    #[test]
    fn decay_reduces_relevance_with_age() {
        let fresh = decay(1.0, 0);
        let aged = decay(1.0, 10);
        assert!((fresh - 1.0).abs() < 1e-6);
        assert!(aged < fresh);
    }
}
