//! Sentiment analysis: bag-of-words polarity plus emoji and direct-emotion
//! regex adjustments. `SentimentStats` here reflects only the current
//! message; running conversation-level stats are accumulated by the
//! caller across turns.

use cag_types::{Sentiment, SentimentLabel, SentimentStats};
use once_cell::sync::Lazy;
use regex::Regex;

const POSITIVE_WORDS: &[&str] = &["gracias", "genial", "excelente", "perfecto", "feliz", "encanta", "increible", "fantastico", "bueno", "maravilloso"];
const NEGATIVE_WORDS: &[&str] = &["terrible", "odio", "horrible", "pesimo", "triste", "molesto", "fatal", "decepcionado", "malo"];
const CONFUSION_WORDS: &[&str] = &["confundido", "perdido"];
const CONFUSION_PHRASES: &[&str] = &["no entiendo", "no se", "que significa", "no comprendo"];
const URGENCY_WORDS: &[&str] = &["urgente", "inmediatamente", "emergencia", "ya"];

const POSITIVE_EMOJI: &[char] = &['😀', '😊', '👍', '❤', '🎉', '😄'];
const NEGATIVE_EMOJI: &[char] = &['😢', '😡', '👎', '💔', '😠'];
const EMOJI_BONUS: f32 = 1.5;

static ANXIOUS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(preocupa|nervios|ansiedad|angustia)").unwrap());
static GRATITUDE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(agradezco|agradecido|muchas gracias)").unwrap());

fn whole_word_count(tokens: &[&str], words: &[&str]) -> f32 {
    tokens.iter().filter(|t| words.contains(t)).count() as f32
}

fn phrase_count(text: &str, phrases: &[&str]) -> f32 {
    phrases.iter().filter(|p| text.contains(*p)).count() as f32
}

fn has_emoji(text: &str, set: &[char]) -> bool {
    text.chars().any(|c| set.contains(&c))
}

/// Analyzes a single message's sentiment per the bag-of-words + regex
/// adjustment model.
pub fn analyze(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let total_tokens = (tokens.len().max(1)) as f32;

    let mut pos = whole_word_count(&tokens, POSITIVE_WORDS);
    let mut neg = whole_word_count(&tokens, NEGATIVE_WORDS);
    let confusion_score = whole_word_count(&tokens, CONFUSION_WORDS) + 2.0 * phrase_count(&lower, CONFUSION_PHRASES);
    let urgency_score = whole_word_count(&tokens, URGENCY_WORDS);

    if has_emoji(text, POSITIVE_EMOJI) {
        pos += EMOJI_BONUS;
    }
    if has_emoji(text, NEGATIVE_EMOJI) {
        neg += EMOJI_BONUS;
    }

    let mut score = (pos - neg) / total_tokens.sqrt();

    let is_anxious = ANXIOUS_PATTERN.is_match(&lower);
    if is_anxious {
        score -= 0.3;
    }
    let is_grateful = GRATITUDE_PATTERN.is_match(&lower);
    if is_grateful {
        score += 0.3;
    }

    score = score.clamp(-1.0, 1.0);

    let label = if urgency_score > 0.0 {
        SentimentLabel::Urgent
    } else if confusion_score > 0.0 {
        SentimentLabel::Confused
    } else if is_anxious {
        SentimentLabel::Anxious
    } else if is_grateful {
        SentimentLabel::Gratitude
    } else if score > 0.15 {
        SentimentLabel::Positive
    } else if score < -0.15 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    let intensity = (0.5 + score.abs() * 0.5).min(1.0);

    let stats = SentimentStats {
        positive_count: (label == SentimentLabel::Positive) as u32,
        negative_count: (label == SentimentLabel::Negative) as u32,
        neutral_count: (label == SentimentLabel::Neutral) as u32,
        average_score: score,
    };

    Sentiment { label, score, intensity, stats }
}
