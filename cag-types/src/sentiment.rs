//! Sentiment analysis result for a single message.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Confused,
    Urgent,
    Anxious,
    Gratitude,
}

/// Running statistics over a conversation's sentiment history, attached to
/// the latest [`Sentiment`] reading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentStats {
    pub positive_count: u32,
    pub negative_count: u32,
    pub neutral_count: u32,
    pub average_score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    /// In `[-1, 1]`.
    pub score: f32,
    /// In `[0, 1]`.
    pub intensity: f32,
    pub stats: SentimentStats,
}
