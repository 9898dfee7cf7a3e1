//! References from the current message back to earlier turns.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// Direct reply to the immediately preceding bot message.
    Response,
    /// Pronoun/demonstrative reference resolved against recent turns.
    Contextual,
    /// Resolved via embedding similarity rather than surface cues.
    Semantic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub message_index: usize,
    pub confidence: f32,
    pub reference_type: ReferenceType,
    pub similarity: Option<f32>,
}
