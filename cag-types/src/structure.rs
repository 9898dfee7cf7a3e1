//! Message structure classification and question-type tagging.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Question,
    Command,
    Request,
    Casual,
    Statement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

/// Shape of a single message, independent of its semantic content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageStructure {
    pub message_type: MessageType,
    pub is_question: bool,
    pub is_command: bool,
    pub is_request: bool,
    pub is_casual: bool,
    pub complexity: Complexity,
    pub word_count: usize,
    pub sentence_count: usize,
    pub contains_code: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Factual,
    Explanation,
    Procedural,
    Opinion,
    Comparison,
    Future,
    Recommendation,
    Hypothetical,
    Clarification,
    GeneralQuestion,
    Other,
}
