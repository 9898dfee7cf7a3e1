//! Message structure classification (type, complexity, code presence) and,
//! for questions, a question-type pattern table.

use cag_types::{Complexity, MessageStructure, MessageType, QuestionType};
use once_cell::sync::Lazy;
use regex::Regex;

static COMMAND_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(haz|crea|genera|escribe|muestra|ejecuta|calcula|lista)\b").unwrap());
static REQUEST_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(podrias|puedes|me ayudas|necesito que|quisiera que)\b").unwrap());
static CASUAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(hola|hey|ey|que tal|buenas)\b").unwrap());
static CODE_FENCE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"```|\bfn \w+\(|\bconst \w+ =|;\s*$").unwrap());

struct QuestionPattern {
    kind: QuestionType,
    regex: fn() -> &'static Regex,
}

static FACTUAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(que es|quien es|cuando|donde|cuanto)\b").unwrap());
static EXPLANATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^por que\b").unwrap());
static PROCEDURAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^como\b").unwrap());
static OPINION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(que opinas|que piensas|crees que)\b").unwrap());
static COMPARISON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(mejor que|diferencia entre|cual es mejor|versus|vs\.?)\b").unwrap());
static FUTURE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(sera|va a ser|en el futuro|pasara)\b").unwrap());
static RECOMMENDATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(me recomiendas|que me sugieres|deberia)\b").unwrap());
static HYPOTHETICAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(que pasaria si|si pudiera|hipoteticamente)\b").unwrap());
static CLARIFICATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(a que te refieres|puedes aclarar|que quieres decir)\b").unwrap());

fn question_patterns() -> [QuestionPattern; 9] {
    [
        QuestionPattern { kind: QuestionType::Explanation, regex: || &*EXPLANATION_RE },
        QuestionPattern { kind: QuestionType::Procedural, regex: || &*PROCEDURAL_RE },
        QuestionPattern { kind: QuestionType::Opinion, regex: || &*OPINION_RE },
        QuestionPattern { kind: QuestionType::Comparison, regex: || &*COMPARISON_RE },
        QuestionPattern { kind: QuestionType::Future, regex: || &*FUTURE_RE },
        QuestionPattern { kind: QuestionType::Recommendation, regex: || &*RECOMMENDATION_RE },
        QuestionPattern { kind: QuestionType::Hypothetical, regex: || &*HYPOTHETICAL_RE },
        QuestionPattern { kind: QuestionType::Clarification, regex: || &*CLARIFICATION_RE },
        QuestionPattern { kind: QuestionType::Factual, regex: || &*FACTUAL_RE },
    ]
}

fn classify_question(text: &str) -> QuestionType {
    for pattern in question_patterns() {
        if (pattern.regex)().is_match(text) {
            return pattern.kind;
        }
    }
    QuestionType::GeneralQuestion
}

/// Classifies the message's structural shape: type, complexity, and a few
/// boolean facets.
pub fn analyze(text: &str) -> (MessageStructure, Option<QuestionType>) {
    let trimmed = text.trim();
    let word_count = trimmed.split_whitespace().count();
    let sentence_count = trimmed.split(['.', '!', '?']).filter(|s| !s.trim().is_empty()).count().max(1);
    let contains_code = CODE_FENCE_PATTERN.is_match(text);

    let is_question = trimmed.ends_with('?') || trimmed.starts_with('¿');
    let is_command = COMMAND_PATTERN.is_match(trimmed);
    let is_request = REQUEST_PATTERN.is_match(trimmed);
    let is_casual = CASUAL_PATTERN.is_match(trimmed);

    let message_type = if is_question {
        MessageType::Question
    } else if is_command {
        MessageType::Command
    } else if is_request {
        MessageType::Request
    } else if is_casual {
        MessageType::Casual
    } else {
        MessageType::Statement
    };

    let complexity = if word_count <= 8 {
        Complexity::Simple
    } else if word_count <= 25 {
        Complexity::Moderate
    } else {
        Complexity::Complex
    };

    let structure = MessageStructure { message_type, is_question, is_command, is_request, is_casual, complexity, word_count, sentence_count, contains_code };
    let question_type = if is_question { Some(classify_question(trimmed)) } else { None };

    (structure, question_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_mark_marks_question_type() {
        let (structure, qtype) = analyze("como instalo rust?");
        assert_eq!(structure.message_type, MessageType::Question);
        assert_eq!(qtype, Some(QuestionType::Procedural));
    }

    #[test]
    fn imperative_verb_marks_command() {
        let (structure, _) = analyze("genera un resumen de este texto");
        assert_eq!(structure.message_type, MessageType::Command);
    }

    #[test]
    fn long_message_is_complex() {
        let text = "palabra ".repeat(30);
        let (structure, _) = analyze(&text);
        assert_eq!(structure.complexity, Complexity::Complex);
    }

    #[test]
    fn code_fence_is_detected() {
        let (structure, _) = analyze("mira este codigo: ```fn main() {}```");
        assert!(structure.contains_code);
    }

    #[test]
    fn unrecognized_question_falls_back_to_general() {
        let (_, qtype) = analyze("acaso vendras manana?");
        assert_eq!(qtype, Some(QuestionType::GeneralQuestion));
    }
}
