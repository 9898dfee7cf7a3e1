//! `searchMemory`: tokenized relevance-weighted ranking over both tiers of
//! a conversation's memory.

use cag_types::{Memory, MemoryItem};

const MIN_TOKEN_LEN: usize = 3;
const MIN_SCORE: f32 = 0.1;

fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.len() > MIN_TOKEN_LEN)
        .map(|t| t.to_string())
        .collect()
}

fn hit_ratio(tokens: &[String], haystack: &str) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let haystack = haystack.to_lowercase();
    let hits = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
    hits as f32 / tokens.len() as f32
}

fn entity_hits(tokens: &[String], item: &MemoryItem) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let hits = tokens
        .iter()
        .filter(|t| item.entities.iter().any(|e| e.name.to_lowercase().contains(t.as_str())))
        .count();
    hits as f32 / tokens.len() as f32
}

fn score_item(tokens: &[String], item: &MemoryItem) -> f32 {
    let user_ratio = hit_ratio(tokens, &item.user_message);
    let bot_ratio = hit_ratio(tokens, &item.bot_response);
    let entity_ratio = entity_hits(tokens, item);
    (0.6 * user_ratio + 0.4 * bot_ratio + 0.2 * entity_ratio) * item.relevance
}

/// Searches both tiers of `memory` for `query`, returning matching items
/// sorted by score descending.
pub fn search(memory: &Memory, query: &str) -> Vec<MemoryItem> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f32, MemoryItem)> = memory
        .short_term
        .iter()
        .chain(memory.long_term.iter())
        .map(|item| (score_item(&tokens, item), item.clone()))
        .filter(|(score, _)| *score > MIN_SCORE)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn memory_with_items() -> Memory {
        let now = Utc::now();
        let mut memory = Memory::new("conv-1", None, now);
        let mut a = MemoryItem::new("cual es el clima en madrid", "hace sol en madrid", 0.9, now);
        a.relevance = 0.9;
        let mut b = MemoryItem::new("cuentame un chiste", "por que los programadores confunden halloween", 0.5, now);
        b.relevance = 0.5;
        memory.short_term.push(a);
        memory.short_term.push(b);
        memory
    }

    #[test]
    fn finds_matching_item_by_keyword() {
        let memory = memory_with_items();
        let hits = search(&memory, "clima madrid");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].user_message.contains("madrid"));
    }

    #[test]
    fn short_tokens_are_ignored() {
        let memory = memory_with_items();
        assert!(search(&memory, "en a").is_empty());
    }

    #[test]
    fn results_are_sorted_by_score_descending() {
        let now = Utc::now();
        let mut memory = Memory::new("conv-1", None, now);
        let mut low = MemoryItem::new("programadores en general", "si", 0.3, now);
        low.relevance = 0.3;
        let mut high = MemoryItem::new("programadores expertos en rust", "si", 0.9, now);
        high.relevance = 0.9;
        memory.short_term.push(low);
        memory.short_term.push(high);

        let hits = search(&memory, "programadores expertos");
        assert_eq!(hits[0].user_message, "programadores expertos en rust");
    }
}
