//! Language detection: marker-word scoring with a diacritic bonus and a
//! handful of grammar regexes, falling back to Spanish when undecided.
//! Grounded in `entity-extractor`'s pattern-table idiom.

use cag_types::{Language, LanguageCode};
use once_cell::sync::Lazy;
use regex::Regex;

const DEFAULT_CONFIDENCE: f32 = 0.5;
const DIACRITIC_BONUS: f32 = 1.5;

static ES_GRAMMAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(qu[eé]|c[oó]mo|est[aá]|son|hab[ií]a)\b").unwrap());
static EN_GRAMMAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(the|is|are|was|were|does)\b").unwrap());
static FR_GRAMMAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(le|la|les|est|sont|qu'est)\b").unwrap());
static PT_GRAMMAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(o|a|os|as|est[áa]|s[aã]o)\b").unwrap());
static IT_GRAMMAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(il|lo|gli|è|sono|che cosa)\b").unwrap());

const ES_MARKERS: &[&str] = &["el", "la", "de", "que", "y", "en", "un", "es", "por", "con", "para", "gracias", "hola", "porque"];
const EN_MARKERS: &[&str] = &["the", "of", "and", "to", "in", "is", "for", "with", "thanks", "hello", "because", "you"];
const FR_MARKERS: &[&str] = &["le", "de", "et", "que", "un", "pour", "avec", "merci", "bonjour", "parce"];
const PT_MARKERS: &[&str] = &["de", "que", "e", "um", "para", "com", "obrigado", "ol\u{e1}", "porque", "voc\u{ea}"];
const IT_MARKERS: &[&str] = &["il", "di", "che", "un", "per", "con", "grazie", "ciao", "perch\u{e9}"];

fn diacritic_count(text: &str) -> f32 {
    text.chars().filter(|c| "áéíóúñüàâãêôçèìòùäöß".contains(*c)).count() as f32
}

fn marker_score(text_tokens: &[&str], markers: &[&str]) -> f32 {
    text_tokens.iter().filter(|t| markers.contains(t)).count() as f32
}

/// Detects the message's language, defaulting to Spanish with confidence
/// 0.5 when no marker or grammar cue decides it.
pub fn detect(text: &str) -> Language {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    if tokens.is_empty() {
        return Language::new(LanguageCode::Es, DEFAULT_CONFIDENCE);
    }

    let mut scores: Vec<(LanguageCode, f32)> = vec![
        (LanguageCode::Es, marker_score(&tokens, ES_MARKERS) + if ES_GRAMMAR.is_match(&lower) { 1.0 } else { 0.0 }),
        (LanguageCode::En, marker_score(&tokens, EN_MARKERS) + if EN_GRAMMAR.is_match(&lower) { 1.0 } else { 0.0 }),
        (LanguageCode::Fr, marker_score(&tokens, FR_MARKERS) + if FR_GRAMMAR.is_match(&lower) { 1.0 } else { 0.0 }),
        (LanguageCode::Pt, marker_score(&tokens, PT_MARKERS) + if PT_GRAMMAR.is_match(&lower) { 1.0 } else { 0.0 }),
        (LanguageCode::It, marker_score(&tokens, IT_MARKERS) + if IT_GRAMMAR.is_match(&lower) { 1.0 } else { 0.0 }),
    ];

    let diacritics = diacritic_count(&lower);
    if diacritics > 0.0 {
        for (code, score) in scores.iter_mut() {
            if matches!(code, LanguageCode::Es | LanguageCode::Pt | LanguageCode::Fr | LanguageCode::It) {
                *score += diacritics * DIACRITIC_BONUS / 10.0;
            }
        }
    }

    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let (code, top_score) = scores[0];
    if top_score <= 0.0 {
        return Language::new(LanguageCode::Es, DEFAULT_CONFIDENCE);
    }

    let confidence = (DEFAULT_CONFIDENCE + top_score / (tokens.len() as f32 + top_score)).min(0.99);
    Language::new(code, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanish_markers_win_on_spanish_text() {
        let lang = detect("hola, gracias por la ayuda con el proyecto");
        assert_eq!(lang.code, LanguageCode::Es);
    }

    #[test]
    fn english_markers_win_on_english_text() {
        let lang = detect("hello, thanks for the help with the project");
        assert_eq!(lang.code, LanguageCode::En);
    }

    #[test]
    fn empty_text_defaults_to_spanish_with_half_confidence() {
        let lang = detect("");
        assert_eq!(lang.code, LanguageCode::Es);
        assert_eq!(lang.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn undecidable_text_defaults_to_spanish() {
        let lang = detect("123 456 789");
        assert_eq!(lang.code, LanguageCode::Es);
        assert_eq!(lang.confidence, DEFAULT_CONFIDENCE);
    }
}
