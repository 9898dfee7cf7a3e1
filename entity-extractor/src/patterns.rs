//! Pattern-based entity extraction: a fixed, language-aware table of
//! `{regex, type, confidence, transform?}` entries. Grounded in the
//! multi-stage, ordered-pipeline shape of `memory-strategies`'s context
//! strategies, applied here to regex passes instead of store queries.

use cag_types::{Entity, EntityType};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum length (in characters) for a pattern match to be kept. Drops
/// noise like bare initials.
const MIN_MATCH_LEN: usize = 3;

static TITLE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(sr\.?|sra\.?|dr\.?|dra\.?|lic\.?|ing\.?|prof\.?)\s+").unwrap());

static PERSON_BIGRAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+){1,2}\b").unwrap());

static TITLED_PERSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:sr\.?|sra\.?|dr\.?|dra\.?|lic\.?|ing\.?|prof\.?)\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)?\b").unwrap()
});

static ORGANIZATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b[A-ZÁÉÍÓÚÑ][\w&.]*(?:\s+[A-ZÁÉÍÓÚÑ][\w&.]*)*\s+(?:S\.A\.|S\.A\.S\.|S\.L\.|Inc\.?|Corp\.?|LLC|Ltd\.?)\b|\b[A-Z]{2,6}\b",
    )
    .unwrap()
});

static LOCATION_WITH_PREPOSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:en|desde|hacia|de)\s+([A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)?)\b").unwrap()
});

static KNOWN_PLACES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(España|México|Argentina|Colombia|Chile|Perú|Madrid|Barcelona|Ciudad de México|Bogotá|Buenos Aires|Lima|Santiago)\b",
    )
    .unwrap()
});

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{4}-\d{2}-\d{2}|\d{1,2}\s+de\s+(?:enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|octubre|noviembre|diciembre)(?:\s+de\s+\d{4})?)\b",
    )
    .unwrap()
});

static TECHNOLOGY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(inteligencia artificial|machine learning|aprendizaje automático|blockchain|cloud computing|big data|API|base de datos|microservicios)\b").unwrap()
});

static PROGRAMMING_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(python|rust|javascript|typescript|java|c\+\+|c#|go|kotlin|swift|ruby|php)\b").unwrap()
});

static MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\$|USD|EUR|€)\s?\d[\d.,]*(?:\s?(?:millones|mil|k|M))?\b").unwrap()
});

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b").unwrap());

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").unwrap());

fn strip_title(name: &str) -> String {
    TITLE_PREFIX.replace(name, "").trim().to_string()
}

/// Runs every regex pass over `text` and returns the raw (un-fused) pattern
/// matches. Language is currently advisory (the table is Spanish-leaning but
/// extensible per-language); it is accepted for forward compatibility.
pub fn extract_pattern_entities(text: &str, _language: &str) -> Vec<Entity> {
    let now = Utc::now();
    let mut out = Vec::new();

    push_matches(&mut out, &TITLED_PERSON, text, EntityType::Person, 0.8, true, now);
    push_matches(&mut out, &PERSON_BIGRAM, text, EntityType::Person, 0.55, false, now);
    push_matches(&mut out, &ORGANIZATION, text, EntityType::Organization, 0.7, false, now);
    push_group_matches(&mut out, &LOCATION_WITH_PREPOSITION, text, EntityType::Location, 0.6, now);
    push_matches(&mut out, &KNOWN_PLACES, text, EntityType::Location, 0.9, false, now);
    push_matches(&mut out, &DATE, text, EntityType::Date, 0.85, false, now);
    push_matches(&mut out, &TECHNOLOGY, text, EntityType::Technology, 0.75, false, now);
    push_matches(&mut out, &PROGRAMMING_LANGUAGE, text, EntityType::Technology, 0.8, false, now);
    push_matches(&mut out, &MONEY, text, EntityType::Money, 0.85, false, now);
    push_matches(&mut out, &EMAIL, text, EntityType::Email, 0.95, false, now);
    push_matches(&mut out, &URL, text, EntityType::Url, 0.95, false, now);

    out
}

fn push_matches(
    out: &mut Vec<Entity>,
    re: &Regex,
    text: &str,
    entity_type: EntityType,
    confidence: f32,
    strip_titles: bool,
    now: chrono::DateTime<Utc>,
) {
    for m in re.find_iter(text) {
        let raw = m.as_str();
        let name = if strip_titles { strip_title(raw) } else { raw.to_string() };
        if name.chars().count() < MIN_MATCH_LEN {
            continue;
        }
        out.push(Entity::new(name, entity_type, confidence, now));
    }
}

/// Like `push_matches` but keeps capture group 1 instead of the whole match
/// (used for prepositional patterns like "en Madrid").
fn push_group_matches(out: &mut Vec<Entity>, re: &Regex, text: &str, entity_type: EntityType, confidence: f32, now: chrono::DateTime<Utc>) {
    for caps in re.captures_iter(text) {
        if let Some(g) = caps.get(1) {
            let name = g.as_str().to_string();
            if name.chars().count() < MIN_MATCH_LEN {
                continue;
            }
            out.push(Entity::new(name, entity_type, confidence, now));
        }
    }
}
