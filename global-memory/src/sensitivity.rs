//! Sensitivity classification: entity type, keyword heuristics, and an
//! explicit per-name override, in that precedence order.

use cag_types::{EntityType, SensitivityLevel};
use std::collections::HashMap;

const SENSITIVE_KEYWORDS: &[&str] = &["password", "secret", "private", "confidential", "personal"];
const RESTRICTED_KEYWORDS: &[&str] = &["internal", "restricted", "confidencial-interno"];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k))
}

/// Classifies an entity's sensitivity from its type and the surrounding
/// text, honoring an explicit override when present.
pub fn classify(name: &str, entity_type: EntityType, text: &str, overrides: &HashMap<String, SensitivityLevel>) -> SensitivityLevel {
    if let Some(level) = overrides.get(&name.to_lowercase()) {
        return *level;
    }

    if matches!(entity_type, EntityType::Person | EntityType::Email) || contains_any(name, SENSITIVE_KEYWORDS) || contains_any(text, SENSITIVE_KEYWORDS) {
        return SensitivityLevel::Sensitive;
    }

    if contains_any(text, RESTRICTED_KEYWORDS) {
        return SensitivityLevel::Restricted;
    }

    SensitivityLevel::Public
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_entities_are_always_sensitive() {
        assert_eq!(classify("Ana", EntityType::Person, "", &HashMap::new()), SensitivityLevel::Sensitive);
    }

    #[test]
    fn sensitive_keyword_in_text_marks_sensitive() {
        assert_eq!(
            classify("Acme", EntityType::Organization, "esta es su contraseña secreta", &HashMap::new()),
            SensitivityLevel::Sensitive
        );
    }

    #[test]
    fn restricted_keyword_marks_restricted() {
        assert_eq!(classify("Acme", EntityType::Organization, "documento interno", &HashMap::new()), SensitivityLevel::Restricted);
    }

    #[test]
    fn default_is_public() {
        assert_eq!(classify("Acme", EntityType::Organization, "reunión de equipo", &HashMap::new()), SensitivityLevel::Public);
    }

    #[test]
    fn explicit_override_wins_over_heuristics() {
        let mut overrides = HashMap::new();
        overrides.insert("acme".to_string(), SensitivityLevel::Public);
        assert_eq!(classify("Acme", EntityType::Person, "", &overrides), SensitivityLevel::Public);
    }
}
