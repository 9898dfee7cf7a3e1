//! Entity and the cross-entity relations extracted alongside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of real-world thing an [`Entity`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Date,
    Technology,
    Money,
    Email,
    Url,
    Concept,
}

/// Cross-context disclosure level. Ordered: `Public < Restricted < Sensitive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    Public,
    Restricted,
    Sensitive,
}

impl Default for SensitivityLevel {
    fn default() -> Self {
        SensitivityLevel::Public
    }
}

impl SensitivityLevel {
    /// The more restrictive of two levels. Used when merging observations of
    /// the same entity: sensitivity is only ever raised, never lowered.
    pub fn more_restrictive(self, other: Self) -> Self {
        self.max(other)
    }
}

/// A named entity recognized in a message, with its provenance and
/// confidence. Unique within a store by `(name.to_lowercase(), entity_type)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub entity_type: EntityType,
    pub confidence: f32,
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub embedding: Option<Vec<f32>>,
    pub occurrences: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub sensitivity_level: SensitivityLevel,
}

impl Entity {
    /// Creates a freshly observed entity: `occurrences = 1`,
    /// `first_seen == last_seen == now`, public sensitivity.
    pub fn new(name: impl Into<String>, entity_type: EntityType, confidence: f32, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            entity_type,
            confidence,
            description: None,
            aliases: Vec::new(),
            embedding: None,
            occurrences: 1,
            first_seen: now,
            last_seen: now,
            sensitivity_level: SensitivityLevel::Public,
        }
    }

    /// The `(lowercased name, type)` key used for dedup/uniqueness.
    pub fn key(&self) -> (String, EntityType) {
        (self.name.to_lowercase(), self.entity_type)
    }
}

/// The kind of relationship a [`Relation`] asserts between two entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationType {
    /// A named verb-pattern relation, e.g. "founder of".
    Named(String),
    /// Two entities mentioned within a short span of each other.
    CoOccurrence,
}

/// A relation between two entities found in the same message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub source: String,
    pub target: String,
    pub relation_type: RelationType,
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_only_ever_raises() {
        assert_eq!(
            SensitivityLevel::Public.more_restrictive(SensitivityLevel::Sensitive),
            SensitivityLevel::Sensitive
        );
        assert_eq!(
            SensitivityLevel::Sensitive.more_restrictive(SensitivityLevel::Public),
            SensitivityLevel::Sensitive
        );
        assert_eq!(
            SensitivityLevel::Restricted.more_restrictive(SensitivityLevel::Public),
            SensitivityLevel::Restricted
        );
    }

    #[test]
    fn key_lowercases_name() {
        let e = Entity::new("OpenAI", EntityType::Organization, 0.9, Utc::now());
        assert_eq!(e.key(), ("openai".to_string(), EntityType::Organization));
    }
}
