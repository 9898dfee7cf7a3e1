//! Topic: a named subject detected in conversation, tracked across turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A topic detected in a message. Unique within a store by
/// `name.to_lowercase()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub confidence: f32,
    pub embedding: Option<Vec<f32>>,
    pub occurrences: u32,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Topic {
    pub fn new(name: impl Into<String>, confidence: f32, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            confidence,
            embedding: None,
            occurrences: 1,
            first_seen: now,
            last_seen: now,
        }
    }

    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}
