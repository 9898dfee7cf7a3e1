//! Lightweight shape validation for a `ContextMap` before it is persisted.
//! Rust's type system already enforces most of the schema the distilled
//! spec describes (required fields, array types); what's left to check
//! here are the semantic invariants a type checker can't: non-empty ids,
//! bounded array sizes, and timestamp sanity.

use cag_types::ContextMap;
use chrono::{Duration, Utc};
use tracing::warn;

pub const MAX_ENTITIES: usize = 15;
pub const MAX_TOPICS: usize = 5;
const CLOCK_SKEW_ALLOWANCE_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue(pub String);

/// Checks `context`'s shape invariants, returning every violation found.
/// Callers decide whether to log-and-continue or reject based on these.
pub fn validate(context: &ContextMap) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if context.conversation_id.is_empty() {
        issues.push(ValidationIssue("conversation_id must not be empty".to_string()));
    }
    if context.entities.len() > MAX_ENTITIES {
        issues.push(ValidationIssue(format!("entities exceeds MAX_ENTITIES ({} > {MAX_ENTITIES})", context.entities.len())));
    }
    if context.topics.len() > MAX_TOPICS {
        issues.push(ValidationIssue(format!("topics exceeds MAX_TOPICS ({} > {MAX_TOPICS})", context.topics.len())));
    }
    let future_cutoff = Utc::now() + Duration::seconds(CLOCK_SKEW_ALLOWANCE_SECONDS);
    if context.timestamp > future_cutoff || context.last_updated > future_cutoff {
        issues.push(ValidationIssue("timestamp is implausibly far in the future".to_string()));
    }

    issues
}

/// Validates `context`, logging every issue. In strict mode, any issue
/// rejects the write with `cag_core::Error::Validation`; otherwise the
/// write proceeds (issues are advisory).
pub fn validate_or_log(context: &ContextMap, strict: bool) -> cag_core::Result<()> {
    let issues = validate(context);
    if issues.is_empty() {
        return Ok(());
    }
    for issue in &issues {
        warn!(conversation_id = %context.conversation_id, issue = %issue.0, "context map validation issue");
    }
    if strict {
        return Err(cag_core::Error::Validation(issues.into_iter().map(|i| i.0).collect::<Vec<_>>().join("; ")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cag_types::{Entity, EntityType};

    #[test]
    fn a_well_formed_context_has_no_issues() {
        let context = ContextMap::minimal("hola", "c1", Utc::now());
        assert!(validate(&context).is_empty());
    }

    #[test]
    fn too_many_entities_is_flagged() {
        let mut context = ContextMap::minimal("hola", "c1", Utc::now());
        context.entities = (0..20).map(|i| Entity::new(format!("e{i}"), EntityType::Concept, 0.5, Utc::now())).collect();
        assert!(!validate(&context).is_empty());
    }

    #[test]
    fn strict_mode_rejects_an_invalid_write() {
        let context = ContextMap::minimal("hola", "", Utc::now());
        assert!(validate_or_log(&context, true).is_err());
        assert!(validate_or_log(&context, false).is_ok());
    }
}
