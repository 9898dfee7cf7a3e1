//! `provideFeedback`: nudges an entity's confidence up or down in response
//! to an explicit correction/confirmation, and appends an audit record.
//! The append-only JSONL log is grounded in the teacher's audit logger
//! (`open(append: true)` + one JSON object per line).

use cag_types::{Entity, EntityType, GlobalMemoryDoc};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

const CORRECTION_FACTOR: f32 = 0.7;
const CONFIRMATION_FACTOR: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Correction,
    Confirmation,
}

#[derive(Debug, Serialize)]
struct FeedbackRecord<'a> {
    timestamp: DateTime<Utc>,
    entity_name: &'a str,
    entity_type: EntityType,
    kind: FeedbackKind,
    confidence_before: f32,
    confidence_after: f32,
}

/// Applies `kind` to the entity matching `(name, entity_type)`, if present,
/// and appends a record of the adjustment to `log_path`. Returns `true`
/// when a matching entity was found and adjusted.
pub async fn provide_feedback(doc: &mut GlobalMemoryDoc, log_path: &Path, name: &str, entity_type: EntityType, kind: FeedbackKind, now: DateTime<Utc>) -> cag_core::Result<bool> {
    let key = (name.to_lowercase(), entity_type);
    let Some(entity) = doc.entities.iter_mut().find(|e| e.key() == key) else {
        return Ok(false);
    };

    let before = entity.confidence;
    entity.confidence = match kind {
        FeedbackKind::Correction => before * CORRECTION_FACTOR,
        FeedbackKind::Confirmation => (before * CONFIRMATION_FACTOR).min(1.0),
    };
    entity.last_seen = now;

    append_record(log_path, &entity.name, entity.entity_type, kind, before, entity.confidence, now).await?;
    Ok(true)
}

async fn append_record(log_path: &Path, entity_name: &str, entity_type: EntityType, kind: FeedbackKind, before: f32, after: f32, now: DateTime<Utc>) -> cag_core::Result<()> {
    if let Some(parent) = log_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let record = FeedbackRecord { timestamp: now, entity_name, entity_type, kind, confidence_before: before, confidence_after: after };
    let line = format!("{}\n", serde_json::to_string(&record).map_err(cag_core::Error::from)?);

    let mut file = OpenOptions::new().create(true).append(true).open(log_path).await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
