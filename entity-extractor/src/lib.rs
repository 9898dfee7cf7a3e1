//! # entity-extractor
//!
//! Recognizes named entities and the relations between them from message
//! text: a regex pattern pass, a known-entity catalog pass, fusion of the
//! two, and a relation-extraction pass over the fused result. Grounded in
//! the multi-pass, trait-fronted collaborator shape the teacher repo uses
//! for `memory-strategies`, with `cag-core`/`cag-types` standing in for
//! `memory-core`.

mod catalog;
mod fusion;
mod patterns;
mod relations;

pub use catalog::{CatalogEntry, KnownEntityCatalogs};
pub use fusion::MAX_ENTITIES;

use async_trait::async_trait;
use cag_types::{Entity, EntityType, Relation};
use std::path::PathBuf;
use tracing::debug;

/// The entity-extraction capability contract, matching the public contract
/// laid out for this component: `extract_entities`, `save_entity`,
/// `search_entities`, `extract_entity_relations`.
#[async_trait]
pub trait EntityExtraction: Send + Sync {
    /// Recognizes up to [`MAX_ENTITIES`] entities in `text`.
    async fn extract_entities(&self, text: &str, language: &str) -> cag_core::Result<Vec<Entity>>;

    /// Adds `entity` to the known-entity catalog so future extractions can
    /// recognize it directly instead of relying on pattern heuristics.
    async fn save_entity(&self, entity: &Entity) -> cag_core::Result<()>;

    /// Searches the known-entity catalogs by substring match on name or
    /// alias, optionally restricted to `entity_type`.
    async fn search_entities(&self, query: &str, entity_type: Option<EntityType>) -> cag_core::Result<Vec<Entity>>;

    /// Extracts relations between `entities` as they co-occur in `text`.
    async fn extract_entity_relations(&self, entities: &[Entity], text: &str) -> cag_core::Result<Vec<Relation>>;
}

/// Default [`EntityExtraction`] implementation: regex patterns + on-disk
/// known-entity catalogs.
pub struct EntityExtractor {
    catalogs: KnownEntityCatalogs,
}

impl EntityExtractor {
    /// Loads the known-entity catalogs from `catalog_dir` (created if
    /// missing).
    pub fn load(catalog_dir: impl Into<PathBuf>) -> cag_core::Result<Self> {
        Ok(Self { catalogs: KnownEntityCatalogs::load(catalog_dir)? })
    }
}

#[async_trait]
impl EntityExtraction for EntityExtractor {
    async fn extract_entities(&self, text: &str, language: &str) -> cag_core::Result<Vec<Entity>> {
        let mut candidates = patterns::extract_pattern_entities(text, language);
        candidates.extend(self.catalogs.match_text(text));
        let fused = fusion::fuse(candidates);
        debug!(count = fused.len(), "extracted entities");
        Ok(fused)
    }

    async fn save_entity(&self, entity: &Entity) -> cag_core::Result<()> {
        let entry = CatalogEntry {
            name: entity.name.clone(),
            aliases: entity.aliases.clone(),
            description: entity.description.clone(),
        };
        self.catalogs.save(entity.entity_type, entry).await
    }

    async fn search_entities(&self, query: &str, entity_type: Option<EntityType>) -> cag_core::Result<Vec<Entity>> {
        let hits = self.catalogs.match_text(query);
        Ok(hits.into_iter().filter(|e| entity_type.map_or(true, |t| t == e.entity_type)).collect())
    }

    async fn extract_entity_relations(&self, entities: &[Entity], text: &str) -> cag_core::Result<Vec<Relation>> {
        Ok(relations::extract_relations(entities, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_fuses_and_bounds_entities() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = EntityExtractor::load(dir.path()).unwrap();
        let entities = extractor
            .extract_entities("Dr. Ramirez trabaja en Acme Corp desde 2019, su email es ramirez@acme.com", "es")
            .await
            .unwrap();
        assert!(!entities.is_empty());
        assert!(entities.len() <= MAX_ENTITIES);
    }

    #[tokio::test]
    async fn save_then_search_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = EntityExtractor::load(dir.path()).unwrap();
        let now = chrono::Utc::now();
        let mut entity = Entity::new("Ada Lovelace", EntityType::Person, 0.9, now);
        entity.description = Some("mathematician".into());
        extractor.save_entity(&entity).await.unwrap();

        let hits = extractor.search_entities("conocemos a Ada Lovelace bien", Some(EntityType::Person)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].description.as_deref(), Some("mathematician"));
    }

    #[tokio::test]
    async fn search_respects_type_filter() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = EntityExtractor::load(dir.path()).unwrap();
        let now = chrono::Utc::now();
        extractor.save_entity(&Entity::new("Acme", EntityType::Organization, 0.9, now)).await.unwrap();

        let hits = extractor.search_entities("trabajo en Acme", Some(EntityType::Person)).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn end_to_end_extraction_and_relations() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = EntityExtractor::load(dir.path()).unwrap();
        let text = "Elena es la fundadora de Acme Corp.";
        let entities = extractor.extract_entities(text, "es").await.unwrap();
        let relations = extractor.extract_entity_relations(&entities, text).await.unwrap();
        assert!(!relations.is_empty());
    }
}
