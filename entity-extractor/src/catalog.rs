//! Known-entity catalogs: four JSON files (persons, organizations,
//! locations, concepts) loaded into memory at startup and matched against
//! incoming text by whole-word substring search. Grounded in
//! `storage/src/message_repo.rs`'s pattern of a `RwLock`-guarded in-memory
//! index backed by an on-disk file, rewritten wholesale on update.

use cag_core::atomic::atomic_write_json;
use cag_types::{Entity, EntityType};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::warn;

/// One known entity as stored in a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub description: Option<String>,
}

const CATALOG_FILES: [(EntityType, &str); 4] = [
    (EntityType::Person, "persons.json"),
    (EntityType::Organization, "organizations.json"),
    (EntityType::Location, "locations.json"),
    (EntityType::Concept, "concepts.json"),
];

/// Confidence for a direct name match.
const NAME_MATCH_CONFIDENCE: f32 = 0.85;
/// Confidence for a match against one of an entry's aliases (slightly
/// discounted relative to a canonical-name match).
const ALIAS_MATCH_CONFIDENCE: f32 = NAME_MATCH_CONFIDENCE * 0.95;

/// The four known-entity catalogs, held in memory and refreshed on disk as
/// entries are added. Each catalog is independently lockable so a write to
/// `persons.json` never blocks a read of `locations.json`.
pub struct KnownEntityCatalogs {
    dir: PathBuf,
    catalogs: HashMap<EntityType, RwLock<Vec<CatalogEntry>>>,
}

impl KnownEntityCatalogs {
    /// Loads all four catalog files from `dir`. Missing files start empty
    /// rather than erroring, so a fresh deployment needs no seed data.
    pub fn load(dir: impl Into<PathBuf>) -> cag_core::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let mut catalogs = HashMap::new();
        for (entity_type, file_name) in CATALOG_FILES {
            let path = dir.join(file_name);
            let entries: Vec<CatalogEntry> = match std::fs::read(&path) {
                Ok(bytes) => serde_json::from_slice(&bytes).map_err(cag_core::Error::Serialization)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
                Err(e) => return Err(e.into()),
            };
            catalogs.insert(entity_type, RwLock::new(entries));
        }
        Ok(Self { dir, catalogs })
    }

    fn path_for(&self, entity_type: EntityType) -> PathBuf {
        let file_name = CATALOG_FILES
            .iter()
            .find(|(t, _)| *t == entity_type)
            .map(|(_, f)| *f)
            .unwrap_or("misc.json");
        self.dir.join(file_name)
    }

    /// Appends `entry` to the catalog for `entity_type` and rewrites the
    /// backing file. A no-op if `entity_type` has no catalog (e.g. `Date`).
    pub async fn save(&self, entity_type: EntityType, entry: CatalogEntry) -> cag_core::Result<()> {
        let Some(lock) = self.catalogs.get(&entity_type) else {
            return Ok(());
        };
        let snapshot = {
            let mut guard = lock.write().map_err(|_| cag_core::Error::LockTimeout("catalog write lock poisoned".into()))?;
            guard.push(entry);
            guard.clone()
        };
        atomic_write_json(&self.path_for(entity_type), &snapshot).await
    }

    /// Whole-word, case-insensitive match of `text` against every loaded
    /// catalog. Each hit becomes a fresh [`Entity`] carrying the catalog
    /// entry's description.
    pub fn match_text(&self, text: &str) -> Vec<Entity> {
        let padded = format!(" {} ", text.to_lowercase());
        let now = Utc::now();
        let mut out = Vec::new();

        for (entity_type, lock) in &self.catalogs {
            let Ok(entries) = lock.read() else {
                warn!("catalog read lock poisoned for {:?}", entity_type);
                continue;
            };
            for entry in entries.iter() {
                let needle = format!(" {} ", entry.name.to_lowercase());
                if padded.contains(&needle) {
                    let mut e = Entity::new(entry.name.clone(), *entity_type, NAME_MATCH_CONFIDENCE, now);
                    e.description = entry.description.clone();
                    e.aliases = entry.aliases.clone();
                    out.push(e);
                    continue;
                }
                for alias in &entry.aliases {
                    let alias_needle = format!(" {} ", alias.to_lowercase());
                    if padded.contains(&alias_needle) {
                        let mut e = Entity::new(entry.name.clone(), *entity_type, ALIAS_MATCH_CONFIDENCE, now);
                        e.description = entry.description.clone();
                        e.aliases = entry.aliases.clone();
                        out.push(e);
                        break;
                    }
                }
            }
        }

        out
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn matches_known_person_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let catalogs = KnownEntityCatalogs::load(dir.path()).unwrap();
        catalogs
            .save(
                EntityType::Person,
                CatalogEntry { name: "Marie Curie".into(), aliases: vec![], description: Some("physicist".into()) },
            )
            .await
            .unwrap();

        let hits = catalogs.match_text("estudiamos el trabajo de Marie Curie ayer");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].description.as_deref(), Some("physicist"));
    }

    #[tokio::test]
    async fn matches_known_entity_by_alias() {
        let dir = tempfile::tempdir().unwrap();
        let catalogs = KnownEntityCatalogs::load(dir.path()).unwrap();
        catalogs
            .save(
                EntityType::Organization,
                CatalogEntry { name: "International Business Machines".into(), aliases: vec!["IBM".into()], description: None },
            )
            .await
            .unwrap();

        let hits = catalogs.match_text("trabajo en IBM desde 2019");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "International Business Machines");
    }

    #[tokio::test]
    async fn missing_catalog_files_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalogs = KnownEntityCatalogs::load(dir.path()).unwrap();
        assert!(catalogs.match_text("cualquier texto").is_empty());
    }

    #[tokio::test]
    async fn save_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let catalogs = KnownEntityCatalogs::load(dir.path()).unwrap();
            catalogs
                .save(EntityType::Location, CatalogEntry { name: "Gotham".into(), aliases: vec![], description: None })
                .await
                .unwrap();
        }
        let reloaded = KnownEntityCatalogs::load(dir.path()).unwrap();
        assert_eq!(reloaded.match_text("volvimos a Gotham").len(), 1);
    }
}
