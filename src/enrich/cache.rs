//! Content-hash keyed cache of generated project copy

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::projects::ProjectEntity;

const HASH_CHARS: usize = 12;

/// Generated copy. A field the service left out stays `None` so it never
/// overwrites what the project already has.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Enrichment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
}

/// Short digest of the fields that generated copy depends on. A change to
/// any of them retires the cached entry.
pub(crate) fn project_hash(project: &ProjectEntity) -> String {
    let key = format!(
        "{}|{}|{}",
        project.name, project.description, project.total_messages
    );
    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    digest[..HASH_CHARS].to_string()
}

pub(crate) fn cache_key(project: &ProjectEntity) -> String {
    format!("{}_{}", project.slug, project_hash(project))
}

#[derive(Debug, Default)]
pub(crate) struct EnrichmentCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, Enrichment>,
    dirty: bool,
}

impl EnrichmentCache {
    pub(crate) fn load(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!("ignoring unreadable enrichment cache {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: Some(path.to_path_buf()),
            entries,
            dirty: false,
        }
    }

    /// A cache that is never written back.
    pub(crate) fn in_memory() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Enrichment> {
        self.entries.get(key)
    }

    pub(crate) fn insert(&mut self, key: String, value: Enrichment) {
        self.entries.insert(key, value);
        self.dirty = true;
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Write the cache back if anything was added since loading.
    pub(crate) fn save(&mut self) -> Result<(), AppError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            AppError::Serialize {
                what: "enrichment cache",
                source,
            }
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AppError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| AppError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        self.dirty = false;
        Ok(())
    }
}
