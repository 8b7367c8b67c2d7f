//! JSON-file project persistence: one pretty-printed file per project under
//! the data directory, newest-first listing.
//!
//! The store never mutates a saved project's code; a bundle that made it
//! past the validator is stored verbatim.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::bundle::CodeBundle;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failure: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A persisted generation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub prompt: String,
    pub code: CodeBundle,
    pub created_at: DateTime<Utc>,
}

/// File-backed project store rooted at a data directory.
pub struct ProjectStore {
    dir: PathBuf,
}

impl ProjectStore {
    /// Open (creating if needed) a store at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Persist a generation, assigning an id and creation timestamp.
    pub fn save(&self, prompt: &str, code: CodeBundle) -> Result<Project, StoreError> {
        let project = Project {
            id: Uuid::new_v4(),
            prompt: prompt.to_string(),
            code,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&project)?;
        fs::write(self.path_for(project.id), json)?;
        Ok(project)
    }

    /// All projects, most recent first. Unreadable entries are skipped with
    /// a warning rather than failing the whole listing.
    pub fn list(&self) -> Result<Vec<Project>, StoreError> {
        let mut projects = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let loaded = fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|text| serde_json::from_str::<Project>(&text).map_err(StoreError::from));
            match loaded {
                Ok(project) => projects.push(project),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable project file");
                }
            }
        }
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Remove a project; returns `false` when it does not exist.
    pub fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}
