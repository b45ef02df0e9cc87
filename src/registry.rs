//! Global project index.
//!
//! Project names are unique across every vault. The registry maps each name
//! to the absolute path of its project file and is persisted as
//! `lookup.json` inside the default vault.
//!
//! If the index is missing or unreadable when the registry is opened, it is
//! rebuilt from the project files found in that directory. Only projects in
//! the default vault can be recovered this way; projects in other vaults come
//! back the next time they are registered through `update_index`.
//!
//! There is no locking: one invocation at a time is assumed.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::INDEX_FILENAME;
use crate::error::{Result, TimekeeperError};

/// On-disk shape of `lookup.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryIndex {
    /// Project name -> absolute path of `<name>.json`.
    #[serde(default)]
    pub projects: BTreeMap<String, PathBuf>,
}

#[derive(Debug)]
pub struct ProjectRegistry {
    dir: PathBuf,
    index: RegistryIndex,
}

impl ProjectRegistry {
    /// Open the registry stored in `dir`, rebuilding the index by directory
    /// scan if it is missing or corrupt.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let mut registry = Self {
            dir,
            index: RegistryIndex::default(),
        };

        let index_path = registry.index_path();
        if !index_path.is_file() {
            tracing::info!(path = %index_path.display(), "index missing, rebuilding");
            registry.rebuild()?;
            return Ok(registry);
        }

        let content = fs::read_to_string(&index_path)?;
        match serde_json::from_str(&content) {
            Ok(index) => registry.index = index,
            Err(e) => {
                tracing::warn!(path = %index_path.display(), error = %e, "index corrupt, rebuilding");
                registry.rebuild()?;
            }
        }

        Ok(registry)
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILENAME)
    }

    pub fn index(&self) -> &RegistryIndex {
        &self.index
    }

    /// Replace the index with one derived from the project files in the
    /// registry directory, and persist it.
    pub fn rebuild(&mut self) -> Result<()> {
        let mut projects = BTreeMap::new();

        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if !is_project_file(&path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            projects.insert(name.to_string(), absolute(&path)?);
        }

        tracing::debug!(count = projects.len(), "indexed projects");
        self.index = RegistryIndex { projects };
        self.persist()
    }

    /// Record that `project_name` lives in `vault_path`. Idempotent.
    pub fn update_index(&mut self, vault_path: &Path, project_name: &str) -> Result<()> {
        let project_path = absolute(vault_path)?.join(format!("{}.json", project_name));
        tracing::debug!(project = project_name, path = %project_path.display(), "updating index");

        self.index
            .projects
            .insert(project_name.to_string(), project_path);
        self.persist()
    }

    pub fn exists(&self, project_name: &str) -> bool {
        self.index.projects.contains_key(project_name)
    }

    /// Absolute path of the project's file.
    pub fn get_project_path(&self, project_name: &str) -> Result<&Path> {
        self.index
            .projects
            .get(project_name)
            .map(PathBuf::as_path)
            .ok_or_else(|| TimekeeperError::ProjectNotFound(project_name.to_string()))
    }

    /// The vault directory holding the project.
    pub fn get_vault_path(&self, project_name: &str) -> Result<PathBuf> {
        let project_path = self.get_project_path(project_name)?;
        Ok(project_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default())
    }

    pub fn list_projects(&self) -> BTreeSet<String> {
        self.index.projects.keys().cloned().collect()
    }

    pub fn list_vaults(&self) -> BTreeSet<PathBuf> {
        self.index
            .projects
            .values()
            .filter_map(|path| path.parent().map(Path::to_path_buf))
            .collect()
    }

    fn persist(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.index)?;
        fs::write(self.index_path(), content)?;
        Ok(())
    }
}

/// Files left in directories by operating systems, never projects.
const OS_ARTIFACTS: [&str; 3] = [".DS_Store", "Thumbs.db", "desktop.ini"];

/// Regular `.json` files other than the index and OS artifacts.
fn is_project_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    if file_name == INDEX_FILENAME || OS_ARTIFACTS.contains(&file_name) {
        return false;
    }
    path.is_file() && path.extension().is_some_and(|ext| ext == "json")
}

/// Absolute form of `path` with `.` components removed, without touching
/// the filesystem.
fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}
