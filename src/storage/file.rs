use std::fs;
use std::path::{Path, PathBuf};

use super::ProjectStorage;
use crate::error::{Result, TimekeeperError};
use crate::models::Project;

/// A vault directory holding one `<name>.json` file per project.
#[derive(Debug, Clone)]
pub struct FileVault {
    base_path: PathBuf,
}

impl FileVault {
    /// Open a vault, creating the directory if needed.
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn path(&self, project_name: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", project_name))
    }
}

impl ProjectStorage for FileVault {
    fn load(&self, project_name: &str) -> Result<Project> {
        let path = self.path(project_name);
        if !path.is_file() {
            return Err(TimekeeperError::ProjectNotFound(project_name.to_string()));
        }

        tracing::debug!(path = %path.display(), "loading project");
        let content = fs::read_to_string(&path)?;
        let project = serde_json::from_str(&content)?;
        Ok(project)
    }

    fn save(&self, project: &Project) -> Result<()> {
        let path = self.path(&project.name);
        tracing::debug!(path = %path.display(), "saving project");

        let content = serde_json::to_string_pretty(project)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn exists(&self, project_name: &str) -> bool {
        self.path(project_name).is_file()
    }
}
