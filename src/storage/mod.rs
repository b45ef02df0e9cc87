//! Storage port for projects.
//!
//! The core only talks to [`ProjectStorage`]. [`FileVault`] is the
//! file-backed adapter: one JSON document per project inside a vault
//! directory. Saves replace the whole document.

mod file;

pub use file::FileVault;

use crate::error::Result;
use crate::models::Project;

pub trait ProjectStorage {
    /// Load a project by name. Fails with `ProjectNotFound` when absent.
    fn load(&self, project_name: &str) -> Result<Project>;

    /// Persist the full project, replacing any previous copy.
    fn save(&self, project: &Project) -> Result<()>;

    fn exists(&self, project_name: &str) -> bool;
}
