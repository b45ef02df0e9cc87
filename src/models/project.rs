use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::role::Role;
use super::time_entry::TimeEntry;
use crate::error::{Result, TimekeeperError};

/// A project with its roles and time entries.
///
/// The project name is the primary key across every vault. The first role
/// added becomes the default role, used whenever no role is given.
///
/// `time_entries` is append-only and kept in insertion order, which is also
/// chronological order. The only mutation of an existing entry is closing the
/// latest entry of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
            time_entries: Vec::new(),
        }
    }

    /// Look up a role by name. An empty name resolves to the default role.
    pub fn get_role(&self, role_name: &str) -> Result<&Role> {
        if role_name.is_empty() {
            let role = self
                .default_role()
                .ok_or_else(|| TimekeeperError::NoRoles(self.name.clone()))?;
            tracing::debug!(project = %self.name, role = %role.name, "no role given, using default role");
            return Ok(role);
        }

        self.roles
            .iter()
            .find(|role| role.name == role_name)
            .ok_or_else(|| TimekeeperError::RoleNotFound(role_name.to_string()))
    }

    pub fn default_role(&self) -> Option<&Role> {
        self.roles.first()
    }

    pub fn has_role(&self, role_name: &str) -> bool {
        self.roles.iter().any(|role| role.name == role_name)
    }

    /// Append a role. Role names must be unique within the project.
    pub fn add_role(&mut self, role: Role) -> Result<()> {
        if self.has_role(&role.name) {
            return Err(TimekeeperError::RoleExists(role.name));
        }
        self.roles.push(role);
        Ok(())
    }

    /// The latest entry for `role_name`, or the latest entry overall when
    /// `role_name` is empty.
    pub fn last_time_entry(&self, role_name: &str) -> Option<&TimeEntry> {
        if role_name.is_empty() {
            return self.time_entries.last();
        }
        self.time_entries
            .iter()
            .rev()
            .find(|entry| entry.role_name == role_name)
    }

    fn last_time_entry_mut(&mut self, role_name: &str) -> Option<&mut TimeEntry> {
        self.time_entries
            .iter_mut()
            .rev()
            .find(|entry| entry.role_name == role_name)
    }

    /// Whether `role_name` currently has an open entry.
    pub fn is_tracking(&self, role_name: &str) -> bool {
        self.last_time_entry(role_name)
            .is_some_and(|entry| entry.is_open())
    }

    /// Append an open entry for `role_name`. Callers check that the role has
    /// no open entry first.
    pub fn start_time_entry(&mut self, role_name: &str, at: NaiveDateTime) -> &TimeEntry {
        self.time_entries.push(TimeEntry::start(role_name, at));
        &self.time_entries[self.time_entries.len() - 1]
    }

    /// Stamp the end time of the latest entry for `role_name`.
    pub fn end_time_entry(&mut self, role_name: &str, at: NaiveDateTime) -> Result<&TimeEntry> {
        let entry = self
            .last_time_entry_mut(role_name)
            .ok_or_else(|| TimekeeperError::PreviousTimeEntryClosed(role_name.to_string()))?;
        entry.finish(at);
        Ok(entry)
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn project() -> Project {
        let mut project = Project::new("acme");
        project.add_role(Role::new("dev", 50)).unwrap();
        project.add_role(Role::new("pm", 80)).unwrap();
        project
    }

    #[test]
    fn test_get_role_by_name() {
        let project = project();
        assert_eq!(project.get_role("pm").unwrap().hourly_rate, 80);
    }

    #[test]
    fn test_empty_role_name_is_default_role() {
        let project = project();
        assert_eq!(project.get_role("").unwrap().name, "dev");
    }

    #[test]
    fn test_unknown_role() {
        let err = project().get_role("qa").unwrap_err();
        assert!(matches!(err, TimekeeperError::RoleNotFound(name) if name == "qa"));
    }

    #[test]
    fn test_default_role_without_roles() {
        let err = Project::new("empty").get_role("").unwrap_err();
        assert!(matches!(err, TimekeeperError::NoRoles(name) if name == "empty"));
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let mut project = project();
        let err = project.add_role(Role::new("dev", 10)).unwrap_err();
        assert!(matches!(err, TimekeeperError::RoleExists(name) if name == "dev"));
        assert_eq!(project.roles.len(), 2);
    }

    #[test]
    fn test_last_time_entry_per_role() {
        let mut project = project();
        assert!(project.last_time_entry("").is_none());

        project.start_time_entry("dev", at(9));
        project.start_time_entry("pm", at(10));

        assert_eq!(project.last_time_entry("dev").unwrap().role_name, "dev");
        assert_eq!(project.last_time_entry("").unwrap().role_name, "pm");
        assert!(project.last_time_entry("qa").is_none());
    }

    #[test]
    fn test_end_time_entry_closes_latest_for_role() {
        let mut project = project();
        project.start_time_entry("dev", at(9));
        project.start_time_entry("pm", at(10));

        project.end_time_entry("dev", at(11)).unwrap();

        assert!(!project.is_tracking("dev"));
        assert!(project.is_tracking("pm"));
        assert_eq!(project.time_entries[0].end_time, "2023-01-01 11:00:00.000000");
    }

    #[test]
    fn test_end_time_entry_without_entries() {
        let mut project = project();
        let err = project.end_time_entry("dev", at(9)).unwrap_err();
        assert!(matches!(err, TimekeeperError::PreviousTimeEntryClosed(_)));
    }
}
