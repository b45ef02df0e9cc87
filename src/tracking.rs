//! Start/stop state machine for time tracking.
//!
//! Each (project, role) pair is either closed (no open entry) or open (its
//! latest entry has no end time). [`ToggleTracking`] flips that state and
//! persists the project. [`start_tracking`] and [`stop_tracking`] carry their
//! own guards so they stay consistent when called directly.

use chrono::{Local, NaiveDateTime};

use crate::error::{Result, TimekeeperError};
use crate::models::Project;
use crate::storage::ProjectStorage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A new entry was opened at this timestamp.
    Started(String),
    /// The open entry was closed at this timestamp.
    Stopped(String),
}

/// How the toggled role was picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChoice {
    /// The requested role exists.
    Requested,
    /// No role was given; the default role was used.
    Unspecified,
    /// The requested role does not exist; the default role was used.
    Fallback(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub project: String,
    /// The role that was actually toggled.
    pub role: String,
    pub transition: Transition,
    pub choice: RoleChoice,
}

impl ToggleOutcome {
    /// Notice for the user when the default role stood in for the request.
    pub fn notice(&self) -> Option<String> {
        match &self.choice {
            RoleChoice::Requested => None,
            RoleChoice::Unspecified => {
                Some(format!("No role given. Using default role \"{}\".", self.role))
            }
            RoleChoice::Fallback(missing) => Some(format!(
                "Role \"{}\" not found in project \"{}\". Defaulted to role \"{}\".",
                missing, self.project, self.role
            )),
        }
    }
}

impl std::fmt::Display for ToggleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.transition {
            Transition::Started(at) => write!(f, "Started tracking at {}", at),
            Transition::Stopped(at) => write!(f, "Stopped tracking at {}", at),
        }
    }
}

pub struct ToggleTracking<'a, S: ProjectStorage> {
    storage: &'a S,
}

impl<'a, S: ProjectStorage> ToggleTracking<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Toggle `role_name` on `project` using the local clock.
    pub fn execute(&self, project: &mut Project, role_name: &str) -> Result<ToggleOutcome> {
        self.execute_at(project, role_name, Local::now().naive_local())
    }

    pub fn execute_at(
        &self,
        project: &mut Project,
        role_name: &str,
        now: NaiveDateTime,
    ) -> Result<ToggleOutcome> {
        let (role, choice) = match project.get_role(role_name) {
            Ok(role) if role_name.is_empty() => (role.name.clone(), RoleChoice::Unspecified),
            Ok(role) => (role.name.clone(), RoleChoice::Requested),
            Err(TimekeeperError::RoleNotFound(missing)) => {
                let role = project
                    .default_role()
                    .ok_or_else(|| TimekeeperError::NoRoles(project.name.clone()))?;
                tracing::warn!(
                    project = %project.name,
                    requested = %missing,
                    role = %role.name,
                    "role not found, defaulting"
                );
                (role.name.clone(), RoleChoice::Fallback(missing))
            }
            Err(e) => return Err(e),
        };

        let transition = if project.is_tracking(&role) {
            Transition::Stopped(stop_tracking(project, &role, now)?)
        } else {
            Transition::Started(start_tracking(project, &role, now)?)
        };

        self.storage.save(project)?;

        Ok(ToggleOutcome {
            project: project.name.clone(),
            role,
            transition,
            choice,
        })
    }
}

/// Open a new entry for `role_name`. Returns the stored start timestamp.
pub fn start_tracking(project: &mut Project, role_name: &str, now: NaiveDateTime) -> Result<String> {
    if project.is_tracking(role_name) {
        return Err(TimekeeperError::PreviousTimeEntryOpen(role_name.to_string()));
    }

    let start_time = project.start_time_entry(role_name, now).start_time.clone();
    tracing::info!(project = %project.name, role = role_name, at = %start_time, "started tracking");
    Ok(start_time)
}

/// Close the open entry for `role_name`. Returns the stored end timestamp.
pub fn stop_tracking(project: &mut Project, role_name: &str, now: NaiveDateTime) -> Result<String> {
    if !project.is_tracking(role_name) {
        return Err(TimekeeperError::PreviousTimeEntryClosed(role_name.to_string()));
    }

    let end_time = project.end_time_entry(role_name, now)?.end_time.clone();
    tracing::info!(project = %project.name, role = role_name, at = %end_time, "stopped tracking");
    Ok(end_time)
}

/// Human-readable status of the project's latest entry.
pub fn status_line(project: &Project) -> String {
    match project.last_time_entry("") {
        Some(entry) if entry.is_open() => format!(
            "Timer running for role \"{}\" since {}.",
            entry.role_name, entry.start_time
        ),
        _ => "No timer running.".to_string(),
    }
}
