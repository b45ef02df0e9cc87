use thiserror::Error;

/// Errors raised by the timekeeper core.
///
/// Only [`TimekeeperError::RoleNotFound`] is ever recovered inside a use case
/// (toggle falls back to the default role). Everything else propagates to the
/// command handler, which prints the message and exits non-zero.
#[derive(Debug, Error)]
pub enum TimekeeperError {
    #[error("Project \"{0}\" does not exist.")]
    ProjectNotFound(String),

    #[error("Role \"{0}\" does not exist.")]
    RoleNotFound(String),

    #[error("Project \"{0}\" has no roles.")]
    NoRoles(String),

    #[error("Role \"{0}\" already exists.")]
    RoleExists(String),

    #[error("Role \"{0}\" already has an open time entry.")]
    PreviousTimeEntryOpen(String),

    #[error("Role \"{0}\" has no open time entry.")]
    PreviousTimeEntryClosed(String),

    #[error("Invalid period \"{0}\", expected daily, weekly or monthly.")]
    InvalidPeriod(String),

    #[error("Invalid timestamp \"{0}\".")]
    InvalidTimestamp(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TimekeeperError>;
