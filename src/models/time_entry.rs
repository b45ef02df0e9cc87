use chrono::{DateTime, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TimekeeperError};

/// Format used when stamping new entries: local wall-clock time with
/// microsecond precision, e.g. `2023-01-02 09:00:00.000000`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const ACCEPTED_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// One start/stop pair of timestamps attributed to a role.
///
/// Timestamps are kept as the strings found on disk so a load/save cycle
/// never rewrites them. An entry is **open** while it has a start time and an
/// empty end time; every other entry is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub role_name: String,
    pub start_time: String,
    /// Empty while the entry is open; never `null` on disk.
    #[serde(default)]
    pub end_time: String,
}

impl TimeEntry {
    /// A new open entry for `role_name` started at `at`.
    pub fn start(role_name: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            role_name: role_name.into(),
            start_time: format_timestamp(at),
            end_time: String::new(),
        }
    }

    pub fn finish(&mut self, at: NaiveDateTime) {
        self.end_time = format_timestamp(at);
    }

    pub fn is_open(&self) -> bool {
        !self.start_time.is_empty() && self.end_time.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    pub fn started_at(&self) -> Result<NaiveDateTime> {
        parse_timestamp(&self.start_time)
    }

    /// `None` while the entry is still open.
    pub fn ended_at(&self) -> Result<Option<NaiveDateTime>> {
        if self.end_time.is_empty() {
            return Ok(None);
        }
        parse_timestamp(&self.end_time).map(Some)
    }

    /// Elapsed time of a closed entry; `None` for open entries.
    pub fn duration(&self) -> Result<Option<Duration>> {
        if self.is_open() {
            return Ok(None);
        }
        match self.ended_at()? {
            Some(end) => Ok(Some(end - self.started_at()?)),
            None => Ok(None),
        }
    }
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp.
///
/// Accepts a space or `T` separator, optional seconds and fractional seconds.
/// RFC 3339 strings carrying an offset keep their wall-clock value.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    for format in ACCEPTED_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .map_err(|_| TimekeeperError::InvalidTimestamp(value.to_string()))
}
