//! Period summaries of tracked time.
//!
//! Closed entries are bucketed by the calendar day, ISO week or month of
//! their start time, and totalled per role. Open entries have no duration yet
//! and are left out.
//!
//! Bucket keys start with an ISO date, so sorting them as strings puts them
//! in chronological order:
//!
//! ```text
//! daily   2023-01-02 (Monday)
//! weekly  2023-01-02 (1)        Monday of the week, ISO week number
//! monthly 2023-01-01 (January)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Result, TimekeeperError};
use crate::models::Project;
use crate::registry::ProjectRegistry;
use crate::storage::{FileVault, ProjectStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Bucket key for an entry started on `date`.
    pub fn bucket_key(&self, date: NaiveDate) -> String {
        match self {
            Self::Daily => format!("{} ({})", date, date.format("%A")),
            Self::Weekly => {
                let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                format!("{} ({})", monday, date.iso_week().week())
            }
            Self::Monthly => {
                let first = date.with_day(1).unwrap_or(date);
                format!("{} ({})", first, first.format("%B"))
            }
        }
    }
}

impl FromStr for Period {
    type Err = TimekeeperError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(TimekeeperError::InvalidPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated time for one period bucket, roles in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    pub roles: Vec<(String, Duration)>,
}

impl Bucket {
    fn add(&mut self, role_name: &str, duration: Duration) {
        match self.roles.iter_mut().find(|(name, _)| name == role_name) {
            Some((_, total)) => *total = *total + duration,
            None => self.roles.push((role_name.to_string(), duration)),
        }
    }

    pub fn total(&self, role_name: &str) -> Option<Duration> {
        self.roles
            .iter()
            .find(|(name, _)| name == role_name)
            .map(|(_, total)| *total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub period: Period,
    pub project_name: String,
    /// Bucket key -> per-role totals, in ascending key order.
    pub buckets: BTreeMap<String, Bucket>,
    /// Hourly rate of each role on the project when summarized.
    pub rates: BTreeMap<String, u32>,
}

/// How role totals are rendered in a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStyle {
    /// `H:MM:SS` instead of fractional hours.
    pub precise: bool,
    /// Append the billable amount, e.g. `dev: 1.00 ($50.00)`.
    pub billable: bool,
}

impl Summary {
    /// Billable amount per role across all buckets, in role name order.
    /// Roles with no time, or no longer on the project, are skipped.
    pub fn billable(&self) -> Vec<(String, f64)> {
        self.rates
            .iter()
            .filter_map(|(role_name, rate)| {
                let total = self
                    .buckets
                    .values()
                    .filter_map(|bucket| bucket.total(role_name))
                    .fold(Duration::zero(), |acc, d| acc + d);
                if total.is_zero() {
                    return None;
                }
                Some((role_name.clone(), amount(total, *rate)))
            })
            .collect()
    }

    /// Render the report.
    ///
    /// ```text
    /// daily summary for "acme"
    ///
    /// 2023-01-01 (Sunday):
    ///   dev: 1.00 ($50.00)
    /// ```
    pub fn report(&self, style: ReportStyle) -> String {
        let mut output = format!("{} summary for \"{}\"\n", self.period, self.project_name);
        for (key, bucket) in &self.buckets {
            output.push('\n');
            output.push_str(key);
            output.push_str(":\n");
            for (role_name, total) in &bucket.roles {
                let time = if style.precise {
                    clock_time(*total)
                } else {
                    format!("{:.2}", hours(*total))
                };
                output.push_str(&format!("  {}: {}", role_name, time));
                if style.billable {
                    if let Some(rate) = self.rates.get(role_name) {
                        output.push_str(&format!(" (${:.2})", amount(*total, *rate)));
                    }
                }
                output.push('\n');
            }
        }
        output
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report(ReportStyle::default()))
    }
}

/// Fractional hours, to microsecond precision.
pub fn hours(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(micros) => micros as f64 / 3_600_000_000.0,
        None => duration.num_seconds() as f64 / 3600.0,
    }
}

/// Whole seconds as `H:MM:SS`; hours are not wrapped at a day.
pub fn clock_time(duration: Duration) -> String {
    let seconds = duration.num_seconds();
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        seconds / 3600,
        seconds % 3600 / 60,
        seconds % 60
    )
}

fn amount(duration: Duration, rate: u32) -> f64 {
    hours(duration) * rate as f64
}

/// Summarize the project's closed entries by `period`.
pub fn summarize(period: Period, project: &Project) -> Result<Summary> {
    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();

    for entry in &project.time_entries {
        let Some(duration) = entry.duration()? else {
            continue;
        };
        let key = period.bucket_key(entry.started_at()?.date());
        buckets.entry(key).or_default().add(&entry.role_name, duration);
    }

    tracing::debug!(project = %project.name, period = %period, buckets = buckets.len(), "summarized");

    Ok(Summary {
        period,
        project_name: project.name.clone(),
        buckets,
        rates: project
            .roles
            .iter()
            .map(|role| (role.name.clone(), role.hourly_rate))
            .collect(),
    })
}

/// Reports for `project_name`, or for every registered project in name
/// order when `None`, separated by a blank line.
pub fn report_projects(
    registry: &ProjectRegistry,
    project_name: Option<&str>,
    period: Period,
    style: ReportStyle,
) -> Result<String> {
    let names = match project_name {
        Some(name) => vec![name.to_string()],
        None => registry.list_projects().into_iter().collect(),
    };

    let mut reports = Vec::with_capacity(names.len());
    for name in &names {
        let vault = FileVault::open(registry.get_vault_path(name)?)?;
        let project = vault.load(name)?;
        reports.push(summarize(period, &project)?.report(style));
    }
    Ok(reports.join("\n"))
}

/// Like [`summarize`], for a period given as text. Unknown periods fail
/// before anything is computed.
pub fn summarize_str(period: &str, project: &Project) -> Result<Summary> {
    summarize(period.parse()?, project)
}
