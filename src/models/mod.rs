//! Domain models for timekeeper.
//!
//! - [`Project`]: the unit of storage, uniquely named across all vaults.
//! - [`Role`]: a named role with an hourly rate. The first role on a project is its default.
//! - [`TimeEntry`]: one start/stop pair of timestamps attributed to a role.
//!   At most one entry per role is open at a time, and it is always that role's latest.

mod project;
mod role;
mod time_entry;

pub use project::*;
pub use role::*;
pub use time_entry::*;
