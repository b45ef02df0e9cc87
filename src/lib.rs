//! Billable time tracking against projects and roles.
//!
//! A command resolves a project through the [`registry`], loads it from its
//! vault via the [`storage`] port, then either toggles tracking
//! ([`tracking`]) or summarizes closed entries by period ([`summary`]).

pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod storage;
pub mod summary;
pub mod tracking;
pub mod workflow;

pub use error::{Result, TimekeeperError};
