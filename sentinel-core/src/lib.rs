//! Sentinel core library: domain types, configuration, errors.
//!
//! - [`types`]: application names, revisions, health/sync enums, notifications
//! - [`config`]: layered configuration and validation
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ConfigOverrides, RepoCoordinates, RollbackMode, RollbackSettings};
pub use error::ConfigError;
pub use types::{
    AppName, ApplicationObservation, Health, Notification, NotifyLevel, Revision, StatusSnapshot,
    SyncState,
};
