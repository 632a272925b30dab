//! Domain types shared by the reconciler, the adapters and the daemon.
//!
//! Controller-reported health and sync values arrive as free-form strings.
//! They are mapped into closed enums here, at the boundary, with an explicit
//! `Unknown` variant so nothing downstream matches on raw strings.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of an application managed by the GitOps controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppName(pub String);

impl AppName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AppName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AppName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque desired-state revision (usually a commit SHA).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision(pub String);

impl Revision {
    /// Sentinel used when the controller does not report a revision.
    pub const UNKNOWN: &'static str = "unknown";

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_owned())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Revision {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Revision {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Controller-reported health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Health {
    Healthy,
    Progressing,
    Degraded,
    Error,
    Suspended,
    Missing,
    #[default]
    Unknown,
}

impl Health {
    /// Map a raw controller value; anything unrecognised becomes `Unknown`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "Healthy" => Health::Healthy,
            "Progressing" => Health::Progressing,
            "Degraded" => Health::Degraded,
            "Error" => Health::Error,
            "Suspended" => Health::Suspended,
            "Missing" => Health::Missing,
            _ => Health::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Healthy => "Healthy",
            Health::Progressing => "Progressing",
            Health::Degraded => "Degraded",
            Health::Error => "Error",
            Health::Suspended => "Suspended",
            Health::Missing => "Missing",
            Health::Unknown => "Unknown",
        }
    }

    /// Degraded or Error: the states that consume the retry budget.
    pub fn is_failing(&self) -> bool {
        matches!(self, Health::Degraded | Health::Error)
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Health {
    fn from(s: String) -> Self {
        Health::from_raw(&s)
    }
}

impl From<Health> for &'static str {
    fn from(h: Health) -> Self {
        h.as_str()
    }
}

/// Whether the live application matches its declared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum SyncState {
    Synced,
    OutOfSync,
    #[default]
    Unknown,
}

impl SyncState {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "Synced" => SyncState::Synced,
            "OutOfSync" => SyncState::OutOfSync,
            _ => SyncState::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Synced => "Synced",
            SyncState::OutOfSync => "OutOfSync",
            SyncState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SyncState {
    fn from(s: String) -> Self {
        SyncState::from_raw(&s)
    }
}

impl From<SyncState> for &'static str {
    fn from(s: SyncState) -> Self {
        s.as_str()
    }
}

/// Presentation level of an operator notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Alert,
    Critical,
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyLevel::Info => write!(f, "info"),
            NotifyLevel::Alert => write!(f, "alert"),
            NotifyLevel::Critical => write!(f, "critical"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Parsed status of one application as reported in a single poll.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub health: Health,
    pub sync: SyncState,
    pub revision: Revision,
}

impl StatusSnapshot {
    pub fn new(health: Health, sync: SyncState, revision: impl Into<Revision>) -> Self {
        Self {
            health,
            sync,
            revision: revision.into(),
        }
    }

    pub fn is_healthy_and_synced(&self) -> bool {
        self.health == Health::Healthy && self.sync == SyncState::Synced
    }
}

/// One application as seen in the current cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationObservation {
    pub name: AppName,
    pub status: StatusSnapshot,
}

impl ApplicationObservation {
    pub fn new(name: impl Into<AppName>, status: StatusSnapshot) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// A structured status message for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub app: AppName,
    /// Status label shown to operators, e.g. `OutOfSync` or `Degraded`.
    pub status: String,
    pub attempts: u32,
    pub message: String,
    pub level: NotifyLevel,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
