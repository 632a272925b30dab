//! Wire models for the Argo CD `applications` API.
//!
//! Only the fields the reconciler needs are modelled; every one of them is
//! optional so a partial payload degrades to `Unknown` instead of failing.

use serde::Deserialize;

use sentinel_core::{ApplicationObservation, Health, Revision, StatusSnapshot, SyncState};

/// `GET /applications` response. Argo CD sends `"items": null` when empty.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationList {
    #[serde(default)]
    pub items: Option<Vec<Application>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub status: ApplicationStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationStatus {
    #[serde(default)]
    pub health: Option<HealthStatus>,
    #[serde(default)]
    pub sync: Option<SyncStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub revision: Option<String>,
}

impl Application {
    pub fn snapshot(&self) -> StatusSnapshot {
        let health = self
            .status
            .health
            .as_ref()
            .and_then(|h| h.status.as_deref())
            .map(Health::from_raw)
            .unwrap_or_default();
        let sync = self.status.sync.as_ref();
        let sync_state = sync
            .and_then(|s| s.status.as_deref())
            .map(SyncState::from_raw)
            .unwrap_or_default();
        let revision = sync
            .and_then(|s| s.revision.as_deref())
            .filter(|r| !r.trim().is_empty())
            .map(Revision::from)
            .unwrap_or_default();
        StatusSnapshot {
            health,
            sync: sync_state,
            revision,
        }
    }

    /// `None` when the controller omitted the application name.
    pub fn observation(&self) -> Option<ApplicationObservation> {
        let name = self.metadata.name.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        Some(ApplicationObservation::new(name, self.snapshot()))
    }
}
