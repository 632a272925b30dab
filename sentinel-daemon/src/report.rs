//! Per-cycle summaries.

use sentinel_core::{AppName, Health, Revision, SyncState};
use sentinel_reconciler::Phase;

/// What one cycle observed and did for one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppReport {
    pub name: AppName,
    pub health: Health,
    pub sync: SyncState,
    pub revision: Revision,
    pub phase: Phase,
    pub attempts: u32,
    pub paused: bool,
    /// Labels of the side effects executed, in order.
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub apps: Vec<AppReport>,
    /// Applications listed but never tracked (the monitor itself).
    pub skipped: Vec<AppName>,
}

impl CycleReport {
    pub fn count_actions(&self, prefix: &str) -> usize {
        self.apps
            .iter()
            .flat_map(|app| app.actions.iter())
            .filter(|label| label.starts_with(prefix))
            .count()
    }

    pub fn paused(&self) -> usize {
        self.apps.iter().filter(|app| app.paused).count()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            apps = self.apps.len(),
            skipped = self.skipped.len(),
            syncs = self.count_actions("sync"),
            rollbacks = self.count_actions("rollback"),
            notifications = self.count_actions("notify"),
            paused = self.paused(),
            "cycle complete",
        );
    }
}
