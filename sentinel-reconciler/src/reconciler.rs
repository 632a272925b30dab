//! Owned state store around the pure transition functions.

use std::collections::HashMap;

use sentinel_core::{AppName, ApplicationObservation};

use crate::effect::{RollbackOutcome, SideEffect};
use crate::machine::{apply_rollback_outcome, reconcile, Policy};
use crate::state::TrackedState;

/// Per-application tracked state, keyed by application name.
///
/// Entries are created lazily on the first observation and live for the
/// lifetime of the instance. The monitor's own application never gets one.
#[derive(Debug, Default)]
pub struct Reconciler {
    policy: Policy,
    states: HashMap<AppName, TrackedState>,
}

impl Reconciler {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            states: HashMap::new(),
        }
    }

    pub fn is_excluded(&self, app: &AppName) -> bool {
        self.policy.is_excluded(app)
    }

    /// Run the state machine for one observation and return the intents to
    /// execute, in order.
    pub fn observe(&mut self, observation: &ApplicationObservation) -> Vec<SideEffect> {
        if self.is_excluded(&observation.name) {
            tracing::debug!(app = %observation.name, "skipping monitor application");
            return Vec::new();
        }

        let slot = self.states.entry(observation.name.clone()).or_default();
        let before = slot.phase();
        let (next, effects) = reconcile(&self.policy, observation, std::mem::take(slot));
        let after = next.phase();
        *slot = next;

        if before != after {
            tracing::info!(
                app = %observation.name,
                from = %before,
                to = %after,
                "application state changed",
            );
        }
        effects
    }

    /// Feed back the outcome of a rollback intent.
    pub fn record_rollback(&mut self, app: &AppName, outcome: RollbackOutcome) -> Vec<SideEffect> {
        let Some(slot) = self.states.get_mut(app) else {
            tracing::warn!(app = %app, "rollback outcome for untracked application ignored");
            return Vec::new();
        };
        let (next, effects) = apply_rollback_outcome(app, std::mem::take(slot), outcome);
        *slot = next;
        if effects.is_empty() {
            tracing::warn!(app = %app, "rollback outcome without a pending rollback ignored");
        }
        effects
    }

    pub fn state(&self, app: &AppName) -> Option<&TrackedState> {
        self.states.get(app)
    }

    /// Snapshot of every tracked application, sorted by name.
    pub fn tracked(&self) -> Vec<(AppName, TrackedState)> {
        let mut entries: Vec<_> = self
            .states
            .iter()
            .map(|(name, state)| (name.clone(), state.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::{Health, StatusSnapshot, SyncState};

    #[test]
    fn entries_are_created_lazily() {
        let mut reconciler = Reconciler::default();
        assert!(reconciler.is_empty());
        reconciler.observe(&ApplicationObservation::new(
            "web",
            StatusSnapshot::new(Health::Healthy, SyncState::Synced, "r1"),
        ));
        assert_eq!(reconciler.len(), 1);
        assert!(reconciler.state(&AppName::from("web")).is_some());
    }

    #[test]
    fn record_rollback_for_unknown_app_is_a_noop() {
        let mut reconciler = Reconciler::default();
        let effects =
            reconciler.record_rollback(&AppName::from("ghost"), RollbackOutcome::Acknowledged);
        assert!(effects.is_empty());
        assert!(reconciler.is_empty());
    }

    #[test]
    fn tracked_snapshot_is_sorted() {
        let mut reconciler = Reconciler::default();
        for name in ["zeta", "alpha", "mid"] {
            reconciler.observe(&ApplicationObservation::new(name, StatusSnapshot::default()));
        }
        let names: Vec<_> = reconciler
            .tracked()
            .into_iter()
            .map(|(name, _)| name.0)
            .collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }
}
