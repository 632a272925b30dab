//! The per-application transition function.
//!
//! Rule precedence, evaluated once per application per cycle:
//!
//! 1. the monitor's own application is ignored
//! 2. paused: roll back a failing new revision, recover on Healthy+Synced,
//!    otherwise hold (last-observed values are not refreshed)
//! 3. Healthy+Synced closes the episode and resets the budget
//! 4. OutOfSync spends one attempt
//! 5. Degraded/Error spends one attempt from the same budget
//! 6. anything else only records the observation
//!
//! Both functions here are pure: state in, state and intents out.

use sentinel_core::{AppName, ApplicationObservation, NotifyLevel, SyncState};

use crate::effect::{
    RollbackOutcome, SideEffect, MSG_ATTEMPTING_RECOVERY, MSG_PAUSED, MSG_RECOVERED,
};
use crate::state::{Episode, PauseState, TrackedState};

pub use sentinel_core::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MONITOR_APP};

/// Tunables for the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub max_attempts: u32,
    /// The monitor's own application; never tracked.
    pub monitor_app: AppName,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            monitor_app: AppName::from(DEFAULT_MONITOR_APP),
        }
    }
}

impl Policy {
    pub fn is_excluded(&self, app: &AppName) -> bool {
        *app == self.monitor_app
    }
}

/// Apply one observation to one application's tracked state.
pub fn reconcile(
    policy: &Policy,
    observation: &ApplicationObservation,
    state: TrackedState,
) -> (TrackedState, Vec<SideEffect>) {
    let mut next = state;
    let mut effects = Vec::new();
    let app = &observation.name;
    let status = &observation.status;

    if policy.is_excluded(app) {
        return (next, effects);
    }

    if let Episode::Paused(pause) = &next.episode {
        let new_rollout = status.revision != next.last_revision && !status.revision.is_unknown();
        if status.health.is_failing() && new_rollout {
            if *pause == PauseState::AwaitingRevision {
                effects.push(SideEffect::RequestRollback {
                    app: app.clone(),
                    revision: status.revision.clone(),
                });
                next.episode = Episode::Paused(PauseState::RollbackRequested {
                    revision: status.revision.clone(),
                });
                next.record(status);
            }
            return (next, effects);
        }
        if !status.is_healthy_and_synced() {
            return (next, effects);
        }
    }

    if status.is_healthy_and_synced() {
        if next.attempts > 0 || next.episode != Episode::Idle {
            effects.push(SideEffect::notify(
                app,
                status.health.as_str(),
                next.attempts,
                MSG_RECOVERED,
                NotifyLevel::Info,
            ));
        }
        next.attempts = 0;
        next.episode = Episode::Idle;
        next.record(status);
        return (next, effects);
    }

    // OutOfSync outranks a failing health status.
    let anomaly = if status.sync == SyncState::OutOfSync {
        Some(status.sync.as_str())
    } else if status.health.is_failing() {
        Some(status.health.as_str())
    } else {
        None
    };

    if let Some(label) = anomaly {
        spend_attempt(policy, app, label, &mut next, &mut effects);
    }

    next.record(status);
    (next, effects)
}

fn spend_attempt(
    policy: &Policy,
    app: &AppName,
    label: &str,
    state: &mut TrackedState,
    effects: &mut Vec<SideEffect>,
) {
    if state.episode == Episode::Idle {
        if state.attempts == 0 {
            effects.push(SideEffect::notify(
                app,
                label,
                state.attempts,
                MSG_ATTEMPTING_RECOVERY,
                NotifyLevel::Alert,
            ));
        }
        state.episode = Episode::Recovering;
    }

    if state.attempts < policy.max_attempts {
        effects.push(SideEffect::RequestSync { app: app.clone() });
        state.attempts += 1;
    } else {
        effects.push(SideEffect::notify(
            app,
            label,
            state.attempts,
            MSG_PAUSED,
            NotifyLevel::Critical,
        ));
        state.episode = Episode::Paused(PauseState::AwaitingRevision);
    }
}

/// Apply the outcome of a rollback trigger.
///
/// Outcomes that do not match a pending rollback are ignored.
pub fn apply_rollback_outcome(
    app: &AppName,
    state: TrackedState,
    outcome: RollbackOutcome,
) -> (TrackedState, Vec<SideEffect>) {
    let mut next = state;
    let revision = match &next.episode {
        Episode::Paused(PauseState::RollbackRequested { revision }) => revision.clone(),
        _ => return (next, Vec::new()),
    };
    let status = next.last_health.as_str();

    let effect = match outcome {
        RollbackOutcome::Acknowledged => {
            next.episode = Episode::Idle;
            SideEffect::notify(
                app,
                status,
                next.attempts,
                format!("rollback initiated for revision {revision}"),
                NotifyLevel::Alert,
            )
        }
        RollbackOutcome::Failed { reason } => {
            next.episode = Episode::Paused(PauseState::RollbackFailed);
            SideEffect::notify(
                app,
                status,
                next.attempts,
                format!(
                    "rollback failed for revision {revision}: {reason}; manual intervention required"
                ),
                NotifyLevel::Critical,
            )
        }
    };
    (next, vec![effect])
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::{Health, Revision, StatusSnapshot};

    fn obs(health: Health, sync: SyncState, rev: &str) -> ApplicationObservation {
        ApplicationObservation::new("payments", StatusSnapshot::new(health, sync, rev))
    }

    #[test]
    fn default_policy_matches_default_config() {
        let config = sentinel_core::Config::resolve(sentinel_core::ConfigOverrides {
            argocd_token: Some("t".into()),
            rollback_mode: Some(sentinel_core::RollbackMode::Disabled),
            ..Default::default()
        })
        .expect("resolve");
        let policy = Policy::default();
        assert_eq!(policy.max_attempts, config.max_attempts);
        assert_eq!(policy.monitor_app, config.monitor_app);
    }

    #[test]
    fn progressing_only_records_observation() {
        let (state, effects) = reconcile(
            &Policy::default(),
            &obs(Health::Progressing, SyncState::Synced, "r1"),
            TrackedState::default(),
        );
        assert!(effects.is_empty());
        assert_eq!(state.last_health, Health::Progressing);
        assert_eq!(state.last_revision, Revision::from("r1"));
        assert_eq!(state.attempts, 0);
    }

    #[test]
    fn out_of_sync_outranks_degraded() {
        let (_, effects) = reconcile(
            &Policy::default(),
            &obs(Health::Degraded, SyncState::OutOfSync, "r1"),
            TrackedState::default(),
        );
        match &effects[0] {
            SideEffect::Notify(n) => assert_eq!(n.status, "OutOfSync"),
            other => panic!("expected notify, got {other:?}"),
        }
    }

    #[test]
    fn paused_hold_does_not_refresh_last_values() {
        let paused = TrackedState {
            last_health: Health::Degraded,
            last_revision: Revision::from("r1"),
            attempts: 3,
            episode: Episode::Paused(PauseState::AwaitingRevision),
            ..Default::default()
        };
        let (state, effects) = reconcile(
            &Policy::default(),
            &obs(Health::Progressing, SyncState::OutOfSync, "r2"),
            paused.clone(),
        );
        assert!(effects.is_empty());
        assert_eq!(state, paused);
    }

    #[test]
    fn unknown_revision_never_triggers_rollback() {
        let paused = TrackedState {
            last_revision: Revision::from("r1"),
            attempts: 3,
            episode: Episode::Paused(PauseState::AwaitingRevision),
            ..Default::default()
        };
        let (state, effects) = reconcile(
            &Policy::default(),
            &obs(Health::Error, SyncState::Synced, Revision::UNKNOWN),
            paused,
        );
        assert!(effects.is_empty());
        assert!(state.is_paused());
    }

    #[test]
    fn stale_rollback_outcome_is_ignored() {
        let state = TrackedState::default();
        let (next, effects) = apply_rollback_outcome(
            &AppName::from("payments"),
            state.clone(),
            RollbackOutcome::Acknowledged,
        );
        assert!(effects.is_empty());
        assert_eq!(next, state);
    }

    #[test]
    fn custom_budget_is_honoured() {
        let policy = Policy {
            max_attempts: 1,
            ..Policy::default()
        };
        let o = obs(Health::Error, SyncState::Synced, "r1");
        let (state, first) = reconcile(&policy, &o, TrackedState::default());
        assert_eq!(first.len(), 2);
        assert_eq!(state.attempts, 1);
        let (state, second) = reconcile(&policy, &o, state);
        assert_eq!(second.len(), 1);
        assert!(state.is_paused());
    }
}
