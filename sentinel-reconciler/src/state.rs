//! Tracked per-application state.
//!
//! The notification bookkeeping is an explicit [`Episode`] rather than a set
//! of independent flags, so combinations such as "paused but recovery already
//! announced" cannot be represented.

use std::fmt;

use sentinel_core::{Health, Revision, StatusSnapshot, SyncState};

/// Where an application is inside its current anomaly episode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Episode {
    /// No open episode. Either never anomalous or confirmed recovered.
    #[default]
    Idle,
    /// Anomaly detected and the first-attempt notification was sent.
    Recovering,
    /// Retry budget exhausted and the pause notification was sent.
    Paused(PauseState),
}

/// Sub-state of a paused application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseState {
    /// Waiting for a failing observation on a new revision.
    AwaitingRevision,
    /// A rollback intent was emitted and its outcome is pending.
    RollbackRequested { revision: Revision },
    /// The rollback trigger failed. Only manual recovery ends the pause.
    RollbackFailed,
}

/// Coarse state-machine position, for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Healthy,
    Recovering { attempts: u32 },
    Paused,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Healthy => write!(f, "healthy"),
            Phase::Recovering { attempts } => write!(f, "recovering ({attempts})"),
            Phase::Paused => write!(f, "paused"),
        }
    }
}

/// Everything the reconciler remembers about one application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackedState {
    pub last_health: Health,
    pub last_sync: SyncState,
    /// Compared against new observations while paused to detect a new rollout.
    pub last_revision: Revision,
    /// Shared budget for sync and health remediation.
    pub attempts: u32,
    pub episode: Episode,
}

impl TrackedState {
    pub fn is_paused(&self) -> bool {
        matches!(self.episode, Episode::Paused(_))
    }

    /// Follows the episode. An idle app is healthy even while `attempts` is
    /// still spent after an acknowledged rollback.
    pub fn phase(&self) -> Phase {
        match self.episode {
            Episode::Paused(_) => Phase::Paused,
            Episode::Recovering => Phase::Recovering {
                attempts: self.attempts,
            },
            Episode::Idle => Phase::Healthy,
        }
    }

    /// Refresh the last-observed triplet.
    pub(crate) fn record(&mut self, status: &StatusSnapshot) {
        self.last_health = status.health;
        self.last_sync = status.sync;
        self.last_revision = status.revision.clone();
    }
}
