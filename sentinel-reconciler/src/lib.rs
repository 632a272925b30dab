//! # sentinel-reconciler
//!
//! The per-application reconciliation state machine.
//!
//! [`reconcile`] maps one observation and the application's tracked state to
//! the next state plus a list of [`SideEffect`] intents (sync, rollback,
//! notify). [`Reconciler`] owns the name → state map and is the only thing
//! that mutates it.
//!
//! ```rust
//! use sentinel_core::{ApplicationObservation, Health, StatusSnapshot, SyncState};
//! use sentinel_reconciler::{Reconciler, SideEffect};
//!
//! let mut reconciler = Reconciler::default();
//! let drifted = ApplicationObservation::new(
//!     "payments",
//!     StatusSnapshot::new(Health::Healthy, SyncState::OutOfSync, "4f2c1e"),
//! );
//! let effects = reconciler.observe(&drifted);
//! assert!(matches!(effects.last(), Some(SideEffect::RequestSync { .. })));
//! ```

pub mod effect;
pub mod machine;
pub mod reconciler;
pub mod state;

pub use effect::{
    RollbackOutcome, SideEffect, MSG_ATTEMPTING_RECOVERY, MSG_PAUSED, MSG_RECOVERED,
};
pub use machine::{apply_rollback_outcome, reconcile, Policy};
pub use reconciler::Reconciler;
pub use state::{Episode, PauseState, Phase, TrackedState};
