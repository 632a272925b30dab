//! Side-effect intents emitted by the reconciler.
//!
//! The reconciler never talks to the controller, the webhook or the rollback
//! mechanism itself. It returns these values and the scheduler executes them
//! in order.

use sentinel_core::{AppName, Notification, NotifyLevel, Revision};

pub const MSG_ATTEMPTING_RECOVERY: &str = "attempting recovery";
pub const MSG_PAUSED: &str = "paused after exhausted attempts";
pub const MSG_RECOVERED: &str = "recovered";

/// One action the scheduler must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    RequestSync { app: AppName },
    RequestRollback { app: AppName, revision: Revision },
    Notify(Notification),
}

impl SideEffect {
    /// Short label used in logs and cycle reports.
    pub fn label(&self) -> String {
        match self {
            SideEffect::RequestSync { .. } => "sync".to_string(),
            SideEffect::RequestRollback { revision, .. } => format!("rollback@{revision}"),
            SideEffect::Notify(n) => format!("notify:{}", n.level),
        }
    }

    pub(crate) fn notify(
        app: &AppName,
        status: impl Into<String>,
        attempts: u32,
        message: impl Into<String>,
        level: NotifyLevel,
    ) -> Self {
        SideEffect::Notify(Notification {
            app: app.clone(),
            status: status.into(),
            attempts,
            message: message.into(),
            level,
        })
    }
}

/// Result of executing a [`SideEffect::RequestRollback`], fed back to the
/// reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    Acknowledged,
    Failed { reason: String },
}
