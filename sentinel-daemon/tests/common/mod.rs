//! Scripted collaborators shared by the scheduler and run-loop tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sentinel_core::{
    AppName, ApplicationObservation, Health, Notification, Revision, StatusSnapshot, SyncState,
};
use sentinel_daemon::Scheduler;
use sentinel_gateway::{DeploymentGateway, GatewayError};
use sentinel_notify::{Notifier, NotifyError};
use sentinel_reconciler::Policy;
use sentinel_rollback::{RollbackAck, RollbackError, RollbackTrigger};

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ControllerState {
    /// Listing order and the status `application_status` returns.
    pub apps: Vec<(AppName, StatusSnapshot)>,
    pub calls: Vec<String>,
    pub fail_listing: bool,
    pub fail_status_for: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeController(pub Arc<Mutex<ControllerState>>);

impl FakeController {
    pub fn with_apps(apps: &[(&str, StatusSnapshot)]) -> Self {
        let controller = Self::default();
        controller.0.lock().unwrap().apps = apps
            .iter()
            .map(|(name, status)| (AppName::from(*name), status.clone()))
            .collect();
        controller
    }

    pub fn set_status(&self, app: &str, status: StatusSnapshot) {
        let mut state = self.0.lock().unwrap();
        if let Some(entry) = state.apps.iter_mut().find(|(name, _)| name.as_str() == app) {
            entry.1 = status;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().calls.clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn clear_calls(&self) {
        self.0.lock().unwrap().calls.clear();
    }
}

fn transport(operation: &str) -> GatewayError {
    GatewayError::Transport {
        operation: operation.to_string(),
        message: "connection refused".to_string(),
    }
}

impl DeploymentGateway for FakeController {
    fn list_applications(&self) -> Result<Vec<ApplicationObservation>, GatewayError> {
        let mut state = self.0.lock().unwrap();
        state.calls.push("list".into());
        if state.fail_listing {
            return Err(transport("list applications"));
        }
        // The listing snapshot is deliberately stale; the scheduler must
        // re-read each application.
        Ok(state
            .apps
            .iter()
            .map(|(name, _)| {
                ApplicationObservation::new(
                    name.clone(),
                    StatusSnapshot::new(Health::Unknown, SyncState::Unknown, Revision::unknown()),
                )
            })
            .collect())
    }

    fn refresh_application(&self, app: &AppName) -> Result<(), GatewayError> {
        self.0.lock().unwrap().calls.push(format!("refresh:{app}"));
        Ok(())
    }

    fn request_sync(&self, app: &AppName) -> Result<(), GatewayError> {
        self.0.lock().unwrap().calls.push(format!("sync:{app}"));
        Ok(())
    }

    fn application_status(&self, app: &AppName) -> Result<StatusSnapshot, GatewayError> {
        let mut state = self.0.lock().unwrap();
        state.calls.push(format!("status:{app}"));
        if state.fail_status_for.as_deref() == Some(app.as_str()) {
            return Err(transport("status"));
        }
        Ok(state
            .apps
            .iter()
            .find(|(name, _)| name == app)
            .map(|(_, status)| status.clone())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<Notification>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(NotifyError::Transport("webhook down".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rollback trigger
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct ScriptedTrigger {
    pub requests: Arc<Mutex<Vec<(AppName, Revision)>>>,
    pub fail: bool,
}

impl ScriptedTrigger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<(AppName, Revision)> {
        self.requests.lock().unwrap().clone()
    }
}

impl RollbackTrigger for ScriptedTrigger {
    fn request_rollback(
        &self,
        app: &AppName,
        revision: &Revision,
    ) -> Result<RollbackAck, RollbackError> {
        self.requests
            .lock()
            .unwrap()
            .push((app.clone(), revision.clone()));
        if self.fail {
            return Err(RollbackError::Disabled);
        }
        Ok(RollbackAck {
            app: app.clone(),
            revision: revision.clone(),
            detail: "scripted".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub type TestScheduler = Scheduler<FakeController, RecordingNotifier, ScriptedTrigger>;

pub fn scheduler(
    controller: &FakeController,
    notifier: &RecordingNotifier,
    trigger: &ScriptedTrigger,
) -> TestScheduler {
    scheduler_with_retry_delay(controller, notifier, trigger, Duration::ZERO)
}

pub fn scheduler_with_retry_delay(
    controller: &FakeController,
    notifier: &RecordingNotifier,
    trigger: &ScriptedTrigger,
    retry_delay: Duration,
) -> TestScheduler {
    Scheduler::new(
        controller.clone(),
        notifier.clone(),
        trigger.clone(),
        Policy::default(),
        retry_delay,
    )
}

pub fn status(health: Health, sync: SyncState, revision: &str) -> StatusSnapshot {
    StatusSnapshot::new(health, sync, revision)
}
