//! One reconciliation cycle: poll, reconcile, execute.

use std::collections::VecDeque;
use std::time::Duration;

use sentinel_core::{AppName, ApplicationObservation, Config};
use sentinel_gateway::{ArgoCdGateway, DeploymentGateway, GatewayError};
use sentinel_notify::Notifier;
use sentinel_reconciler::{Policy, Reconciler, RollbackOutcome, SideEffect};
use sentinel_rollback::RollbackTrigger;

use crate::error::DaemonError;
use crate::report::{AppReport, CycleReport};

/// Scheduler wired to the real controller, webhook and rollback mechanism.
pub type LiveScheduler = Scheduler<
    Box<dyn DeploymentGateway + Send>,
    Box<dyn Notifier + Send>,
    Box<dyn RollbackTrigger + Send>,
>;

/// Drives the [`Reconciler`] with fresh observations and carries out the
/// side effects it asks for.
///
/// A cycle is blocking; the run loop moves the scheduler onto a blocking
/// thread for each one.
pub struct Scheduler<G, N, R> {
    gateway: G,
    notifier: N,
    trigger: R,
    reconciler: Reconciler,
    retry_delay: Duration,
}

impl LiveScheduler {
    pub fn from_config(config: &Config) -> Self {
        let gateway: Box<dyn DeploymentGateway + Send> = Box::new(ArgoCdGateway::new(
            config.argocd_api.clone(),
            config.argocd_token.clone(),
            config.request_timeout,
        ));
        let notifier = sentinel_notify::from_webhook(
            config.slack_webhook_url.as_deref(),
            config.request_timeout,
        );
        let trigger = sentinel_rollback::from_settings(&config.rollback, config.request_timeout);
        let policy = Policy {
            max_attempts: config.max_attempts,
            monitor_app: config.monitor_app.clone(),
        };
        Scheduler::new(gateway, notifier, trigger, policy, config.retry_delay)
    }
}

impl<G, N, R> Scheduler<G, N, R>
where
    G: DeploymentGateway,
    N: Notifier,
    R: RollbackTrigger,
{
    pub fn new(gateway: G, notifier: N, trigger: R, policy: Policy, retry_delay: Duration) -> Self {
        Self {
            gateway,
            notifier,
            trigger,
            reconciler: Reconciler::new(policy),
            retry_delay,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Poll every application once, in listing order.
    ///
    /// The first controller error abandons the rest of the cycle; state
    /// already committed for earlier applications is kept.
    pub fn run_cycle(&mut self) -> Result<CycleReport, DaemonError> {
        let listed = self.gateway.list_applications()?;
        if listed.is_empty() {
            tracing::warn!("no applications returned by the controller");
            return Err(DaemonError::EmptyListing);
        }

        let mut report = CycleReport::default();
        for entry in listed {
            let name = entry.name;
            if self.reconciler.is_excluded(&name) {
                tracing::debug!(app = %name, "skipping monitor application");
                report.skipped.push(name);
                continue;
            }
            report.apps.push(self.reconcile_app(name)?);
        }
        Ok(report)
    }

    fn reconcile_app(&mut self, name: AppName) -> Result<AppReport, DaemonError> {
        self.gateway.refresh_application(&name)?;
        let status = self.gateway.application_status(&name)?;
        tracing::info!(
            app = %name,
            health = %status.health,
            sync = %status.sync,
            revision = %status.revision,
            "observed application",
        );

        let observation = ApplicationObservation::new(name.clone(), status);
        let effects = self.reconciler.observe(&observation);
        let actions = self.execute(effects)?;

        let state = self.reconciler.state(&name).cloned().unwrap_or_default();
        Ok(AppReport {
            name,
            health: observation.status.health,
            sync: observation.status.sync,
            revision: observation.status.revision,
            phase: state.phase(),
            attempts: state.attempts,
            paused: state.is_paused(),
            actions,
        })
    }

    /// Execute effects in emission order. Effects produced by a rollback
    /// outcome run right after the rollback itself.
    fn execute(&mut self, effects: Vec<SideEffect>) -> Result<Vec<String>, GatewayError> {
        let mut queue: VecDeque<SideEffect> = effects.into();
        let mut executed = Vec::new();

        while let Some(effect) = queue.pop_front() {
            executed.push(effect.label());
            match effect {
                SideEffect::RequestSync { app } => {
                    tracing::info!(app = %app, "requesting sync");
                    self.gateway.request_sync(&app)?;
                    if !self.retry_delay.is_zero() {
                        std::thread::sleep(self.retry_delay);
                    }
                }
                SideEffect::RequestRollback { app, revision } => {
                    let outcome = match self.trigger.request_rollback(&app, &revision) {
                        Ok(ack) => {
                            tracing::info!(
                                app = %app,
                                revision = %revision,
                                detail = %ack.detail,
                                "rollback initiated"
                            );
                            RollbackOutcome::Acknowledged
                        }
                        Err(err) => {
                            tracing::error!(
                                app = %app,
                                revision = %revision,
                                error = %err,
                                "rollback failed"
                            );
                            RollbackOutcome::Failed {
                                reason: err.to_string(),
                            }
                        }
                    };
                    let follow_ups = self.reconciler.record_rollback(&app, outcome);
                    for follow_up in follow_ups.into_iter().rev() {
                        queue.push_front(follow_up);
                    }
                }
                SideEffect::Notify(notification) => {
                    if let Err(err) = self.notifier.notify(&notification) {
                        tracing::warn!(
                            app = %notification.app,
                            error = %err,
                            "notification not delivered"
                        );
                    }
                }
            }
        }
        Ok(executed)
    }
}
