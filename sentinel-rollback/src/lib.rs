//! # sentinel-rollback
//!
//! Initiates a rollback of the revision that broke a paused application.
//!
//! Three triggers implement [`RollbackTrigger`]:
//! - [`WorkflowDispatchTrigger`] asks a GitHub Actions workflow to do it,
//! - [`GitRevertTrigger`] reverts and pushes from a local checkout,
//! - [`DisabledTrigger`] refuses, leaving the app paused for an operator.

pub mod error;
pub mod git;
pub mod github;

pub use error::RollbackError;
pub use git::GitRevertTrigger;
pub use github::WorkflowDispatchTrigger;

use std::time::Duration;

use sentinel_core::{AppName, Revision, RollbackSettings};

/// Confirmation that a rollback was handed off successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackAck {
    pub app: AppName,
    pub revision: Revision,
    pub detail: String,
}

pub trait RollbackTrigger {
    fn request_rollback(
        &self,
        app: &AppName,
        revision: &Revision,
    ) -> Result<RollbackAck, RollbackError>;
}

impl<T: RollbackTrigger + ?Sized> RollbackTrigger for Box<T> {
    fn request_rollback(
        &self,
        app: &AppName,
        revision: &Revision,
    ) -> Result<RollbackAck, RollbackError> {
        (**self).request_rollback(app, revision)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledTrigger;

impl RollbackTrigger for DisabledTrigger {
    fn request_rollback(
        &self,
        app: &AppName,
        revision: &Revision,
    ) -> Result<RollbackAck, RollbackError> {
        tracing::warn!(app = %app, revision = %revision, "rollback requested but disabled");
        Err(RollbackError::Disabled)
    }
}

/// Build the trigger selected by the configuration.
pub fn from_settings(
    settings: &RollbackSettings,
    timeout: Duration,
) -> Box<dyn RollbackTrigger + Send> {
    match settings {
        RollbackSettings::WorkflowDispatch {
            github_token,
            repository,
            workflow,
            branch,
        } => Box::new(WorkflowDispatchTrigger::new(
            github_token.clone(),
            repository.clone(),
            workflow.clone(),
            branch.clone(),
            timeout,
        )),
        RollbackSettings::GitRevert { checkout, branch } => {
            Box::new(GitRevertTrigger::new(checkout.clone(), branch.clone()))
        }
        RollbackSettings::Disabled => Box::new(DisabledTrigger),
    }
}

/// The sentinel `unknown` revision and anything that git could read as an
/// option are never rolled back.
pub(crate) fn validate_revision(revision: &Revision) -> Result<(), RollbackError> {
    let raw = revision.as_str().trim();
    if revision.is_unknown() || raw.is_empty() || raw.starts_with('-') {
        return Err(RollbackError::InvalidRevision(revision.as_str().to_string()));
    }
    Ok(())
}
