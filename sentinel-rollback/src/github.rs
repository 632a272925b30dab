//! GitHub Actions `workflow_dispatch` trigger.

use std::time::Duration;

use serde_json::json;

use sentinel_core::{AppName, RepoCoordinates, Revision};

use crate::error::RollbackError;
use crate::{validate_revision, RollbackAck, RollbackTrigger};

pub const GITHUB_API: &str = "https://api.github.com";

/// Dispatches the rollback workflow with the application and revision as
/// inputs. The workflow itself performs the revert.
pub struct WorkflowDispatchTrigger {
    agent: ureq::Agent,
    api_base: String,
    token: String,
    repository: RepoCoordinates,
    workflow: String,
    branch: String,
}

impl WorkflowDispatchTrigger {
    pub fn new(
        token: impl Into<String>,
        repository: RepoCoordinates,
        workflow: impl Into<String>,
        branch: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            api_base: GITHUB_API.to_string(),
            token: token.into(),
            repository,
            workflow: workflow.into(),
            branch: branch.into(),
        }
    }

    /// Point at a different API root (GitHub Enterprise, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/actions/workflows/{}/dispatches",
            self.api_base, self.repository.owner, self.repository.repo, self.workflow
        )
    }
}

impl RollbackTrigger for WorkflowDispatchTrigger {
    fn request_rollback(
        &self,
        app: &AppName,
        revision: &Revision,
    ) -> Result<RollbackAck, RollbackError> {
        validate_revision(revision)?;
        let url = self.dispatch_url();
        tracing::debug!(%url, app = %app, revision = %revision, "dispatching rollback workflow");

        self.agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", "sentinel")
            .send_json(json!({
                "ref": self.branch,
                "inputs": {
                    "application": app.as_str(),
                    "revision": revision.as_str(),
                },
            }))?;

        Ok(RollbackAck {
            app: app.clone(),
            revision: revision.clone(),
            detail: format!("workflow {} dispatched on {}", self.workflow, self.repository),
        })
    }
}
