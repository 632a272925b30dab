//! Blocking Argo CD REST client.

use std::time::Duration;

use serde_json::json;

use sentinel_core::{AppName, ApplicationObservation, StatusSnapshot};

use crate::error::GatewayError;
use crate::payload::{Application, ApplicationList};
use crate::DeploymentGateway;

/// [`DeploymentGateway`] backed by the Argo CD API server.
///
/// Every request carries the bearer token and is bounded by the agent-wide
/// timeout given at construction.
pub struct ArgoCdGateway {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl ArgoCdGateway {
    /// `base_url` is the API root, e.g. `https://argocd.example/api/v1`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn get_application(
        &self,
        operation: &str,
        app: &AppName,
        refresh: bool,
    ) -> Result<Application, GatewayError> {
        let url = self.url(&format!("applications/{app}"));
        let mut request = self.agent.get(&url).set("Authorization", &self.bearer());
        if refresh {
            request = request.query("refresh", "normal");
        }
        tracing::debug!(%url, refresh, "argocd request");
        let response = request
            .call()
            .map_err(|e| GatewayError::from_ureq(operation, e))?;
        response
            .into_json::<Application>()
            .map_err(|source| GatewayError::Decode {
                operation: operation.to_string(),
                source,
            })
    }
}

impl DeploymentGateway for ArgoCdGateway {
    fn list_applications(&self) -> Result<Vec<ApplicationObservation>, GatewayError> {
        let operation = "list applications";
        let url = self.url("applications");
        tracing::debug!(%url, "argocd request");
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &self.bearer())
            .call()
            .map_err(|e| GatewayError::from_ureq(operation, e))?;
        let list: ApplicationList = response.into_json().map_err(|source| GatewayError::Decode {
            operation: operation.to_string(),
            source,
        })?;

        let mut observations = Vec::new();
        for app in list.items.unwrap_or_default() {
            match app.observation() {
                Some(obs) => observations.push(obs),
                None => tracing::warn!("skipping application without metadata.name"),
            }
        }
        Ok(observations)
    }

    fn refresh_application(&self, app: &AppName) -> Result<(), GatewayError> {
        self.get_application(&format!("refresh {app}"), app, true)
            .map(|_| ())
    }

    fn request_sync(&self, app: &AppName) -> Result<(), GatewayError> {
        let operation = format!("sync {app}");
        let url = self.url(&format!("applications/{app}/sync"));
        tracing::debug!(%url, "argocd request");
        self.agent
            .post(&url)
            .set("Authorization", &self.bearer())
            .send_json(json!({}))
            .map_err(|e| GatewayError::from_ureq(operation, e))?;
        Ok(())
    }

    fn application_status(&self, app: &AppName) -> Result<StatusSnapshot, GatewayError> {
        let application = self.get_application(&format!("status {app}"), app, false)?;
        Ok(application.snapshot())
    }
}
