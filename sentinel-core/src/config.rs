//! Daemon configuration.
//!
//! # Sources
//!
//! Layers are merged lowest to highest precedence:
//!
//! 1. built-in defaults
//! 2. an optional YAML file (every key optional)
//! 3. environment variables / command-line flags
//!
//! Every layer is a [`ConfigOverrides`]; [`Config::resolve`] validates the
//! merged result. Secrets never appear in `Debug` output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::AppName;

pub const DEFAULT_ARGOCD_API: &str = "https://argocd-server.argocd.svc.cluster.local/api/v1";
pub const DEFAULT_GIT_REPO_URL: &str =
    "https://github.com/JaimeHenaoChallange/monitor-argocd-cronjob-1.git";
pub const DEFAULT_GIT_BRANCH: &str = "main";
pub const DEFAULT_ROLLBACK_WORKFLOW: &str = "rollback.yml";
pub const DEFAULT_MONITOR_APP: &str = "argocd-monitor";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_ERROR_BACKOFF_SECS: u64 = 30;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 10;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const REDACTED: &str = "***";

// ---------------------------------------------------------------------------
// Rollback mode
// ---------------------------------------------------------------------------

/// How a rollback is triggered once a paused application regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum RollbackMode {
    #[default]
    WorkflowDispatch,
    GitRevert,
    Disabled,
}

impl FromStr for RollbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "workflow-dispatch" => Ok(Self::WorkflowDispatch),
            "git-revert" => Ok(Self::GitRevert),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(format!(
                "unknown rollback mode '{other}'; expected: workflow-dispatch, git-revert, disabled"
            )),
        }
    }
}

impl TryFrom<String> for RollbackMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RollbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollbackMode::WorkflowDispatch => write!(f, "workflow-dispatch"),
            RollbackMode::GitRevert => write!(f, "git-revert"),
            RollbackMode::Disabled => write!(f, "disabled"),
        }
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// One configuration layer. All keys are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub argocd_api: Option<String>,
    pub argocd_token: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub github_token: Option<String>,
    pub git_repo_url: Option<String>,
    pub git_branch: Option<String>,
    pub git_checkout: Option<PathBuf>,
    pub rollback_mode: Option<RollbackMode>,
    pub rollback_workflow: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub error_backoff_secs: Option<u64>,
    pub retry_delay_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub monitor_app: Option<String>,
}

impl ConfigOverrides {
    /// Load a YAML layer. Returns the parse error with the file path attached.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `higher` on top of `self`; set keys in `higher` win.
    pub fn merge(self, higher: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            argocd_api: higher.argocd_api.or(self.argocd_api),
            argocd_token: higher.argocd_token.or(self.argocd_token),
            slack_webhook_url: higher.slack_webhook_url.or(self.slack_webhook_url),
            github_token: higher.github_token.or(self.github_token),
            git_repo_url: higher.git_repo_url.or(self.git_repo_url),
            git_branch: higher.git_branch.or(self.git_branch),
            git_checkout: higher.git_checkout.or(self.git_checkout),
            rollback_mode: higher.rollback_mode.or(self.rollback_mode),
            rollback_workflow: higher.rollback_workflow.or(self.rollback_workflow),
            request_timeout_secs: higher.request_timeout_secs.or(self.request_timeout_secs),
            poll_interval_secs: higher.poll_interval_secs.or(self.poll_interval_secs),
            error_backoff_secs: higher.error_backoff_secs.or(self.error_backoff_secs),
            retry_delay_secs: higher.retry_delay_secs.or(self.retry_delay_secs),
            max_attempts: higher.max_attempts.or(self.max_attempts),
            monitor_app: higher.monitor_app.or(self.monitor_app),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// `owner/repo` pair derived from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub repo: String,
}

impl RepoCoordinates {
    /// Parse `https://host/owner/repo(.git)` or `git@host:owner/repo(.git)`.
    pub fn from_url(url: &str) -> Option<Self> {
        let path = if let Some(rest) = url.strip_prefix("git@") {
            rest.split_once(':')?.1
        } else {
            let rest = url
                .strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"))?;
            rest.split_once('/')?.1
        };
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, repo) = path.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

impl fmt::Display for RepoCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Rollback trigger settings, validated for the selected mode.
#[derive(Clone, PartialEq, Eq)]
pub enum RollbackSettings {
    WorkflowDispatch {
        github_token: String,
        repository: RepoCoordinates,
        workflow: String,
        branch: String,
    },
    GitRevert {
        checkout: PathBuf,
        branch: String,
    },
    Disabled,
}

impl RollbackSettings {
    pub fn mode(&self) -> RollbackMode {
        match self {
            RollbackSettings::WorkflowDispatch { .. } => RollbackMode::WorkflowDispatch,
            RollbackSettings::GitRevert { .. } => RollbackMode::GitRevert,
            RollbackSettings::Disabled => RollbackMode::Disabled,
        }
    }
}

impl fmt::Debug for RollbackSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollbackSettings::WorkflowDispatch {
                repository,
                workflow,
                branch,
                ..
            } => f
                .debug_struct("WorkflowDispatch")
                .field("github_token", &REDACTED)
                .field("repository", &repository.to_string())
                .field("workflow", workflow)
                .field("branch", branch)
                .finish(),
            RollbackSettings::GitRevert { checkout, branch } => f
                .debug_struct("GitRevert")
                .field("checkout", checkout)
                .field("branch", branch)
                .finish(),
            RollbackSettings::Disabled => f.write_str("Disabled"),
        }
    }
}

/// Fully resolved and validated configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub argocd_api: String,
    pub argocd_token: String,
    pub slack_webhook_url: Option<String>,
    pub rollback: RollbackSettings,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub retry_delay: Duration,
    pub max_attempts: u32,
    pub monitor_app: AppName,
}

impl Config {
    /// Merge an optional YAML file under `overrides` and validate.
    pub fn load(file: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let base = match file {
            Some(path) => ConfigOverrides::from_yaml_file(path)?,
            None => ConfigOverrides::default(),
        };
        Self::resolve(base.merge(overrides))
    }

    /// Apply defaults to a merged layer and validate it.
    pub fn resolve(layer: ConfigOverrides) -> Result<Self, ConfigError> {
        let argocd_api = layer
            .argocd_api
            .unwrap_or_else(|| DEFAULT_ARGOCD_API.to_string());
        require_http_url("argocd_api", &argocd_api)?;
        let argocd_api = argocd_api.trim_end_matches('/').to_string();

        let argocd_token = require_present("argocd_token", "ARGOCD_TOKEN", layer.argocd_token)?;

        let slack_webhook_url = layer.slack_webhook_url.filter(|url| !url.trim().is_empty());
        if let Some(url) = &slack_webhook_url {
            require_http_url("slack_webhook_url", url)?;
        }

        let branch = layer
            .git_branch
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GIT_BRANCH.to_string());

        let rollback = match layer.rollback_mode.unwrap_or_default() {
            RollbackMode::WorkflowDispatch => {
                let github_token =
                    require_present("github_token", "GITHUB_TOKEN", layer.github_token)?;
                let repo_url = layer
                    .git_repo_url
                    .unwrap_or_else(|| DEFAULT_GIT_REPO_URL.to_string());
                let repository =
                    RepoCoordinates::from_url(&repo_url).ok_or_else(|| ConfigError::Invalid {
                        key: "git_repo_url",
                        reason: format!("cannot derive owner/repo from '{repo_url}'"),
                    })?;
                RollbackSettings::WorkflowDispatch {
                    github_token,
                    repository,
                    workflow: layer
                        .rollback_workflow
                        .filter(|w| !w.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_ROLLBACK_WORKFLOW.to_string()),
                    branch,
                }
            }
            RollbackMode::GitRevert => {
                let checkout = layer.git_checkout.ok_or(ConfigError::Missing {
                    key: "git_checkout",
                    env: "GIT_CHECKOUT",
                })?;
                RollbackSettings::GitRevert { checkout, branch }
            }
            RollbackMode::Disabled => RollbackSettings::Disabled,
        };

        let request_timeout_secs = layer
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }

        let max_attempts = layer.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }

        let monitor_app = layer
            .monitor_app
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MONITOR_APP.to_string());

        Ok(Config {
            argocd_api,
            argocd_token,
            slack_webhook_url,
            rollback,
            request_timeout: Duration::from_secs(request_timeout_secs),
            poll_interval: Duration::from_secs(
                layer.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
            error_backoff: Duration::from_secs(
                layer.error_backoff_secs.unwrap_or(DEFAULT_ERROR_BACKOFF_SECS),
            ),
            retry_delay: Duration::from_secs(
                layer.retry_delay_secs.unwrap_or(DEFAULT_RETRY_DELAY_SECS),
            ),
            max_attempts,
            monitor_app: AppName::from(monitor_app),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("argocd_api", &self.argocd_api)
            .field("argocd_token", &REDACTED)
            .field(
                "slack_webhook_url",
                &self.slack_webhook_url.as_ref().map(|_| REDACTED),
            )
            .field("rollback", &self.rollback)
            .field("request_timeout", &self.request_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("error_backoff", &self.error_backoff)
            .field("retry_delay", &self.retry_delay)
            .field("max_attempts", &self.max_attempts)
            .field("monitor_app", &self.monitor_app.0)
            .finish()
    }
}

fn require_present(
    key: &'static str,
    env: &'static str,
    value: Option<String>,
) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing { key, env }),
    }
}

fn require_http_url(key: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("'{url}' is not an http(s) URL"),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
