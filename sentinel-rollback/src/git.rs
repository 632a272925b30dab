//! Local `git revert` trigger.

use std::path::{Path, PathBuf};
use std::process::Command;

use sentinel_core::{AppName, Revision};

use crate::error::RollbackError;
use crate::{validate_revision, RollbackAck, RollbackTrigger};

const REMOTE: &str = "origin";

/// Reverts the offending commit in a local checkout of the GitOps repository
/// and pushes the result, letting the controller roll the app back.
pub struct GitRevertTrigger {
    checkout: PathBuf,
    branch: String,
}

impl GitRevertTrigger {
    pub fn new(checkout: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        Self {
            checkout: checkout.into(),
            branch: branch.into(),
        }
    }
}

impl RollbackTrigger for GitRevertTrigger {
    fn request_rollback(
        &self,
        app: &AppName,
        revision: &Revision,
    ) -> Result<RollbackAck, RollbackError> {
        validate_revision(revision)?;
        let remote_branch = format!("{REMOTE}/{}", self.branch);

        run_git(&self.checkout, &["fetch", REMOTE, &self.branch])?;
        run_git(&self.checkout, &["checkout", &self.branch])?;
        run_git(&self.checkout, &["reset", "--hard", &remote_branch])?;
        run_git(&self.checkout, &["revert", "--no-edit", revision.as_str()])?;
        run_git(&self.checkout, &["push", REMOTE, &self.branch])?;

        tracing::info!(app = %app, revision = %revision, branch = %self.branch, "revert pushed");
        Ok(RollbackAck {
            app: app.clone(),
            revision: revision.clone(),
            detail: format!("reverted {revision} on {}", self.branch),
        })
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Result<String, RollbackError> {
    let command = format!("git {}", args.join(" "));
    tracing::debug!(%command, dir = %dir.display(), "running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| RollbackError::Io {
            command: command.clone(),
            dir: dir.to_path_buf(),
            source,
        })?;

    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    // A half-applied revert would block every later attempt.
    if args.first() == Some(&"revert") {
        let _ = Command::new("git")
            .args(["revert", "--abort"])
            .current_dir(dir)
            .output();
    }
    Err(RollbackError::Command {
        command,
        status: output.status.to_string(),
        stderr,
    })
}
