//! Error types for sentinel-rollback.

use std::path::PathBuf;

use thiserror::Error;

/// A rollback could not be initiated. The reconciler keeps the application
/// paused and asks for manual intervention.
#[derive(Debug, Error)]
pub enum RollbackError {
    #[error("rollback is disabled")]
    Disabled,

    #[error("refusing to roll back revision '{0}'")]
    InvalidRevision(String),

    #[error("workflow dispatch rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("workflow dispatch transport error: {0}")]
    Transport(String),

    #[error("I/O error running {command} in {dir}: {source}")]
    Io {
        command: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },
}

impl From<ureq::Error> for RollbackError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => RollbackError::Rejected {
                status,
                body: response
                    .into_string()
                    .unwrap_or_default()
                    .chars()
                    .take(512)
                    .collect(),
            },
            ureq::Error::Transport(transport) => RollbackError::Transport(transport.to_string()),
        }
    }
}
