//! Error types for sentinel-notify.

use thiserror::Error;

/// A notification could not be delivered.
///
/// Delivery is best effort: the daemon logs these and carries on.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook rejected notification with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("webhook unreachable: {0}")]
    Transport(String),

    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<ureq::Error> for NotifyError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => NotifyError::Rejected {
                status,
                body: response
                    .into_string()
                    .unwrap_or_default()
                    .chars()
                    .take(256)
                    .collect(),
            },
            ureq::Error::Transport(transport) => NotifyError::Transport(transport.to_string()),
        }
    }
}
