//! Error types for sentinel-gateway.

use thiserror::Error;

/// Any failure talking to the deployment controller.
///
/// Callers treat every variant the same way: the current cycle is abandoned
/// and retried after a backoff.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The controller answered with a non-2xx status.
    #[error("{operation} failed with HTTP {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    /// Connection, TLS, DNS or timeout failure.
    #[error("{operation} transport error: {message}")]
    Transport { operation: String, message: String },

    /// The response body was not the JSON we expected.
    #[error("{operation} returned an unreadable payload: {source}")]
    Decode {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl GatewayError {
    pub(crate) fn from_ureq(operation: impl Into<String>, err: ureq::Error) -> Self {
        let operation = operation.into();
        match err {
            ureq::Error::Status(status, response) => GatewayError::Status {
                operation,
                status,
                body: response
                    .into_string()
                    .unwrap_or_default()
                    .chars()
                    .take(512)
                    .collect(),
            },
            ureq::Error::Transport(transport) => GatewayError::Transport {
                operation,
                message: transport.to_string(),
            },
        }
    }

    /// HTTP status, when the controller answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
