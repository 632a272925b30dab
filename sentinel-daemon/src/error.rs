use thiserror::Error;

use sentinel_core::ConfigError;
use sentinel_gateway::GatewayError;

/// Error surface for the scheduler and its run loop.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("controller error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("controller listed no applications")]
    EmptyListing,

    #[error("failed to start tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("{task} task join failure: {message}")]
    Join { task: &'static str, message: String },

    #[error("ctrl-c handler failed: {0}")]
    Signal(#[source] std::io::Error),
}
