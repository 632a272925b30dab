//! # sentinel-notify
//!
//! Delivery of operator notifications. The daemon posts to Slack when a
//! webhook is configured and otherwise writes each notification to the log.

pub mod error;
pub mod message;
pub mod slack;

pub use error::NotifyError;
pub use message::SlackMessage;
pub use slack::SlackNotifier;

use sentinel_core::{Notification, NotifyLevel};

/// Sink for operator notifications. Failures are reported, never retried.
pub trait Notifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).notify(notification)
    }
}

/// Writes notifications to the tracing log. Used when no webhook is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let line = message::summary(notification);
        match notification.level {
            NotifyLevel::Info => tracing::info!(app = %notification.app, "{line}"),
            NotifyLevel::Alert => tracing::warn!(app = %notification.app, "{line}"),
            NotifyLevel::Critical => tracing::error!(app = %notification.app, "{line}"),
        }
        Ok(())
    }
}

/// Picks the Slack notifier when a webhook URL is configured.
pub fn from_webhook(
    webhook_url: Option<&str>,
    timeout: std::time::Duration,
) -> Box<dyn Notifier + Send> {
    match webhook_url {
        Some(url) => Box::new(SlackNotifier::new(url, timeout)),
        None => {
            tracing::info!("no slack webhook configured; notifications go to the log");
            Box::new(LogNotifier)
        }
    }
}
