//! Slack incoming-webhook notifier.

use std::time::Duration;

use sentinel_core::Notification;

use crate::error::NotifyError;
use crate::message::SlackMessage;
use crate::Notifier;

pub struct SlackNotifier {
    agent: ureq::Agent,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            webhook_url: webhook_url.into(),
        }
    }
}

impl Notifier for SlackNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message =
            SlackMessage::from_notification(notification, chrono::Utc::now().timestamp());
        let body = serde_json::to_value(&message)?;
        tracing::debug!(
            app = %notification.app,
            level = %notification.level,
            "posting slack notification"
        );
        self.agent.post(&self.webhook_url).send_json(body)?;
        Ok(())
    }
}
