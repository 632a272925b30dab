//! Slack attachment formatting.

use serde::Serialize;

use sentinel_core::{Notification, NotifyLevel};

pub const COLOR_INFO: &str = "#36a64f";
pub const COLOR_ALERT: &str = "#ff9900";
pub const COLOR_CRITICAL: &str = "#ff0000";

/// Top-level incoming-webhook body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlackMessage {
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub color: &'static str,
    pub title: String,
    pub fields: Vec<Field>,
    pub ts: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub title: &'static str,
    pub value: String,
    pub short: bool,
}

pub fn color_for(level: NotifyLevel) -> &'static str {
    match level {
        NotifyLevel::Info => COLOR_INFO,
        NotifyLevel::Alert => COLOR_ALERT,
        NotifyLevel::Critical => COLOR_CRITICAL,
    }
}

impl SlackMessage {
    /// Single-attachment message stamped with `ts` (unix seconds).
    pub fn from_notification(notification: &Notification, ts: i64) -> Self {
        let attachment = Attachment {
            color: color_for(notification.level),
            title: format!("Application status: {}", notification.app),
            fields: vec![
                Field {
                    title: "Status",
                    value: notification.status.clone(),
                    short: true,
                },
                Field {
                    title: "Attempts",
                    value: notification.attempts.to_string(),
                    short: true,
                },
                Field {
                    title: "Action",
                    value: notification.message.clone(),
                    short: false,
                },
            ],
            ts,
        };
        Self {
            attachments: vec![attachment],
        }
    }
}

/// One-line rendering used by the log-only notifier.
pub fn summary(notification: &Notification) -> String {
    format!(
        "[{}] {}: {} (status {}, attempts {})",
        notification.level,
        notification.app,
        notification.message,
        notification.status,
        notification.attempts
    )
}
