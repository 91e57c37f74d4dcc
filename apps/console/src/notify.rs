//! # Operator Notifications
//!
//! Workflows report outcomes through a [`Notifier`]: a transient success
//! toast, an inline validation prompt, or an error dialog. The front-end
//! decides how each looks.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::ConsoleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Validation,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Sink for operator-facing messages.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    /// Input the operator has to fix before trying again.
    fn validation(&self, message: &str);

    fn error(&self, error: &ConsoleError);
}

/// Writes notifications to the log. Used by the binary.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(text = message, "Operator notified");
    }

    fn validation(&self, message: &str) {
        warn!(text = message, "Operator prompted");
    }

    fn error(&self, error: &ConsoleError) {
        error!(code = ?error.code, text = %error.message, "Operator shown error");
    }
}

/// Keeps every notification, in order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.entries().iter().map(|n| n.kind).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.entries().pop()
    }

    fn push(&self, kind: NotificationKind, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                kind,
                message: message.to_string(),
                at: Utc::now(),
            });
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(NotificationKind::Success, message);
    }

    fn validation(&self, message: &str) {
        self.push(NotificationKind::Validation, message);
    }

    fn error(&self, error: &ConsoleError) {
        self.push(NotificationKind::Error, &error.message);
    }
}
