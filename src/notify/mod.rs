//! Notification collaborator
//!
//! Alert/broadcast seam used when the hydrator or the constraint
//! validator detects an integrity violation. Delivery guarantees belong
//! to the collaborator, not to this pipeline.

use crate::domain::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// One notification to broadcast
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Severity of the event
    pub severity: Severity,
    /// Human-readable message; must not contain sensitive values
    pub message: String,
    /// Roles the notification targets (e.g. "operations")
    pub target_roles: Vec<String>,
}

impl Notification {
    /// Create a notification
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        target_roles: Vec<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            target_roles,
        }
    }
}

/// Alert/broadcast collaborator
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification
    ///
    /// # Errors
    ///
    /// Implementations report delivery failures as
    /// [`VeilError::Notification`](crate::domain::VeilError::Notification);
    /// the pipeline logs them and continues.
    async fn notify(&self, notification: Notification) -> Result<()>;
}

/// Default notifier that emits notifications as tracing events
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Create a tracing-backed notifier
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        let roles = notification.target_roles.join(",");
        match notification.severity {
            Severity::Info => {
                tracing::info!(target_roles = %roles, "{}", notification.message)
            }
            Severity::Warning => {
                tracing::warn!(target_roles = %roles, "{}", notification.message)
            }
            Severity::Critical => {
                tracing::error!(target_roles = %roles, "{}", notification.message)
            }
        }
        Ok(())
    }
}
