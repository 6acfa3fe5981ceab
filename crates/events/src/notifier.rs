//! Post-commit notification of changed thresholds.
//!
//! Callers hand the changed-set returned by a reconcile to
//! [`dispatch_notification`] after the transaction has committed. The call
//! is awaited, and its [`NotificationOutcome`] tells the caller whether a
//! summary went out. A delivery failure is logged and reported but never
//! undoes the committed change.

use async_trait::async_trait;
use dx_db::models::threshold::Threshold;
use serde::Serialize;

use crate::delivery::email::EmailError;

/// Error raised by a [`ThresholdNotifier`].
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// Sends a summary of changed thresholds to stakeholders.
#[async_trait]
pub trait ThresholdNotifier: Send + Sync {
    /// Whether this notifier delivers anything at all.
    fn is_enabled(&self) -> bool {
        true
    }

    async fn notify(&self, changed: &[Threshold]) -> Result<(), NotifyError>;
}

/// Notifier used when no delivery channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

#[async_trait]
impl ThresholdNotifier for DisabledNotifier {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn notify(&self, changed: &[Threshold]) -> Result<(), NotifyError> {
        tracing::debug!(
            thresholds = changed.len(),
            "Notifications disabled, dropping summary"
        );
        Ok(())
    }
}

/// What happened to the summary for one reconcile call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// Nothing changed, so nothing was sent.
    Skipped,
    /// No delivery channel is configured.
    Disabled,
    /// The summary covering `count` records was delivered.
    Sent { count: usize },
    /// Delivery failed; the committed changes stand.
    Failed { reason: String },
}

/// Notify about `changed` and report the outcome instead of an error.
pub async fn dispatch_notification(
    notifier: &dyn ThresholdNotifier,
    changed: &[Threshold],
) -> NotificationOutcome {
    if changed.is_empty() {
        return NotificationOutcome::Skipped;
    }
    if !notifier.is_enabled() {
        return NotificationOutcome::Disabled;
    }

    match notifier.notify(changed).await {
        Ok(()) => NotificationOutcome::Sent {
            count: changed.len(),
        },
        Err(e) => {
            tracing::error!(error = %e, thresholds = changed.len(), "Threshold notification failed");
            NotificationOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
