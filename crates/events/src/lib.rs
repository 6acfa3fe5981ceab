//! Threshold change notifications.
//!
//! This crate turns the changed-set returned by
//! [`ThresholdRepo::reconcile`](dx_db::repositories::ThresholdRepo::reconcile)
//! into a summary message for stakeholders:
//!
//! - [`ThresholdNotifier`] -- the seam the API calls after a commit.
//! - [`dispatch_notification`] -- runs a notifier and reports a
//!   [`NotificationOutcome`] instead of failing the request.
//! - [`SummaryRenderer`] -- handlebars rendering of the HTML summary.
//! - [`delivery`] -- SMTP e-mail delivery.

pub mod delivery;
pub mod notifier;
pub mod summary;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use notifier::{
    dispatch_notification, DisabledNotifier, NotificationOutcome, NotifyError, ThresholdNotifier,
};
pub use summary::SummaryRenderer;
