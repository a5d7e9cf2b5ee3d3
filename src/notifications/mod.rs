//! Notification events for wizard outcomes.
//!
//! The wizard reports terminal submission outcomes to a [`Notifier`]; how a
//! frontend delivers them (toast, OS notification, webhook) is its own
//! concern and lives outside this crate.

use serde::{Deserialize, Serialize};

/// All notification events the wizard can dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum WizardEvent {
    /// Submission accepted by the server
    #[serde(rename = "submission.succeeded")]
    SubmissionSucceeded { record_id: String },

    /// Submission rejected locally before reaching the server
    #[serde(rename = "submission.rejected")]
    SubmissionRejected {
        /// Ordinal of the first step that failed validation
        step: usize,
        error_count: usize,
    },

    /// Submission failed at the server or on the wire
    #[serde(rename = "submission.failed")]
    SubmissionFailed { message: String },
}

impl WizardEvent {
    /// Stable event type string (for filtering and logging)
    pub fn event_type(&self) -> &'static str {
        match self {
            WizardEvent::SubmissionSucceeded { .. } => "submission.succeeded",
            WizardEvent::SubmissionRejected { .. } => "submission.rejected",
            WizardEvent::SubmissionFailed { .. } => "submission.failed",
        }
    }
}

/// Receiver for wizard events.
///
/// Implementations must be fire-and-forget: log failures, never fail the
/// caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &WizardEvent);
}

/// Default notifier that records events in the log stream.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &WizardEvent) {
        match event {
            WizardEvent::SubmissionSucceeded { record_id } => {
                tracing::info!(record_id = %record_id, "Submission succeeded");
            }
            WizardEvent::SubmissionRejected { step, error_count } => {
                tracing::warn!(step, error_count, "Submission rejected by validation");
            }
            WizardEvent::SubmissionFailed { message } => {
                tracing::warn!(message = %message, "Submission failed");
            }
        }
    }
}

/// Notifier that discards all events (for tests and headless use).
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: &WizardEvent) {}
}
