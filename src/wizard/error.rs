//! Submission error taxonomy.
//!
//! Everything the submit collaborator can report collapses into three
//! user-presentable shapes; raw transport errors never cross the pipeline
//! boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One field-level problem reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Errors from the submit collaborator, classified for user display.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// Structured multi-message validation feedback from the server
    #[error("server rejected the submission with {} field issue(s)", .0.len())]
    Validation(Vec<FieldIssue>),

    /// A single descriptive message from the server or transport
    #[error("{0}")]
    Message(String),

    /// Unknown or opaque failure
    #[error("submission failed for an unknown reason")]
    Unknown,
}

impl SubmitError {
    pub fn validation(issues: Vec<FieldIssue>) -> Self {
        SubmitError::Validation(issues)
    }

    pub fn message(message: impl Into<String>) -> Self {
        SubmitError::Message(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }

    /// Field-level details, when the server provided them.
    pub fn field_issues(&self) -> &[FieldIssue] {
        match self {
            SubmitError::Validation(issues) => issues,
            _ => &[],
        }
    }

    /// Single human-readable line for notification display.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(issues) => issues
                .first()
                .map(|issue| format!("{}: {}", issue.field, issue.message))
                .unwrap_or_else(|| "The server rejected the submission".to_string()),
            SubmitError::Message(message) => message.clone(),
            SubmitError::Unknown => "Something went wrong while submitting".to_string(),
        }
    }
}

/// Server acknowledgement for an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub record_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
