//! Error types for leave adjudication.

use std::sync::Arc;

use thiserror::Error;

/// Failures raised by a leave store or holiday calendar.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be mapped back onto the domain model.
    #[error("corrupt record in {table}: {message}")]
    Corrupt { table: &'static str, message: String },

    /// A failed lookup shared by every caller waiting on the same cache entry.
    #[error(transparent)]
    Shared(#[from] Arc<StoreError>),
}

/// Failures reported to the reviewer who submitted an adjudication.
#[derive(Debug, Error)]
pub enum AdjudicationError {
    #[error("Leave request {leave_id} not found")]
    NotFound { leave_id: u64 },

    #[error("Missing day decisions")]
    MissingDayDecisions,

    #[error("Reviewer {reviewer_id} may not adjudicate leave of employee {employee_id}")]
    Forbidden { reviewer_id: u64, employee_id: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AdjudicationError {
    /// Message safe to hand back to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AdjudicationError::Store(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type AdjudicationResult<T> = Result<T, AdjudicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_id() {
        let error = AdjudicationError::NotFound { leave_id: 42 };
        assert_eq!(error.to_string(), "Leave request 42 not found");
    }

    #[test]
    fn store_errors_are_hidden_from_caller() {
        let error = AdjudicationError::from(StoreError::Corrupt {
            table: "leave_requests",
            message: "unknown status 'Maybe'".to_string(),
        });
        assert_eq!(error.public_message(), "Internal Server Error");
        assert!(error.to_string().contains("leave_requests"));
    }

    #[test]
    fn validation_message_is_public() {
        assert_eq!(
            AdjudicationError::MissingDayDecisions.public_message(),
            "Missing day decisions"
        );
    }
}
