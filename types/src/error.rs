//! Parse and validation errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("unknown claim method: {0}")]
    UnknownMethod(String),

    #[error("unknown claim status: {0}")]
    UnknownStatus(String),

    #[error("unknown decision: {0}")]
    UnknownDecision(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
