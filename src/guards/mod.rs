//! Entity lifecycle guards: state transitions, time windows and input rules
//! that sit next to the authorization policy. Guards are pure; callers pass in
//! the current time and any counts they loaded.

use serde_json::Value;
use thiserror::Error;

pub mod court;
pub mod event;
pub mod matches;
pub mod membership;

#[derive(Debug, Error)]
pub enum GuardError {
    /// A state or uniqueness invariant blocks the operation
    #[error("{message}")]
    Conflict {
        message: String,
        details: Option<Value>,
    },

    /// Malformed input or a cross-field rule violation
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Unsupported(String),
}

impl GuardError {
    pub fn conflict(message: impl Into<String>) -> Self {
        GuardError::Conflict {
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict_with(message: impl Into<String>, details: Value) -> Self {
        GuardError::Conflict {
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        GuardError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type GuardResult<T = ()> = Result<T, GuardError>;
