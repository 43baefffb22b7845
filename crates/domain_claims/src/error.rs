//! Claims domain errors

use thiserror::Error;

/// Errors raised while validating a claim submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Unknown procedure code: {0}")]
    UnknownProcedureCode(String),
}

impl ClaimError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ClaimError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
