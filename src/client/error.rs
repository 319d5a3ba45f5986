//! Errors reported by the API client

use thiserror::Error;

use crate::error::ErrorCode;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Rejected credentials at login
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    /// The server refused the stored token; the session has been cleared
    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other failure envelope, business rule violations included
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Reading or writing the persisted session failed
    #[error("Session storage error: {0}")]
    Session(String),
}

impl ClientError {
    /// Map a failure envelope to an error kind by HTTP status
    pub fn from_failure(status: u16, code: Option<ErrorCode>, message: String) -> Self {
        match status {
            400 => ClientError::Validation(message),
            401 => ClientError::Authentication(message),
            403 => ClientError::Authorization(message),
            404 => ClientError::NotFound(message),
            409 => ClientError::Conflict(message),
            _ => ClientError::Rejected {
                status,
                code,
                message,
            },
        }
    }

    /// Business rule violations (HTTP 422)
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            ClientError::Rejected {
                code: Some(ErrorCode::RuleViolation),
                ..
            } | ClientError::Rejected { status: 422, .. }
        )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
