//! ITk production database error types

use thiserror::Error;

/// How a failure is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Wrong or rejected access codes
    AuthenticationFailure,
    /// Any other failed call against the database
    RequestFailure,
}

#[derive(Error, Debug)]
pub enum ItkdbError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Could not decode identity token: {0}")]
    Token(String),

    #[error("ITk DB request '{endpoint}' failed (status {status}): {message}")]
    Request {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse ITk DB response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ItkdbError {
    pub fn request(endpoint: &str, status: u16, message: impl Into<String>) -> Self {
        ItkdbError::Request {
            endpoint: endpoint.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ItkdbError::Authentication(_) | ItkdbError::Token(_) => {
                FailureKind::AuthenticationFailure
            }
            _ => FailureKind::RequestFailure,
        }
    }
}
