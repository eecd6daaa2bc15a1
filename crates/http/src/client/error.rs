//! Client error types

use crate::auth::credentials::CredentialError;
use reqwest::StatusCode;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error, no response was received
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The stored credential could not be read
    #[error("Credential lookup failed: {0}")]
    Credential(#[from] CredentialError),

    /// Response envelope reported a failure or carried no data
    #[error("Envelope error {status}: {message}")]
    Envelope { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Status code of the server response behind this error.
    ///
    /// `None` means the failure never reached the server (transport,
    /// credential or configuration problems).
    pub fn status(&self) -> Option<StatusCode> {
        let code = match self {
            Self::BadRequest(_) => 400,
            Self::AuthenticationFailed(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::ServerError { status, .. } => *status,
            Self::Request(err) => return err.status(),
            _ => return None,
        };
        StatusCode::from_u16(code).ok()
    }

    /// True when the server answered 401 Unauthorized
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
