//! Client error types.
//!
//! Every failure a caller can see is an [`EcsError`]. Validation failures are
//! raised before any network I/O; everything else carries the error of the
//! layer it came from.

use std::time::Duration;

use ecs_s3_auth::AuthError;
use ecs_s3_model::{EcsOperation, InvalidParams, ServiceError};
use ecs_s3_xml::XmlError;

/// Errors raised by a [`Transport`](crate::transport::Transport).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client failed to send the request or read the response.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// An I/O error while reading the response body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by client operations.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// A required parameter is missing. Nothing was sent.
    #[error(transparent)]
    InvalidParams(#[from] InvalidParams),

    /// The server answered with a non-success status.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The request could not be sent or the response could not be read.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Credentials could not be resolved or the request could not be signed.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A success response carried malformed XML.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// The HTTP request could not be assembled.
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    /// The configured endpoint is not a usable absolute URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A header name or value cannot be put on the wire.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name as given.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The build stage produced no HTTP request.
    #[error("no HTTP request was built for {0}")]
    NotBuilt(EcsOperation),

    /// The caller's cancellation token fired before the response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl EcsError {
    /// Build an [`EcsError::InvalidHeader`].
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// The service error, if the server rejected the request.
    #[must_use]
    pub fn as_service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true if the server rejected the request with the given error code.
    #[must_use]
    pub fn is_service_code(&self, code: &str) -> bool {
        self.as_service_error().is_some_and(|e| e.is(code))
    }
}

impl From<std::io::Error> for EcsError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(TransportError::Io(err))
    }
}
