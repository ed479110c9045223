//! Errors reported by backend service implementations.

use thiserror::Error;

/// Failure of a call to an external service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached at all
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with a non-success status
    #[error("HTTP {status}")]
    Status {
        /// Status code returned by the service
        status: u16,
    },

    /// The response body did not have the expected shape
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The referenced video or actor does not exist on the service side
    #[error("not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode(reason.into())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
