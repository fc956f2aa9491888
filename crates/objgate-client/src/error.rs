//! Client error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing or wrong bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Object not found
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Conditional request rejected
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Range outside the object
    #[error("Range not satisfiable: {0}")]
    RangeNotSatisfiable(String),

    /// Any other non-success status
    #[error("Gateway returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Map a gateway status to an error
    pub fn from_status(status: u16, key: &str, message: String) -> Self {
        match status {
            401 => Self::Unauthorized,
            404 => Self::NotFound(key.to_string()),
            412 => Self::PreconditionFailed(key.to_string()),
            416 => Self::RangeNotSatisfiable(key.to_string()),
            _ => Self::Status { status, message },
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(ClientError::from_status(401, "k", String::new()), ClientError::Unauthorized));
        assert!(ClientError::from_status(404, "k", String::new()).is_not_found());
        assert!(matches!(
            ClientError::from_status(503, "k", "busy".into()),
            ClientError::Status { status: 503, .. }
        ));
    }
}
