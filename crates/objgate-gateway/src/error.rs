//! Error types and gateway error kinds

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use objgate_store::StoreError;
use thiserror::Error;

/// Methods the gateway answers
pub const ALLOWED_METHODS: &str = "PUT, GET, DELETE";

/// Gateway error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    PreconditionFailed,
    MethodNotAllowed,
    RangeNotSatisfiable,
    InvalidKey,
    IncompleteBody,
    BackendFailure,
}

impl ErrorKind {
    /// Get the error code string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "NotFound",
            Self::PreconditionFailed => "PreconditionFailed",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::RangeNotSatisfiable => "RangeNotSatisfiable",
            Self::InvalidKey => "InvalidKey",
            Self::IncompleteBody => "IncompleteBody",
            Self::BackendFailure => "BackendFailure",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RangeNotSatisfiable => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::InvalidKey | Self::IncompleteBody => StatusCode::BAD_REQUEST,
            Self::BackendFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text body sent to the client
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "Object Not Found",
            Self::PreconditionFailed => "Precondition Failed",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::RangeNotSatisfiable => "Range Not Satisfiable",
            Self::InvalidKey => "Invalid Key",
            Self::IncompleteBody => "Incomplete Request Body",
            Self::BackendFailure => "Internal Server Error",
        }
    }
}

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{}: {message}", .kind.as_str())]
    Gateway { kind: ErrorKind, message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a new gateway error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Gateway {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn not_found(key: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("no object at {key}"))
    }

    pub fn precondition_failed(key: &str) -> Self {
        Self::new(ErrorKind::PreconditionFailed, format!("preconditions rejected {key}"))
    }

    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, format!("{method} is not supported"))
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Gateway { kind, .. } => *kind,
            Self::Store(e) => match e {
                StoreError::RangeNotSatisfiable { .. } => ErrorKind::RangeNotSatisfiable,
                StoreError::InvalidKey(_) => ErrorKind::InvalidKey,
                StoreError::Body(_) => ErrorKind::IncompleteBody,
                _ => ErrorKind::BackendFailure,
            },
            Self::Internal(_) => ErrorKind::BackendFailure,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = kind.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = match (&self, kind) {
            (Self::Store(StoreError::InvalidKey(reason)), _) => format!("Invalid Key: {reason}"),
            (_, kind) => kind.public_message().to_string(),
        };

        let mut response = (
            status,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::HeaderName::from_static("x-objgate-error-code"), kind.as_str()),
            ],
            body,
        )
            .into_response();

        let headers = response.headers_mut();
        match (&self, kind) {
            (_, ErrorKind::Unauthorized) => {
                headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            (_, ErrorKind::MethodNotAllowed) => {
                headers.insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
            }
            (Self::Store(StoreError::RangeNotSatisfiable { size }), _) => {
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{size}")) {
                    headers.insert(header::CONTENT_RANGE, value);
                }
            }
            _ => {}
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::unauthorized("missing").kind().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(StoreError::Backend("disk on fire".into())).kind(),
            ErrorKind::BackendFailure
        );
        assert_eq!(
            ApiError::from(StoreError::Body("reset".into())).kind().status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unauthorized_response_has_challenge() {
        let response = ApiError::unauthorized("missing").into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn test_method_not_allowed_response_lists_methods() {
        let response = ApiError::method_not_allowed("PATCH").into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "PUT, GET, DELETE");
    }

    #[test]
    fn test_range_not_satisfiable_reports_size() {
        let response = ApiError::from(StoreError::RangeNotSatisfiable { size: 42 }).into_response();

        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */42");
    }

    #[test]
    fn test_backend_failure_hides_details() {
        let response = ApiError::from(StoreError::Backend("disk on fire".into())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["x-objgate-error-code"], "BackendFailure");
    }
}
