//! Unified error type and HTTP response conversion.
//!
//! All modules funnel their failures into [`Error`], which carries enough
//! context for route handlers to derive an HTTP status code. The [`AppError`]
//! wrapper implements `IntoResponse` so handlers can return
//! `Result<T, AppError>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling uploads and conversions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request data failed validation (missing file, disallowed extension).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "artifact").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The conversion subprocess exceeded its wall-clock bound.
    #[error("{tool} timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    /// The conversion subprocess failed or produced no output.
    #[error("Conversion failed [{tool}]: {message}")]
    Conversion {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description, typically the tool's stderr.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound { .. } => 404,
            Error::Timeout { .. } => 504,
            Error::Conversion { .. } => 502,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Machine-readable error code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::NotFound { .. } => "not_found",
            Error::Timeout { .. } => "conversion_timeout",
            Error::Conversion { .. } => "conversion_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Conversion`].
    pub fn conversion(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Conversion {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Wrapper so we can implement `IntoResponse` without exposing axum in every
/// module that produces an [`Error`].
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.0,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.0.to_string(),
            "code": self.0.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_produces_400() {
        let err = AppError::from(Error::validation("bad extension"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_produces_404() {
        let err = AppError::from(Error::not_found("artifact", "abc.pdf"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn timeout_produces_504() {
        let err = AppError::from(Error::Timeout {
            tool: "soffice".into(),
            seconds: 60,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn conversion_produces_502() {
        let err = AppError::from(Error::conversion("soffice", "exited with status 1"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(Error::validation("x").code(), "validation_error");
        assert_eq!(Error::not_found("artifact", "x").code(), "not_found");
        assert_eq!(
            Error::conversion("soffice", "boom").code(),
            "conversion_error"
        );
        assert_eq!(
            Error::Timeout {
                tool: "soffice".into(),
                seconds: 1
            }
            .code(),
            "conversion_timeout"
        );
    }
}
