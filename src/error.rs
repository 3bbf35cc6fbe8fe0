//! Check-in error types with HTTP status code mapping.
//!
//! [`CheckinError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and renders as an HTML failure page,
//! since every client of this service is a person holding a phone.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::page;
use crate::store::StoreError;

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | State/Not Found | 400 Bad Request / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error / 503 Service Unavailable |
#[derive(Debug, thiserror::Error)]
pub enum CheckinError {
    /// The request carried no usable token.
    #[error("missing token")]
    MissingToken,

    /// An email address failed normalization.
    #[error("invalid email: {0:?}")]
    InvalidEmail(String),

    /// A registrant name was empty.
    #[error("invalid name for {0}: must not be empty")]
    InvalidName(String),

    /// No registrant exists for the given token or email.
    #[error("registrant not found")]
    RegistrantNotFound,

    /// A registrant with the same email already exists.
    #[error("registrant already exists: {0}")]
    DuplicateRegistrant(String),

    /// Store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Seed file or token export I/O failure.
    #[error("seed error: {0}")]
    Seed(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CheckinError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::MissingToken => 1001,
            Self::InvalidEmail(_) => 1002,
            Self::InvalidName(_) => 1003,
            Self::RegistrantNotFound => 2001,
            Self::DuplicateRegistrant(_) => 2002,
            Self::Store(_) => 3001,
            Self::Seed(_) => 3002,
            Self::Timeout => 3003,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken
            | Self::InvalidEmail(_)
            | Self::InvalidName(_)
            | Self::RegistrantNotFound => StatusCode::BAD_REQUEST,
            Self::DuplicateRegistrant(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::Seed(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns the text safe to show to the person scanning.
    ///
    /// Server-side failures are reduced to a generic message.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            "An error occurred during check-in. Please contact staff.".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for CheckinError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        page::failure(status, &self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        assert_eq!(
            CheckinError::MissingToken.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CheckinError::InvalidEmail("x".to_string()).error_code(),
            1002
        );
    }

    #[test]
    fn server_errors_hide_detail() {
        let err = CheckinError::Store(StoreError::Backend(
            "password authentication failed".to_string(),
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("password"));
    }

    #[test]
    fn into_response_keeps_status() {
        let response = CheckinError::DuplicateRegistrant("a@x.com".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn timeout_renders_generic_html_page() {
        let response = CheckinError::Timeout.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        assert_eq!(content_type, Some("text/html; charset=utf-8"));
        assert!(
            CheckinError::Timeout
                .public_message()
                .contains("Please contact staff")
        );
    }
}
