//! Unified error types for the front-end.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Unified error type for the front-end.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Content API error.
    #[error("cms error: {0}")]
    Cms(#[from] CmsError),

    /// Path id could not be parsed as an integer.
    #[error("invalid id {value:?}: {source}")]
    InvalidId {
        /// The raw path segment.
        value: String,
        /// Parse failure.
        source: std::num::ParseIntError,
    },

    /// Request body is not a readable multipart form.
    #[error("invalid form: {0}")]
    FormRejected(#[from] MultipartRejection),

    /// A multipart field failed to decode.
    #[error("invalid form: {0}")]
    Form(#[from] MultipartError),
}

/// Content API errors.
#[derive(Error, Debug)]
pub enum CmsError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{operation} {content_type} failed: HTTP {status}: {body}")]
    Status {
        /// Client operation name.
        operation: &'static str,
        /// Content type requested.
        content_type: String,
        /// Response status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The response was not a `{"data": [...]}` envelope.
    #[error("failed to parse content response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The response held no records.
    #[error("{content_type} not found{}", id_suffix(.id))]
    NotFound {
        /// Content type requested.
        content_type: String,
        /// Record id, when one was requested.
        id: Option<u64>,
    },

    /// A created record came back without a numeric id.
    #[error("created {content_type} has no numeric id")]
    MissingId {
        /// Content type created.
        content_type: String,
    },

    /// The mock client was told to fail.
    #[error("mock {0} failure")]
    Mock(&'static str),
}

fn id_suffix(id: &Option<u64>) -> String {
    id.map(|id| format!(" (id {})", id)).unwrap_or_default()
}

impl AppError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Cms(CmsError::NotFound { .. }) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
