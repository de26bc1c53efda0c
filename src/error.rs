//! Error types shared by the upstream client and the route handlers.
//!
//! Classification happens where the failure is detected. Handlers only pick
//! the body family: plain text for `/get.php`, `[]` for `/player_api.php`.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Which upstream collaborator failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamSource {
    Directory,
    Playlist,
    Stream,
}

impl UpstreamSource {
    pub fn as_str(self) -> &'static str {
        match self {
            UpstreamSource::Directory => "directory",
            UpstreamSource::Playlist => "playlist",
            UpstreamSource::Stream => "stream",
        }
    }
}

impl std::fmt::Display for UpstreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure talking to an upstream source
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network/connection error
    #[error("{origin} unreachable: {message}")]
    Network {
        origin: UpstreamSource,
        message: String,
    },

    /// HTTP error (non-2xx status)
    #[error("{origin} answered HTTP {status}")]
    Http { origin: UpstreamSource, status: u16 },

    /// Body could not be decoded
    #[error("{origin} returned an unreadable body: {message}")]
    Decode {
        origin: UpstreamSource,
        message: String,
    },

    /// Stream entry has no playback URL to resolve
    #[error("stream {0} has no source url")]
    MissingSourceUrl(i64),
}

impl UpstreamError {
    pub fn origin(&self) -> UpstreamSource {
        match self {
            UpstreamError::Network { origin, .. }
            | UpstreamError::Http { origin, .. }
            | UpstreamError::Decode { origin, .. } => *origin,
            UpstreamError::MissingSourceUrl(_) => UpstreamSource::Stream,
        }
    }
}

/// Request-level failure, mapped onto an HTTP status
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("invalid login")]
    Forbidden,

    #[error("subscription expired")]
    SubscriptionExpired,

    #[error("{0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::SubscriptionExpired => StatusCode::PAYMENT_REQUIRED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        match self {
            AppError::Upstream(e) => tracing::error!(origin = %e.origin(), "Upstream failure: {}", e),
            AppError::Internal(e) => tracing::error!("Internal error: {}", e),
            other => tracing::debug!(status = other.status().as_u16(), "Request rejected: {}", other),
        }
    }
}

/// Error rendered as plain text (playlist endpoint)
#[derive(Debug)]
pub struct TextError(pub AppError);

/// Error rendered as an empty JSON array (player API endpoint)
#[derive(Debug)]
pub struct JsonError(pub AppError);

impl From<AppError> for TextError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<UpstreamError> for TextError {
    fn from(err: UpstreamError) -> Self {
        Self(err.into())
    }
}

impl From<AppError> for JsonError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<UpstreamError> for JsonError {
    fn from(err: UpstreamError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for TextError {
    fn into_response(self) -> Response {
        self.0.log();
        let body = match &self.0 {
            AppError::BadRequest(_) => "Missing or wrong parameters".to_string(),
            AppError::Forbidden | AppError::SubscriptionExpired => "Invalid login".to_string(),
            AppError::NotFound(_) => "Not Found".to_string(),
            AppError::Upstream(_) => "Upstream error".to_string(),
            AppError::Internal(e) => format!("Internal error: {}", e),
        };
        (
            self.0.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        self.0.log();
        (
            self.0.status(),
            [(header::CONTENT_TYPE, "application/json")],
            "[]",
        )
            .into_response()
    }
}
