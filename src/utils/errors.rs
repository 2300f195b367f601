//! Error handling for Presensi
//!
//! This module defines the main error types used throughout the crate
//! and provides a unified error handling strategy.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Main error type for Presensi
#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors returned by the backend API client.
///
/// Every call into the backend resolves to one of these variants, so callers
/// can tell transport problems, local validation and server-side business
/// errors apart without inspecting response bodies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors raised while decoding a scanned session token
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Token expired at {expires_at}")]
    Expired { expires_at: DateTime<Utc> },
}

/// Result type alias for Presensi operations
pub type Result<T> = std::result::Result<T, AttendanceError>;

/// Result type alias for backend API calls
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Message to show the user for this failure.
    ///
    /// Server-provided strings are surfaced verbatim; everything else
    /// collapses into the caller's generic fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Unauthorized(message) if !message.is_empty() => message.clone(),
            ApiError::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Whether this error should force the stored credentials out
    pub fn requires_logout(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// Whether the request never reached a server decision
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Timeout)
    }
}

impl AttendanceError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            AttendanceError::Api(e) => e.is_transport(),
            AttendanceError::Token(_) => true,
            AttendanceError::Config(_) => false,
            AttendanceError::InvalidStateTransition { .. } => false,
            AttendanceError::WebSocket(_) => true,
            AttendanceError::Serialization(_) => false,
            AttendanceError::Io(_) => true,
            AttendanceError::UrlParse(_) => false,
            AttendanceError::Authentication(_) => false,
            AttendanceError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AttendanceError::Config(_) => ErrorSeverity::Critical,
            AttendanceError::UrlParse(_) => ErrorSeverity::Critical,
            AttendanceError::Authentication(_) => ErrorSeverity::Warning,
            AttendanceError::Api(ApiError::Unauthorized(_)) => ErrorSeverity::Warning,
            AttendanceError::Api(ApiError::Validation(_)) => ErrorSeverity::Info,
            AttendanceError::Token(_) => ErrorSeverity::Info,
            AttendanceError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
