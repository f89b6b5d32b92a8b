//! Error types for snowcap.
//!
//! This module defines `SnowcapError`, the unified error type used throughout
//! the crate. Remote failures come in two kinds: the server answered with an
//! unexpected status (`RemoteRejection`), or the exchange never completed
//! (`Transport` / `Decode`). See [`SnowcapError::kind`].
//!
//! # Security
//!
//! The Basic-auth password must never appear in logs or printed errors.
//! Use `sanitize_message()` / `sanitized_display()` before surfacing a message.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;

/// Secrets shorter than this are not redacted; replacing them would mangle
/// unrelated text.
pub const MIN_REDACTED_SECRET_LEN: usize = 6;

/// Unified error type for all snowcap operations.
#[derive(Error, Debug)]
pub enum SnowcapError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The server responded, but not with the expected status code.
    #[error(
        "Request failed: {}\nHeaders: {headers:?}\nResponse: {body}",
        .status.as_u16()
    )]
    RemoteRejection {
        /// The HTTP status code returned.
        status: StatusCode,
        /// The response headers.
        headers: HeaderMap,
        /// The raw response body text.
        body: String,
    },

    /// The request could not be completed (DNS, connect, timeout, I/O).
    #[error("Request failed: transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("Request failed: could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Caller input rejected before any request was sent.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Coarse classification of a [`SnowcapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server answered with an unexpected status code.
    RemoteRejection,
    /// The request or the response decoding did not complete.
    Transport,
    /// Failed locally before reaching the network.
    Local,
}

impl SnowcapError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        SnowcapError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        SnowcapError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        SnowcapError::Validation(message.into())
    }

    /// Returns which kind of failure this is.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            SnowcapError::RemoteRejection { .. } => ErrorKind::RemoteRejection,
            SnowcapError::Transport(_) | SnowcapError::Decode(_) => ErrorKind::Transport,
            SnowcapError::Config(_)
            | SnowcapError::HttpClient(_)
            | SnowcapError::Validation(_) => ErrorKind::Local,
        }
    }

    /// Returns the HTTP status for a `RemoteRejection`.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            SnowcapError::RemoteRejection { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body for a `RemoteRejection`.
    #[must_use]
    pub fn response_body(&self) -> Option<&str> {
        match self {
            SnowcapError::RemoteRejection { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Replaces every occurrence of `secret` in `message` with `[REDACTED]`.
    ///
    /// Secrets shorter than [`MIN_REDACTED_SECRET_LEN`] characters leave the
    /// message unchanged.
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.chars().count() < MIN_REDACTED_SECRET_LEN {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }

    /// Creates a sanitized version of this error's display message.
    #[must_use]
    pub fn sanitized_display(&self, secret: &str) -> String {
        Self::sanitize_message(&self.to_string(), secret)
    }
}
