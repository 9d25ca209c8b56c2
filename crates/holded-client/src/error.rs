//! Client error types.
//!
//! Upstream failures arrive as [`Error::Api`] with the untouched response body.
//! The facade re-tags one upstream signature (HTTP 400 with `status: 0` and an
//! `info` mentioning "not found") as [`Error::NotFound`].

use serde_json::Value;
use thiserror::Error;

/// Synthetic status carried by normalized not-found errors.
pub const NOT_FOUND_STATUS: u16 = 404;

/// Synthetic status text carried by normalized not-found errors.
pub const NOT_FOUND_STATUS_TEXT: &str = "Not Found";

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-reqwest transport could not complete the exchange.
    #[error("Transport error: {0}")]
    Transport(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upstream returned a non-2xx response.
    #[error("API error ({status} {status_text}): {data}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// HTTP reason phrase.
        status_text: String,
        /// Decoded response body, unmodified.
        data: Value,
    },

    /// Upstream reported a missing resource.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// A document operation received a type outside the fixed set.
    #[error("Unknown document type \"{value}\", expected one of: {allowed}")]
    InvalidDocumentType {
        /// The rejected value.
        value: String,
        /// Comma separated list of accepted types.
        allowed: String,
    },

    /// A resource name outside the fixed set.
    #[error("Unknown resource \"{0}\"")]
    UnknownResource(String),

    /// Request descriptor carried a method that is not a valid HTTP method.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is a not-found error, normalized or a plain upstream 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_)) || matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this error was raised locally before any network work.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::InvalidDocumentType { .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// HTTP status attached to this error, synthetic for normalized not-found errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::NotFound(err) => Some(err.status()),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// HTTP status text attached to this error.
    pub fn status_text(&self) -> Option<&str> {
        match self {
            Error::Api { status_text, .. } => Some(status_text),
            Error::NotFound(err) => Some(err.status_text()),
            _ => None,
        }
    }

    /// Decoded upstream body for [`Error::Api`].
    pub fn data(&self) -> Option<&Value> {
        match self {
            Error::Api { data, .. } => Some(data),
            _ => None,
        }
    }
}

/// A resource lookup that upstream reported as missing.
///
/// Keeps the original error around for diagnostics via
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("\"{resource}\" resource id=\"{id}\" not found!")]
pub struct NotFoundError {
    resource: String,
    id: String,
    #[source]
    original: Box<Error>,
}

impl NotFoundError {
    pub(crate) fn new(resource: impl Into<String>, id: impl Into<String>, original: Error) -> Self {
        Self {
            resource: resource.into(),
            id: id.into(),
            original: Box::new(original),
        }
    }

    /// Name of the resource collection that was queried.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Identifier that was not found.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Always 404.
    pub fn status(&self) -> u16 {
        NOT_FOUND_STATUS
    }

    /// Always "Not Found".
    pub fn status_text(&self) -> &str {
        NOT_FOUND_STATUS_TEXT
    }

    /// The upstream error this one replaced.
    pub fn original(&self) -> &Error {
        &self.original
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
