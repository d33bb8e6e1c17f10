//! Error types for wayback-mirror
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (index resolution, time-travel fetches)
//! - HTTP status code mapping for the trigger API
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for wayback-mirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wayback-mirror
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "archive.index_url")
        key: Option<String>,
    },

    /// A URL could not be parsed or has no usable host/origin
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL string
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Snapshot index could not be resolved (always fatal for a run)
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Time-travel fetch of a single capture failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failures while querying the historical index
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index service answered with a non-success status
    #[error("index query for {base_url} returned HTTP {status}")]
    Status {
        /// Site root the query was issued for
        base_url: String,
        /// HTTP status returned by the index service
        status: u16,
    },

    /// The index response body was not the expected tabular JSON
    #[error("malformed index response for {base_url}: {reason}")]
    Malformed {
        /// Site root the query was issued for
        base_url: String,
        /// What was wrong with the body
        reason: String,
    },
}

/// Failures while fetching one capture from the time-travel endpoint
#[derive(Debug, Error)]
pub enum FetchError {
    /// The archive answered with a non-success status
    #[error("{address} returned HTTP {status}")]
    Status {
        /// The time-travel address that was requested
        address: String,
        /// HTTP status returned
        status: u16,
    },

    /// The response body stream broke before completion
    #[error("stream from {address} to {path} failed: {reason}")]
    Stream {
        /// The time-travel address that was requested
        address: String,
        /// Destination file
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },
}

impl FetchError {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Stream { .. } => None,
        }
    }
}

/// API error response format
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_url",
///     "message": "invalid URL 'nope': relative URL without a base"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "invalid_url", "index_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::InvalidUrl { .. } => 400,

            // 502 Bad Gateway - the archive misbehaved
            Error::Index(_) => 502,
            Error::Fetch(_) => 502,
            Error::Network(_) => 502,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::Index(e) => match e {
                IndexError::Status { .. } => "index_unavailable",
                IndexError::Malformed { .. } => "index_malformed",
            },
            Error::Fetch(e) => match e {
                FetchError::Status { .. } => "fetch_failed",
                FetchError::Stream { .. } => "stream_failed",
            },
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::InvalidUrl { url, .. } => Some(serde_json::json!({ "url": url })),
            Error::Index(IndexError::Status { base_url, status }) => Some(serde_json::json!({
                "base_url": base_url,
                "status": status,
            })),
            Error::Fetch(FetchError::Status { address, status }) => Some(serde_json::json!({
                "address": address,
                "status": status,
            })),
            Error::Fetch(FetchError::Stream { address, path, .. }) => Some(serde_json::json!({
                "address": address,
                "path": path,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
