//! Error types for the DDNS synchronizer
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for synchronizer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the synchronizer
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote shell connection or authentication failed
    #[error("Remote shell connection failed: {0}")]
    Connection(String),

    /// No IPv4 address pattern found in command output
    #[error("Unable to parse address: {0}")]
    Parse(String),

    /// A target hostname has no matching record at the registrar
    #[error("No DNS record found for hostname: {0}")]
    Lookup(String),

    /// A single record update request failed
    #[error("Update request for record {record_id} failed: {message}")]
    UpdateRequest {
        /// Registrar record ID
        record_id: String,
        /// Error detail
        message: String,
    },

    /// HTTP client errors (from registrar APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Resource not found at the registrar
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Local I/O errors (spawning ssh, reading files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Registrar response body is not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a remote shell connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create an address parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a hostname lookup error
    pub fn lookup(hostname: impl Into<String>) -> Self {
        Self::Lookup(hostname.into())
    }

    /// Create a per-record update error
    pub fn update_request(record_id: impl ToString, message: impl Into<String>) -> Self {
        Self::UpdateRequest {
            record_id: record_id.to_string(),
            message: message.into(),
        }
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
