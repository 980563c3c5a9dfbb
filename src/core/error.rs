//! Error types for the vtlookup library.
//!
//! A missing credential and an unknown hash are *not* errors; they are
//! ordinary outcomes of a lookup. Everything here is a genuine failure
//! that the caller has to handle.

use std::time::Duration;
use thiserror::Error;

/// The main error type for lookup operations.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The service answered with a status other than 200 or 404.
    #[error("lookup failed with status {status}: {message}")]
    LookupFailed {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error text, including the response body when it could be read.
        message: String,
    },

    /// The response body does not match the expected report schema.
    #[error("malformed response: {details}")]
    MalformedResponse {
        /// What was wrong with the body.
        details: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {after:?}")]
    Timeout {
        /// The timeout that expired.
        after: Duration,
    },

    /// The connection to the service could not be established or broke.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        /// Error message describing the failure.
        message: String,
    },

    /// An I/O error occurred while reading the local file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found at the specified path.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// The client could not be constructed from its configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl LookupError {
    /// Returns the HTTP status carried by a `LookupFailed` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::LookupFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the service rejected the credential (401 or 403).
    ///
    /// Such responses are still reported as `LookupFailed`.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Returns `true` if the failure happened on the network path rather
    /// than locally or in the response body.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ConnectionFailed { .. })
    }

    /// Creates a `LookupFailed` error.
    pub fn lookup_failed(status: u16, message: impl Into<String>) -> Self {
        Self::LookupFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a `MalformedResponse` error.
    pub fn malformed(details: impl Into<String>) -> Self {
        Self::MalformedResponse {
            details: details.into(),
        }
    }

    /// Creates a `ConnectionFailed` error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        Self::malformed(e.to_string())
    }
}

/// Error type for loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML for the expected schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
