//! Error types and handling for docview-core operations.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. Failures are
//! scoped to a single query or document load; none of them is fatal to the
//! process.
//!
//! ## Error Categories
//!
//! - **Network Errors**: the request was rejected or the server answered with a
//!   non-2xx status
//! - **Malformed Responses**: the body did not deserialize into the expected shape
//! - **Document Not Found**: a 404 on a single-document fetch
//! - **Cancellation**: a request was superseded or its owner was torn down. This
//!   is not a failure and never reaches the search status
//! - **Configuration Errors**: invalid settings or config files
//!
//! ## Recovery Hints
//!
//! ```rust
//! use docview_core::Error;
//!
//! let err = Error::HttpStatus { status: 503, message: "Service Unavailable".into() };
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), "network");
//! ```

use thiserror::Error;

/// The main error type for docview-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading markdown sources and configuration files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed before a response was received.
    ///
    /// The underlying `reqwest::Error` is preserved for detailed connection
    /// information. Connection and timeout errors are recoverable.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    ///
    /// `message` carries the server's own error description when the body
    /// provided one, otherwise the status line.
    #[error("Request failed: {status} {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Human-readable reason.
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The requested document does not exist on the server.
    ///
    /// Terminal for a document load: no TOC or highlight work is attempted and
    /// the load is not retried automatically.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The request was superseded by a newer one or its owner shut down.
    ///
    /// Cancellation is swallowed by the query controller and never shows up
    /// as an error state.
    #[error("Request cancelled")]
    Cancelled,

    /// Markdown source could not be turned into a document tree.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL is malformed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Serialization or deserialization of local data failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might go away when the same request is retried.
    ///
    /// Transport timeouts, refused connections and 5xx statuses are treated
    /// as transient. Everything else, including [`Error::Cancelled`], is not.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Whether this error only records that a request was superseded.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Get the error category as a static label for logging.
    ///
    /// - `"io"` - File system and I/O operations
    /// - `"network"` - Transport failures and non-2xx statuses
    /// - `"malformed_response"` - Unexpected response bodies
    /// - `"not_found"` - Missing documents
    /// - `"cancelled"` - Superseded requests
    /// - `"parse"` - Markdown conversion
    /// - `"config"` - Configuration and settings
    /// - `"invalid_url"` - URL format and validation
    /// - `"serialization"` - Local data format conversion
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) | Self::HttpStatus { .. } => "network",
            Self::MalformedResponse(_) => "malformed_response",
            Self::DocumentNotFound(_) => "not_found",
            Self::Cancelled => "cancelled",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
