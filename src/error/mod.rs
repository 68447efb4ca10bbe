//! Error types and handling for appfeeds
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`feed`]: Feed resolution, transport and payload errors
//! - [`cache`]: Cache store errors
//! - [`config`]: Configuration and source registry errors
//!
//! Only the single-feed fetch path ever returns these errors to a caller. Aggregation absorbs
//! per-feed failures and reports them as [`crate::aggregate::FeedFailure`] entries instead.

pub mod cache;
pub mod config;
pub mod feed;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for appfeeds operations
#[derive(Error, Diagnostic, Debug)]
pub enum FeedsError {
    // Feed errors
    #[error("Invalid feed identifier: '{feed_id}'")]
    #[diagnostic(
        code(appfeeds::feed::invalid_id),
        help("Use an absolute URL or the name of a feed under the configured base URL")
    )]
    InvalidFeedId { feed_id: String },

    #[error("Failed to fetch feed {url}: {reason}")]
    #[diagnostic(
        code(appfeeds::feed::transport_failed),
        help("Check that the feed URL is reachable")
    )]
    TransportFailed { url: String, reason: String },

    #[error("Feed {url} answered with HTTP {status}")]
    #[diagnostic(code(appfeeds::feed::http_status))]
    HttpStatus { url: String, status: u16 },

    #[error("Feed {url} is not valid JSON: {reason}")]
    #[diagnostic(
        code(appfeeds::feed::malformed_payload),
        help("The response did not contain a parseable JSON object or array")
    )]
    MalformedPayload { url: String, reason: String },

    // Cache errors
    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(appfeeds::cache::operation_failed))]
    CacheOperationFailed { message: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(appfeeds::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(appfeeds::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(appfeeds::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to write configuration file: {path}")]
    #[diagnostic(code(appfeeds::config::write_failed))]
    ConfigWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(appfeeds::fs::io_error))]
    IoError { message: String },
}

impl FeedsError {
    /// Whether the error came from the network or the payload rather than local state.
    ///
    /// These are the failures the fetcher may cover with a stale cache entry.
    pub fn is_recoverable_with_cache(&self) -> bool {
        matches!(
            self,
            FeedsError::TransportFailed { .. }
                | FeedsError::HttpStatus { .. }
                | FeedsError::MalformedPayload { .. }
        )
    }
}

impl From<std::io::Error> for FeedsError {
    fn from(err: std::io::Error) -> Self {
        FeedsError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for FeedsError {
    fn from(err: serde_yaml::Error) -> Self {
        FeedsError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FeedsError {
    fn from(err: serde_json::Error) -> Self {
        FeedsError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for FeedsError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string());
        match err.status() {
            Some(status) => FeedsError::HttpStatus {
                url,
                status: status.as_u16(),
            },
            None => FeedsError::TransportFailed {
                url,
                reason: err.to_string(),
            },
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, FeedsError>;
