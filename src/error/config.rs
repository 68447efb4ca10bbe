//! Configuration errors

use super::FeedsError;

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> FeedsError {
    FeedsError::ConfigNotFound { path: path.into() }
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> FeedsError {
    FeedsError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a config read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> FeedsError {
    FeedsError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a config write failed error
pub fn write_failed(path: impl Into<String>, reason: impl Into<String>) -> FeedsError {
    FeedsError::ConfigWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
