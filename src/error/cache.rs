//! Cache errors

use super::FeedsError;

/// Creates a cache operation failed error
pub fn operation_failed(message: impl Into<String>) -> FeedsError {
    FeedsError::CacheOperationFailed {
        message: message.into(),
    }
}
