//! Feed errors

use super::FeedsError;

/// Creates an invalid feed identifier error
pub fn invalid_id(feed_id: impl Into<String>) -> FeedsError {
    FeedsError::InvalidFeedId {
        feed_id: feed_id.into(),
    }
}

/// Creates a transport failure error
pub fn transport_failed(url: impl Into<String>, reason: impl Into<String>) -> FeedsError {
    FeedsError::TransportFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a non-success HTTP status error
pub fn http_status(url: impl Into<String>, status: u16) -> FeedsError {
    FeedsError::HttpStatus {
        url: url.into(),
        status,
    }
}

/// Creates a malformed payload error
pub fn malformed_payload(url: impl Into<String>, reason: impl Into<String>) -> FeedsError {
    FeedsError::MalformedPayload {
        url: url.into(),
        reason: reason.into(),
    }
}
