//! Media Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Only decoding can fail in this crate; validation
//! outcomes are a [`Rejection`](crate::Rejection), not an error.

use derive_more::{Display, Error};

/// A media error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The string is not a `data:` URI at all.
    #[display("not a data URL")]
    NotDataUrl,
    /// The data URI is not base64 encoded (plain percent-encoded payloads
    /// are never produced by this crate).
    #[display("data URL is not base64 encoded")]
    NotBase64,
    /// The base64 payload is corrupt.
    #[display("invalid or corrupted data")]
    InvalidData,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Stored content is either decodable or it isn't.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::NotDataUrl.to_string(), "not a data URL");
        assert_eq!(ErrorKind::InvalidData.to_string(), "invalid or corrupted data");
        assert!(!ErrorKind::NotBase64.is_retryable());
    }
}
