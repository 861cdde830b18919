//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Failures of the storage crate are
//! raised into [`ErrorKind::Storage`] with the original error kept as a child.

use derive_more::{Display, Error};
use sharehub_media::Rejection;
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a library failure.
///
/// ### User-facing
/// - [`ErrorKind::Rejected`]: the selection broke an upload rule.
/// - [`ErrorKind::Busy`]: another upload was still in flight.
///
/// ### Encoding
/// - [`ErrorKind::Unreadable`]
/// - [`ErrorKind::SizeMismatch`]
///
/// ### Store and gallery
/// - [`ErrorKind::DuplicateId`]
/// - [`ErrorKind::NotFound`]
/// - [`ErrorKind::Serialize`]
/// - [`ErrorKind::Storage`]
/// - [`ErrorKind::Decode`]
/// - [`ErrorKind::Write`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("{_0}")]
    Rejected(#[error(not(source))] Rejection),
    #[display("another upload is already in progress")]
    Busy,
    /// The selected file could not be opened or read.
    #[display("could not read {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// The bytes read do not add up to the size that was validated.
    #[display("expected {expected} bytes but read {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
    #[display("a file with id {_0} already exists")]
    DuplicateId(#[error(not(source))] String),
    #[display("no file with id {_0}")]
    NotFound(#[error(not(source))] String),
    /// The record list could not be turned into JSON.
    #[display("could not serialize the file list")]
    Serialize,
    /// A storage backend operation failed.
    #[display("could not persist the file list")]
    Storage,
    /// Stored content is not a valid data URL.
    #[display("stored content for {_0} is corrupt")]
    Decode(#[error(not(source))] String),
    /// A downloaded file could not be written to disk.
    #[display("could not write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::Storage | Self::Write(_))
    }

    /// Whether the failure happened while reading, encoding or persisting an
    /// accepted upload, as opposed to the upload being refused.
    pub fn is_encoding_failure(&self) -> bool {
        matches!(self, Self::Unreadable(_) | Self::SizeMismatch { .. } | Self::Storage | Self::Serialize | Self::DuplicateId(_))
    }
}
