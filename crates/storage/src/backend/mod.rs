//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, a unified key-value
//! interface over whatever holds persisted state (a directory on disk, an
//! in-memory map for tests, ...). It mirrors a browser's local storage: a
//! flat namespace of keys, each holding one opaque value that's always read
//! and written whole.

mod local;
#[cfg(feature = "mock")]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;

pub(crate) type KeyStream<'a> = Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>>;

/// Unified interface for key-value storage backends.
///
/// All operations are asynchronous and operate on `&self`; implementations
/// handle their own synchronisation. Every key is validated with
/// [`validate_key`](crate::validate_key) before use.
///
/// # Examples
///
/// ```
/// use sharehub_storage::{backend::StorageBackend, error::Result};
///
/// async fn size_of_slot(backend: &dyn StorageBackend) -> Result<u64> {
///     Ok(match backend.get("uploadedFiles").await? {
///         Some(data) => data.len() as u64,
///         None => 0,
///     })
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// List every stored key.
    ///
    /// Default implementation collects [`keys_stream()`](Self::keys_stream)
    /// into a [`Vec`]. Order is unspecified.
    async fn keys(&self) -> Result<Vec<String>> {
        self.keys_stream().try_collect().await
    }

    /// Stream every stored key as it is discovered.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// # use sharehub_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.keys_stream();
    /// while let Some(key) = stream.try_next().await? {
    ///     println!("{key}");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn keys_stream(&self) -> KeyStream<'_>;

    /// Check if a value is stored under the key.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Read the value stored under the key.
    ///
    /// A missing key is `Ok(None)`, not an error: an empty slot is the
    /// normal state before the first write.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the value stored under the key.
    ///
    /// # Notes
    /// - Readers must never observe a partially written value; the previous
    ///   value stays visible until the new one is complete.
    async fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Remove the value stored under the key.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if nothing
    /// is stored under it.
    async fn delete(&self, key: &str) -> Result<()>;
}
