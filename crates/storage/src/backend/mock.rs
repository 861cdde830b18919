//! In-memory storage backend for testing.

use super::KeyStream;
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::key::validate as validate_key;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Values are stored in a `HashMap` behind a [`RwLock`], so all trait methods
/// can operate on `&self` without external synchronisation. Writes can be
/// made to fail on demand to exercise error paths, and every successful
/// write is counted.
///
/// # Examples
///
/// ```
/// use sharehub_storage::backend::{MockBackend, StorageBackend};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_values([("uploadedFiles", b"[]")]);
/// assert!(backend.exists("uploadedFiles").await?);
///
/// backend.put("other", b"data").await?;
/// assert_eq!(backend.writes(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MockBackend {
    /// Create a mock backend pre-populated with values.
    ///
    /// Panics if any key fails validation. If test setup is wrong, then
    /// the test should not pass.
    pub fn with_values(values: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (key, data) in values {
            let key = key.into();
            let Ok(validated) = validate_key(&key) else {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_values: invalid key {key:?}");
            };
            map.insert(validated, data.into());
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Make every following `put`/`delete` fail with an I/O error until
    /// switched back off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `put` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::Io(std::io::Error::other("mock backend refuses writes")));
        }
        Ok(())
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let values: [(&str, &[u8]); 0] = [];
        Self::with_values(values)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn keys_stream(&self) -> KeyStream<'_> {
        Box::pin(stream! {
            // Snapshot the keys under the read lock, then drop it before
            // yielding to avoid holding the lock across yield points.
            let keys: Vec<String> = self.storage.read().await.keys().cloned().collect();
            for key in keys {
                yield Ok(key);
            }
        })
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let key = validate_key(key)?;
        Ok(self.storage.read().await.contains_key(&key))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = validate_key(key)?;
        Ok(self.storage.read().await.get(&key).cloned())
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let key = validate_key(key)?;
        self.check_writable()?;
        self.storage.write().await.insert(key, data.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = validate_key(key)?;
        self.check_writable()?;
        self.storage.write().await.remove(&key).map(|_| ()).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let backend = MockBackend::default();
        backend.put("slot", b"hello").await.unwrap();
        assert_eq!(backend.get("slot").await.unwrap(), Some(b"hello".to_vec()));
        assert_eq!(backend.writes(), 1);
    }

    #[tokio::test]
    async fn test_with_values() {
        let backend = MockBackend::with_values([("a", b"1".to_vec()), ("b", b"2".to_vec())]);
        assert!(backend.exists("a").await.unwrap());
        assert!(backend.exists("b").await.unwrap());
        assert!(!backend.exists("c").await.unwrap());
        let mut keys = backend.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = MockBackend::with_values([("slot", b"data".to_vec())]);
        backend.delete("slot").await.unwrap();
        assert!(!backend.exists("slot").await.unwrap());
        let err = backend.delete("slot").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let backend = MockBackend::with_values([("slot", b"old".to_vec())]);
        backend.fail_writes(true);
        let err = backend.put("slot", b"new").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(backend.get("slot").await.unwrap(), Some(b"old".to_vec()));
        backend.fail_writes(false);
        backend.put("slot", b"new").await.unwrap();
        assert_eq!(backend.get("slot").await.unwrap(), Some(b"new".to_vec()));
        assert_eq!(backend.writes(), 1);
    }

    #[tokio::test]
    async fn test_invalid_keys_rejected() {
        let backend = MockBackend::default();
        assert!(backend.get("../etc/passwd").await.is_err());
        assert!(backend.put("a/b", b"bad").await.is_err());
    }

    #[test]
    #[should_panic(expected = "invalid key")]
    fn test_with_values_panics_on_bad_key() {
        MockBackend::with_values([("../escape", b"bad".to_vec())]);
    }
}
