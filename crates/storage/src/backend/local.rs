//! Local filesystem storage backend.
//!
//! Every key is a file directly inside a configured directory, accessed via
//! `tokio::fs` for async I/O.

use crate::backend::KeyStream;
use crate::error::{ErrorKind, Result};
use crate::{StorageBackend, key::validate as validate_key};
use async_stream::stream;
use async_trait::async_trait;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage backend.
///
/// Stores each key as a file in a directory on the local filesystem. Writes
/// land in a hidden sibling file first and are renamed over the old value,
/// so a crash mid-write leaves the previous value intact.
///
/// # Examples
///
/// ```no_run
/// use sharehub_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local", "/home/me/.local/share/sharehub")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
    /// Directory holding one file per key
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend, creating the root directory if
    /// it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute or is not a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidRoot(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidRoot(root));
            }
        } else {
            // Use non-async here; it'll only happen once on start-up and
            // it's not worth the hassle of making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root, ""))?;
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<(String, PathBuf)> {
        let key = validate_key(key)?;
        let path = self.root.join(&key);
        Ok((key, path))
    }

    fn staging_path(&self, key: &str) -> PathBuf {
        self.root.join(format!(".{key}.tmp"))
    }

    fn map_io_error(e: std::io::Error, path: &Path, key: &str) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(key.to_string()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn keys_stream(&self) -> KeyStream<'_> {
        Box::pin(stream! {
            let entries = match fs::read_dir(&self.root).await {
                Ok(entries) => Some(entries),
                // Somebody removed the directory from under us: nothing stored.
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                Err(err) => {
                    yield Err(exn::Exn::from(Self::map_io_error(err, &self.root, "")));
                    None
                },
            };
            if let Some(mut entries) = entries {
                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(err) => {
                            yield Err(exn::Exn::from(Self::map_io_error(err, &self.root, "")));
                            continue 'entries;
                        },
                    };
                    let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                        continue 'entries;
                    };
                    // Staging files and anything else that could never be a key.
                    if validate_key(&name).is_err() {
                        continue 'entries;
                    }
                    match entry.file_type().await {
                        Ok(kind) if kind.is_file() => yield Ok(name),
                        Ok(_) => {},
                        Err(err) => yield Err(exn::Exn::from(Self::map_io_error(err, &entry.path(), &name))),
                    }
                }
            }
        })
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let (_, path) = self.key_path(key)?;
        Ok(fs::try_exists(&path).await.map_err(ErrorKind::Io)?)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let (key, path) = self.key_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::map_io_error(e, &path, &key).into()),
        }
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let (key, path) = self.key_path(key)?;
        let staging = self.staging_path(&key);
        fs::write(&staging, data).await.map_err(|e| Self::map_io_error(e, &staging, &key))?;
        if let Err(e) = fs::rename(&staging, &path).await {
            // Don't leave the half-finished write lying around.
            let _ = fs::remove_file(&staging).await;
            exn::bail!(Self::map_io_error(e, &path, &key));
        }
        tracing::trace!(backend = %self.name, key = %key, bytes = data.len(), "Value written");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let (key, path) = self.key_path(key)?;
        Ok(fs::remove_file(&path).await.map_err(|e| Self::map_io_error(e, &path, &key))?)
    }
}
