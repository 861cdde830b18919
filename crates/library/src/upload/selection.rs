use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sharehub_media::mime::{self, MAGIC_BYTES_LEN};
use sharehub_media::{Candidate, DataUrl};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Where the bytes of a [`Selection`] come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A file picked for upload, before anything has been read from it beyond
/// what is needed to tell its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    name: String,
    size: u64,
    mime_type: String,
    source: Source,
}

impl Selection {
    /// Inspect a file on disk the way a file picker would: name and size from
    /// its metadata, type from its extension or leading bytes.
    ///
    /// Extensions outside [`ACCEPTED_EXTENSIONS`](sharehub_media::consts::ACCEPTED_EXTENSIONS)
    /// only produce a warning; the type check happens during validation.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unreadable = || ErrorKind::Unreadable(path.to_path_buf());
        let metadata = tokio::fs::metadata(path).await.or_raise(unreadable)?;
        if !metadata.is_file() {
            exn::bail!(unreadable());
        }
        let mut head = Vec::with_capacity(MAGIC_BYTES_LEN);
        let file = tokio::fs::File::open(path).await.or_raise(unreadable)?;
        file.take(MAGIC_BYTES_LEN as u64).read_to_end(&mut head).await.or_raise(unreadable)?;

        if !mime::is_accepted_extension(path) {
            tracing::warn!(path = %path.display(), "File extension is not one of the accepted types");
        }
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        Ok(Self {
            name,
            size: metadata.len(),
            mime_type: mime::detect(path, &head).to_string(),
            source: Source::Path(path.to_path_buf()),
        })
    }

    /// A selection whose bytes are already in memory.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            source: Source::Bytes(bytes),
        }
    }

    /// Replace the detected MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Read the selected bytes and turn them into a data URL.
    ///
    /// Fails if the source has changed size since it was selected.
    pub(crate) async fn encode(&self) -> Result<DataUrl> {
        let bytes = match &self.source {
            Source::Path(path) => {
                tokio::fs::read(path).await.or_raise(|| ErrorKind::Unreadable(path.clone()))?
            },
            Source::Bytes(bytes) => bytes.clone(),
        };
        let actual = bytes.len() as u64;
        if actual != self.size {
            exn::bail!(ErrorKind::SizeMismatch {
                expected: self.size,
                actual,
            });
        }
        Ok(DataUrl::encode(&self.mime_type, bytes))
    }
}

impl Candidate for Selection {
    fn size(&self) -> u64 {
        self.size
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }
}
