//! Self-contained `data:` URLs holding an uploaded file's bytes.

use crate::error::{ErrorKind, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use exn::{OptionExt, ResultExt};
use std::fmt::{Display, Formatter, Result as FmtResult};

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// A `data:<mime>;base64,<payload>` URL.
///
/// Holds everything needed to reconstruct the original file without any
/// other store, and can be used directly as an `href`/`src` in HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DataUrl(String);

/// The decoded parts of a [`DataUrl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Encodes bytes under the given MIME type.
    ///
    /// ```
    /// use sharehub_media::DataUrl;
    ///
    /// let url = DataUrl::encode("text/plain", b"hi");
    /// assert_eq!(url.as_str(), "data:text/plain;base64,aGk=");
    /// assert_eq!(url.decode().unwrap().bytes, b"hi");
    /// ```
    pub fn encode(mime_type: impl AsRef<str>, bytes: impl AsRef<[u8]>) -> Self {
        let mime_type = mime_type.as_ref();
        let payload = STANDARD.encode(bytes.as_ref());
        Self(format!("{SCHEME}{mime_type}{BASE64_MARKER},{payload}"))
    }

    /// Wraps a string that's expected to be a data URL, without checking it.
    /// Decoding is where malformed content surfaces.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type declared in the header, if the URL is well-formed enough to
    /// have one.
    pub fn mime_type(&self) -> Option<&str> {
        let (header, _) = self.0.strip_prefix(SCHEME)?.split_once(',')?;
        Some(header.split(';').next().unwrap_or_default())
    }

    /// Recovers the MIME type and original bytes.
    pub fn decode(&self) -> Result<Decoded> {
        let rest = self.0.strip_prefix(SCHEME).ok_or_raise(|| ErrorKind::NotDataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or_raise(|| ErrorKind::NotDataUrl)?;
        let mime_type = header.strip_suffix(BASE64_MARKER).ok_or_raise(|| ErrorKind::NotBase64)?;
        let bytes = STANDARD.decode(payload.trim()).or_raise(|| ErrorKind::InvalidData)?;
        Ok(Decoded {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

}
impl Display for DataUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}
impl AsRef<str> for DataUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
