//! MIME type detection for picked files.
//!
//! A browser hands over `File.type`; on the command line we have to work it
//! out ourselves. The extension is trusted first (that's what browsers do),
//! and the first few bytes are only consulted when the extension is unknown.

use crate::consts::{ACCEPTED_EXTENSIONS, OCTET_STREAM};
use std::path::Path;

/// How many leading bytes [`from_magic_bytes`] needs to recognise every
/// format it knows about.
pub const MAGIC_BYTES_LEN: usize = 8;

const EXTENSIONS: [(&str, &str); 14] = [
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("json", "application/json"),
    ("gz", "application/gzip"),
    ("mp4", "video/mp4"),
    ("mp3", "audio/mpeg"),
];

const SIGNATURES: [(&[u8], &str); 5] = [
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    // Empty archive.
    (b"PK\x05\x06", "application/zip"),
];

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase)
}

/// Whether the file picker would have offered this file. Only a hint.
pub fn is_accepted_extension(path: impl AsRef<Path>) -> bool {
    extension(path.as_ref()).is_some_and(|ext| ACCEPTED_EXTENSIONS.iter().any(|a| a.trim_start_matches('.') == ext))
}

/// MIME type implied by the file extension, case-insensitively.
pub fn from_extension(path: impl AsRef<Path>) -> Option<&'static str> {
    let ext = extension(path.as_ref())?;
    EXTENSIONS.iter().find(|(known, _)| *known == ext).map(|(_, mime)| *mime)
}

/// MIME type implied by the leading bytes of a file.
pub fn from_magic_bytes(head: &[u8]) -> Option<&'static str> {
    SIGNATURES.iter().find(|(signature, _)| head.starts_with(signature)).map(|(_, mime)| *mime)
}

/// Best guess at a MIME type, falling back to `application/octet-stream`.
///
/// ```
/// use sharehub_media::mime::detect;
///
/// assert_eq!(detect("holiday.JPG", b""), "image/jpeg");
/// assert_eq!(detect("scan", b"%PDF-1.7"), "application/pdf");
/// assert_eq!(detect("mystery.bin", b"\x00\x01"), "application/octet-stream");
/// ```
pub fn detect(path: impl AsRef<Path>, head: &[u8]) -> &'static str {
    let path = path.as_ref();
    if let Some(mime) = from_extension(path) {
        return mime;
    }
    match from_magic_bytes(head) {
        Some(mime) => {
            tracing::debug!(path = %path.display(), mime, "MIME type detected from file signature");
            mime
        },
        None => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.jpg", true)]
    #[case("photo.JPEG", true)]
    #[case("dir/scan.pdf", true)]
    #[case("bundle.zip", true)]
    #[case("icon.png", true)]
    #[case("notes.txt", false)]
    #[case("archive.tar.gz", false)]
    #[case("README", false)]
    fn test_accepted_extension(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_accepted_extension(path), expected);
    }

    #[rstest]
    #[case("a.jpg", Some("image/jpeg"))]
    #[case("a.Png", Some("image/png"))]
    #[case("a.txt", Some("text/plain"))]
    #[case("a.unknown", None)]
    #[case("noext", None)]
    fn test_from_extension(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(from_extension(path), expected);
    }

    #[rstest]
    #[case(b"\x89PNG\r\n\x1a\n\x00", Some("image/png"))]
    #[case(b"\xFF\xD8\xFF\xE0", Some("image/jpeg"))]
    #[case(b"%PDF-1.4", Some("application/pdf"))]
    #[case(b"PK\x03\x04\x14\x00", Some("application/zip"))]
    #[case(b"PK\x05\x06", Some("application/zip"))]
    #[case(b"GIF89a", None)]
    #[case(b"", None)]
    fn test_from_magic_bytes(#[case] head: &[u8], #[case] expected: Option<&str>) {
        assert_eq!(from_magic_bytes(head), expected);
    }

    #[test]
    fn test_extension_wins_over_signature() {
        // A PNG renamed to .txt is reported as text, like a browser would.
        assert_eq!(detect("renamed.txt", b"\x89PNG\r\n\x1a\n"), "text/plain");
    }

    #[test]
    fn test_signatures_fit_in_magic_len() {
        assert!(SIGNATURES.iter().all(|(sig, _)| sig.len() <= MAGIC_BYTES_LEN));
    }
}
