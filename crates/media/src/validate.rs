//! Acceptance rules for candidate uploads.

use crate::consts::{ALLOWED_MIME_TYPES, MAX_UPLOAD_BYTES};
use derive_more::{Display, Error};

/// Anything that can be checked before an upload begins: only the declared
/// size and MIME type matter, the bytes are never inspected.
pub trait Candidate {
    fn size(&self) -> u64;
    fn mime_type(&self) -> &str;
}

impl<C: Candidate + ?Sized> Candidate for &C {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn mime_type(&self) -> &str {
        (**self).mime_type()
    }
}

/// Reason a candidate was refused. The display string is the message shown
/// to the user.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[display("file exceeds 50MB, choose a smaller file.")]
    TooLarge,
    #[display("unsupported file type; use JPG, PNG, PDF, or ZIP.")]
    UnsupportedType,
}

/// Checks a candidate against the upload rules. The size rule wins over the
/// type rule when both are broken.
///
/// ```
/// use sharehub_media::{Rejection, validate};
///
/// struct Picked(u64, &'static str);
/// impl sharehub_media::Candidate for Picked {
///     fn size(&self) -> u64 { self.0 }
///     fn mime_type(&self) -> &str { self.1 }
/// }
///
/// assert!(validate(&Picked(1024, "image/png")).is_ok());
/// assert_eq!(validate(&Picked(1024, "text/plain")), Err(Rejection::UnsupportedType));
/// assert_eq!(validate(&Picked(u64::MAX, "text/plain")), Err(Rejection::TooLarge));
/// ```
pub fn validate(candidate: &impl Candidate) -> Result<(), Rejection> {
    if candidate.size() > MAX_UPLOAD_BYTES {
        return Err(Rejection::TooLarge);
    }
    if !ALLOWED_MIME_TYPES.contains(&candidate.mime_type()) {
        return Err(Rejection::UnsupportedType);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Picked {
        size: u64,
        mime: &'static str,
    }
    impl Candidate for Picked {
        fn size(&self) -> u64 {
            self.size
        }

        fn mime_type(&self) -> &str {
            self.mime
        }
    }

    fn picked(size: u64, mime: &'static str) -> Picked {
        Picked { size, mime }
    }

    #[rstest]
    #[case("image/jpeg")]
    #[case("image/jpg")]
    #[case("image/png")]
    #[case("application/pdf")]
    #[case("application/zip")]
    #[case("text/plain")]
    #[case("")]
    fn oversized_is_rejected_regardless_of_type(#[case] mime: &'static str) {
        assert_eq!(validate(&picked(MAX_UPLOAD_BYTES + 1, mime)), Err(Rejection::TooLarge));
        assert_eq!(validate(&picked(u64::MAX, mime)), Err(Rejection::TooLarge));
    }

    #[rstest]
    #[case("text/plain")]
    #[case("image/gif")]
    #[case("image/svg+xml")]
    #[case("application/x-zip-compressed")]
    #[case("IMAGE/PNG")]
    #[case("")]
    fn unknown_type_is_rejected(#[case] mime: &'static str) {
        assert_eq!(validate(&picked(0, mime)), Err(Rejection::UnsupportedType));
        assert_eq!(validate(&picked(MAX_UPLOAD_BYTES, mime)), Err(Rejection::UnsupportedType));
    }

    #[rstest]
    #[case(0, "image/jpeg")]
    #[case(1, "image/jpg")]
    #[case(1536, "image/png")]
    #[case(MAX_UPLOAD_BYTES - 1, "application/pdf")]
    #[case(MAX_UPLOAD_BYTES, "application/zip")]
    fn allowed_type_within_limit_is_accepted(#[case] size: u64, #[case] mime: &'static str) {
        assert_eq!(validate(&picked(size, mime)), Ok(()));
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(Rejection::TooLarge.to_string(), "file exceeds 50MB, choose a smaller file.");
        assert_eq!(Rejection::UnsupportedType.to_string(), "unsupported file type; use JPG, PNG, PDF, or ZIP.");
    }
}
