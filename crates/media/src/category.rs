use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Coarse classification of a MIME type, used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    Image,
    Document,
    Archive,
    Other,
}
impl Category {
    pub fn of(mime: impl AsRef<str>) -> Self {
        let mime = mime.as_ref();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime == "application/pdf" {
            Self::Document
        } else if mime == "application/zip" {
            Self::Archive
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "document",
            Self::Archive => "archive",
            Self::Other => "other",
        }
    }

    /// Icon identifier understood by the renderers.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "file-text",
            Self::Archive => "archive",
            Self::Other => "file",
        }
    }
}
impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Filter-dropdown bucket of a MIME type.
///
/// Unlike [`Category`] this is derived from substrings of the type, so
/// `application/x-zip-compressed` lands in [`Zip`](Self::Zip) and
/// `image/svg+xml` in [`Image`](Self::Image).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterBucket {
    Image,
    Pdf,
    Zip,
    Other,
}
impl FilterBucket {
    pub const ALL: [FilterBucket; 4] = [Self::Image, Self::Pdf, Self::Zip, Self::Other];

    pub fn of(mime: impl AsRef<str>) -> Self {
        let mime = mime.as_ref();
        if mime.contains("image") {
            Self::Image
        } else if mime.contains("pdf") {
            Self::Pdf
        } else if mime.contains("zip") {
            Self::Zip
        } else {
            Self::Other
        }
    }

    /// Token matched against MIME types when the bucket is used as a filter.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Pdf => "pdf",
            Self::Zip => "zip",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "Images",
            Self::Pdf => "PDF",
            Self::Zip => "ZIP",
            Self::Other => "Other",
        }
    }
}
impl Display for FilterBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.token())
    }
}
impl FromStr for FilterBucket {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown file type bucket: {s}"))
    }
}

/// Short label shown on cards without a preview: the upper-cased subtype
/// (`application/pdf` becomes `PDF`), or `FILE` when there isn't one.
pub fn type_label(mime: impl AsRef<str>) -> String {
    match mime.as_ref().split('/').nth(1) {
        Some(subtype) if !subtype.is_empty() => subtype.to_uppercase(),
        _ => "FILE".to_string(),
    }
}
