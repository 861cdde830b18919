use serde::{Deserialize, Serialize};
use sharehub_media::{Category, DataUrl, FilterBucket, format_relative_date, format_size, type_label};
use time::OffsetDateTime;

/// One uploaded file: its metadata plus the encoded content.
///
/// Serialized with camelCase keys. Lists written by the browser version of
/// the application used `type`, `uploadDate` and `url`, which are still
/// accepted when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(alias = "type")]
    pub mime_type: String,
    #[serde(alias = "uploadDate", with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
    #[serde(alias = "url")]
    pub content: DataUrl,
}

impl FileRecord {
    pub fn category(&self) -> Category {
        Category::of(&self.mime_type)
    }

    pub fn bucket(&self) -> FilterBucket {
        FilterBucket::of(&self.mime_type)
    }

    pub fn is_image(&self) -> bool {
        self.category() == Category::Image
    }

    /// Upper-cased subtype shown on cards without a preview.
    pub fn type_label(&self) -> String {
        type_label(&self.mime_type)
    }

    pub fn display_size(&self) -> String {
        format_size(self.size)
    }

    pub fn display_date(&self, now: OffsetDateTime) -> String {
        format_relative_date(self.uploaded_at, now)
    }
}

/// Milliseconds since the Unix epoch, the basis of record ids.
pub(crate) fn timestamp_millis(at: OffsetDateTime) -> i128 {
    at.unix_timestamp_nanos() / 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample() -> FileRecord {
        FileRecord {
            id: "1704448800000".to_string(),
            name: "holiday.png".to_string(),
            size: 2048,
            mime_type: "image/png".to_string(),
            uploaded_at: datetime!(2024-01-05 10:00 UTC),
            content: DataUrl::encode("image/png", b"\x89PNG"),
        }
    }

    #[test]
    fn test_serialized_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["mimeType"], "image/png");
        assert_eq!(json["uploadedAt"], "2024-01-05T10:00:00Z");
        assert_eq!(json["content"], "data:image/png;base64,iVBORw==");
        assert_eq!(json["size"], 2048);
    }

    #[test]
    fn test_legacy_keys_are_accepted() {
        let legacy = r#"[{
            "id": "1704448800000",
            "name": "holiday.png",
            "size": 2048,
            "type": "image/png",
            "uploadDate": "2024-01-05T10:00:00.000Z",
            "url": "data:image/png;base64,iVBORw=="
        }]"#;
        let records: Vec<FileRecord> = serde_json::from_str(legacy).unwrap();
        assert_eq!(records, vec![sample()]);
    }

    #[test]
    fn test_presentation_helpers() {
        let record = sample();
        assert!(record.is_image());
        assert_eq!(record.bucket(), FilterBucket::Image);
        assert_eq!(record.type_label(), "PNG");
        assert_eq!(record.display_size(), "2 KB");
        assert_eq!(record.display_date(datetime!(2024-01-05 12:00 UTC)), "today");
    }

    #[test]
    fn test_timestamp_millis() {
        assert_eq!(timestamp_millis(datetime!(2024-01-05 10:00 UTC)), 1_704_448_800_000);
    }
}
