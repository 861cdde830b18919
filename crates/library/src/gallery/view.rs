use crate::record::FileRecord;
use sharehub_media::FilterBucket;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// The type filter of the gallery: everything, or one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Bucket(FilterBucket),
}

impl Filter {
    pub fn token(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Bucket(bucket) => bucket.token(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All types",
            Self::Bucket(bucket) => bucket.label(),
        }
    }

    /// Buckets filter on a plain substring of the MIME type, so
    /// [`FilterBucket::Other`] only matches types that literally contain
    /// `other`.
    pub fn accepts(&self, mime_type: &str) -> bool {
        match self {
            Self::All => true,
            Self::Bucket(bucket) => mime_type.contains(bucket.token()),
        }
    }
}

impl From<FilterBucket> for Filter {
    fn from(bucket: FilterBucket) -> Self {
        Self::Bucket(bucket)
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.token())
    }
}

impl FromStr for Filter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<FilterBucket>().map(Self::Bucket)
    }
}

/// Whether a record passes the search and filter. The search is a
/// case-insensitive substring of the name; an empty search matches
/// everything.
pub fn matches(record: &FileRecord, search: &str, filter: Filter) -> bool {
    record.name.to_lowercase().contains(&search.to_lowercase()) && filter.accepts(&record.mime_type)
}

/// What the gallery should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryView {
    /// Nothing has been uploaded yet.
    Empty,
    /// There are files, but none pass the current search and filter.
    NoMatches { total: usize, can_clear_search: bool },
    /// Matching records, newest first, out of `total`.
    Results { records: Vec<FileRecord>, total: usize },
}

impl GalleryView {
    pub(crate) fn build(all: &[FileRecord], search: &str, filter: Filter) -> Self {
        if all.is_empty() {
            return Self::Empty;
        }
        let records: Vec<FileRecord> = all.iter().filter(|record| matches(record, search, filter)).cloned().collect();
        if records.is_empty() {
            Self::NoMatches {
                total: all.len(),
                can_clear_search: !search.is_empty(),
            }
        } else {
            Self::Results {
                records,
                total: all.len(),
            }
        }
    }

    pub fn total(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::NoMatches { total, .. } | Self::Results { total, .. } => *total,
        }
    }

    pub fn records(&self) -> &[FileRecord] {
        match self {
            Self::Results { records, .. } => records,
            Self::Empty | Self::NoMatches { .. } => &[],
        }
    }

    /// "showing N of M files"
    pub fn summary(&self) -> String {
        format!("showing {} of {} files", self.records().len(), self.total())
    }
}

/// `all` followed by every bucket present in `records`, in first-seen order.
pub fn available_filters(records: &[FileRecord]) -> Vec<Filter> {
    let mut filters = vec![Filter::All];
    for record in records {
        let filter = Filter::Bucket(record.bucket());
        if !filters.contains(&filter) {
            filters.push(filter);
        }
    }
    filters
}
