//! Renders a [`Gallery`] to one self-contained HTML page.
//!
//! The stylesheet is inlined and every download link is the record's own
//! data URL, so the page can be opened straight from disk or mailed around.

mod assets;
pub mod error;

use crate::assets::Builtins;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use sharehub_library::{Filter, FileRecord, Gallery, GalleryView};
use time::OffsetDateTime;
use tracing::instrument;
use upon::{Engine, Template};

const TEMPLATE: &str = "templates/gallery.html";
const STYLESHEET: &str = "styles/gallery.css";
const DEFAULT_TITLE: &str = "Shared files";

#[derive(Serialize)]
struct Page<'a> {
    title: &'a str,
    stylesheet: &'a str,
    total: usize,
    single: bool,
    empty: bool,
    no_matches: bool,
    can_clear_search: bool,
    has_search: bool,
    search: &'a str,
    summary: String,
    filters: Vec<FilterOption>,
    cards: Vec<Card>,
}

#[derive(Serialize)]
struct FilterOption {
    label: &'static str,
    active: bool,
}

#[derive(Serialize)]
struct Card {
    id: String,
    name: String,
    /// Empty unless the content is a `data:` URL.
    href: String,
    linked: bool,
    is_image: bool,
    icon: &'static str,
    type_label: String,
    size: String,
    date: String,
}
impl Card {
    fn new(record: &FileRecord, now: OffsetDateTime) -> Self {
        // Stored slots can be edited by hand, so anything else is never linked.
        let linked = record.content.mime_type().is_some();
        if !linked {
            tracing::warn!(id = %record.id, "Stored content is not a data URL, rendering without a link");
        }
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            href: if linked { record.content.to_string() } else { String::new() },
            linked,
            is_image: linked && record.is_image(),
            icon: record.category().icon(),
            type_label: record.type_label(),
            size: record.display_size(),
            date: record.display_date(now),
        }
    }
}

/// Compiled gallery page template plus the stylesheet it inlines.
pub struct Renderer {
    engine: Engine<'static>,
    template: Template<'static>,
    stylesheet: String,
    title: String,
}

impl Renderer {
    /// Compiles the embedded template. Fails only if the embedded assets are
    /// broken.
    pub fn new() -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let source = Builtins::load_str(TEMPLATE)?;
        let template = engine.compile(source).or_raise(|| ErrorKind::Template)?;
        Ok(Self {
            engine,
            template,
            stylesheet: Builtins::load_str(STYLESHEET)?,
            title: DEFAULT_TITLE.to_string(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Render what the gallery currently shows. Dates are relative to `now`.
    #[instrument(skip_all, fields(search = gallery.search(), filter = %gallery.filter()))]
    pub fn render(&self, gallery: &Gallery, now: OffsetDateTime) -> Result<String> {
        let view = gallery.view();
        let active = gallery.filter();
        let mut filters: Vec<FilterOption> = gallery
            .available_filters()
            .into_iter()
            .map(|filter| FilterOption {
                label: filter.label(),
                active: filter == active,
            })
            .collect();
        // A filter picked from the command line may not match any stored file.
        if active != Filter::All && !filters.iter().any(|option| option.active) {
            filters.push(FilterOption {
                label: active.label(),
                active: true,
            });
        }
        let page = Page {
            title: &self.title,
            stylesheet: &self.stylesheet,
            total: view.total(),
            single: view.total() == 1,
            empty: matches!(view, GalleryView::Empty),
            no_matches: matches!(view, GalleryView::NoMatches { .. }),
            can_clear_search: matches!(view, GalleryView::NoMatches { can_clear_search: true, .. }),
            has_search: !gallery.search().is_empty(),
            search: gallery.search(),
            summary: view.summary(),
            filters,
            cards: view.records().iter().map(|record| Card::new(record, now)).collect(),
        };
        let html = self.template.render(&self.engine, &page).to_string().or_raise(|| ErrorKind::Template)?;
        tracing::debug!(cards = page.cards.len(), bytes = html.len(), "Rendered gallery page");
        Ok(html)
    }
}

/// Custom [`upon`] formatters for HTML output.
mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    pub(crate) fn escape_html(s: &str) -> String {
        let mut escaped = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                c => escaped.push(c),
            }
        }
        escaped
    }

    /// Escapes strings for use in element content and quoted attributes.
    fn escape_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", escape_html(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Writes strings untouched; only for trusted embedded content.
    fn raw_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{s}")?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("escape", escape_formatter);
        engine.add_formatter("raw", raw_formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sharehub_library::Store;
    use sharehub_media::{DataUrl, FilterBucket};
    use sharehub_storage::backend::MockBackend;
    use std::sync::Arc;
    use std::time::Duration;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-01-10 12:00 UTC);

    fn record(id: &str, name: &str, mime_type: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            size: 1536,
            mime_type: mime_type.to_string(),
            uploaded_at: datetime!(2024-01-10 09:00 UTC),
            content: DataUrl::encode(mime_type, b"bytes"),
        }
    }

    async fn gallery(records: Vec<FileRecord>) -> Gallery {
        let store = Store::load(Arc::new(MockBackend::default()), "uploadedFiles").await;
        for record in records.into_iter().rev() {
            store.add_record(record).await.unwrap();
        }
        Gallery::new(store, Duration::ZERO)
    }

    #[rstest]
    #[case("a&b", "a&amp;b")]
    #[case("<script>", "&lt;script&gt;")]
    #[case(r#""quoted" 'single'"#, "&quot;quoted&quot; &#39;single&#39;")]
    #[case("plain.png", "plain.png")]
    fn test_escape_html(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(addons::escape_html(input), expected);
    }

    #[tokio::test]
    async fn test_empty_page() {
        let html = Renderer::new().unwrap().render(&gallery(Vec::new()).await, NOW).unwrap();
        assert!(html.contains("No files yet"));
        assert!(html.contains("0 files stored"));
        assert!(!html.contains("<article"));
    }

    #[tokio::test]
    async fn test_cards() {
        let gallery = gallery(vec![record("2", "photo.png", "image/png"), record("1", "report.pdf", "application/pdf")]).await;
        let html = Renderer::new().unwrap().with_title("Team files").render(&gallery, NOW).unwrap();

        assert!(html.contains("<title>Team files</title>"));
        assert!(html.contains("2 files stored"));
        assert!(html.contains("showing 2 of 2 files"));
        assert!(html.contains(r#"<img src="data:image/png;base64,Ynl0ZXM=" alt="photo.png">"#));
        assert!(html.contains(r#"href="data:application/pdf;base64,Ynl0ZXM=" download="report.pdf""#));
        assert!(html.contains("icon-file-text"));
        assert!(html.contains(r#"<span class="type-label">PDF</span>"#));
        assert!(html.contains("1.5 KB"));
        assert!(html.contains("today"));
        assert!(html.contains(".download {"));
    }

    #[tokio::test]
    async fn test_names_are_escaped() {
        let gallery = gallery(vec![record("1", "<b>bold</b>.pdf", "application/pdf")]).await;
        let html = Renderer::new().unwrap().render(&gallery, NOW).unwrap();
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;.pdf"));
        assert!(!html.contains("<b>bold</b>"));
    }

    #[tokio::test]
    async fn test_no_matches() {
        let mut gallery = gallery(vec![record("1", "report.pdf", "application/pdf")]).await;
        gallery.set_search("holiday");
        let html = Renderer::new().unwrap().render(&gallery, NOW).unwrap();
        assert!(html.contains("No files found"));
        assert!(html.contains("Clear the search"));
        assert!(html.contains("<strong>holiday</strong>"));

        gallery.clear_search();
        gallery.set_filter(Filter::Bucket(FilterBucket::Image));
        let html = Renderer::new().unwrap().render(&gallery, NOW).unwrap();
        assert!(html.contains("No files found"));
        assert!(!html.contains("Clear the search"));
        assert!(html.contains(r#"<li class="active">Images</li>"#));
    }

    #[rstest]
    #[case("report.pdf", "application/pdf")]
    #[case("photo.png", "image/png")]
    #[tokio::test]
    async fn test_foreign_content_is_not_linked(#[case] name: &str, #[case] mime_type: &str) {
        let mut tampered = record("1", name, mime_type);
        tampered.content = DataUrl::from_raw("javascript:alert(document.cookie)");
        let html = Renderer::new().unwrap().render(&gallery(vec![tampered]).await, NOW).unwrap();

        assert!(html.contains(name));
        assert!(!html.contains("javascript:"));
        assert!(!html.contains(r#"class="download""#));
        assert!(!html.contains("<img"));
        assert!(html.contains(r#"<span class="unavailable">Content unavailable</span>"#));
    }
}
