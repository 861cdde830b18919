use crate::cli::{Cli, Command, Query};
use crate::report;
use futures::StreamExt;
use serde_json::json;
use sharehub_config::Config;
use sharehub_library::{FileRecord, Gallery, GalleryView, Selection, Store, UploadEvent, UploadTimings, Uploader};
use sharehub_render::Renderer;
use sharehub_storage::BackendHandle;
use sharehub_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Everything a command needs, wired from configuration.
struct App {
    store: Store,
    config: Config,
}

impl App {
    async fn open(config: Config, dry_run: bool) -> miette::Result<Self> {
        let root = config.storage.resolved_path().map_err(report)?;
        let local = LocalBackend::new("local", &root).map_err(report)?;
        let backend: BackendHandle = if dry_run {
            tracing::info!("Dry run: changes will not be saved");
            Arc::new(ReadOnlyBackend::new(Arc::new(local)))
        } else {
            Arc::new(local)
        };
        tracing::debug!(root = %root.display(), slot = %config.storage.slot, "Opening store");
        let store = Store::load(backend, &config.storage.slot).await;
        Ok(Self { store, config })
    }

    fn uploader(&self) -> Uploader {
        Uploader::new(self.store.clone(), UploadTimings::from(&self.config.upload))
    }

    fn gallery(&self, query: Option<&Query>) -> Gallery {
        let mut gallery = Gallery::new(self.store.clone(), self.config.gallery.delete_delay());
        if let Some(query) = query {
            gallery.set_search(query.search.clone());
            gallery.set_filter(query.filter);
        }
        gallery
    }
}

pub(crate) async fn run(cli: Cli, config: Config) -> miette::Result<()> {
    let app = App::open(config, cli.dry_run).await?;
    match cli.command {
        Command::Upload { files, mime } => upload(&app, &files, mime.as_deref()).await,
        Command::List { query, json } => list(&app, &query, json),
        Command::Delete { ids } => delete(&app, &ids).await,
        Command::Download { id, output } => download(&app, &id, &output).await,
        Command::Render { output, query, title } => render(&app, &query, title, output.as_deref()).await,
        Command::Filters => filters(&app),
    }
}

async fn upload(app: &App, files: &[PathBuf], mime: Option<&str>) -> miette::Result<()> {
    let uploader = app.uploader();
    let interactive = std::io::stderr().is_terminal();
    let mut failed = 0usize;
    for path in files {
        let selection = match Selection::from_path(path).await {
            Ok(selection) => selection,
            Err(err) => {
                eprintln!("✗ {}: {}", path.display(), &*err);
                failed += 1;
                continue;
            },
        };
        let selection = match mime {
            Some(mime) => selection.with_mime_type(mime),
            None => selection,
        };
        let name = selection.name().to_string();
        let mut events = std::pin::pin!(uploader.upload(selection));
        while let Some(event) = events.next().await {
            match event {
                UploadEvent::Progress(percent) if interactive => {
                    eprint!("\r{name}: {percent:>3}%");
                    let _ = std::io::stderr().flush();
                },
                UploadEvent::Completed(record) => {
                    if interactive {
                        eprintln!();
                    }
                    println!("✓ {} ({}, {}) id {}", record.name, record.display_size(), record.mime_type, record.id);
                },
                UploadEvent::Rejected(_) | UploadEvent::Failed(_) | UploadEvent::Ignored => {
                    if interactive {
                        eprintln!();
                    }
                    let message = uploader.notice().map(|notice| notice.message).unwrap_or_default();
                    eprintln!("✗ {name}: {message}");
                    if let UploadEvent::Failed(err) = event {
                        tracing::debug!(error = ?err, "Upload failure detail");
                    }
                    failed += 1;
                },
                UploadEvent::Validating | UploadEvent::Encoding | UploadEvent::Progress(_) => {},
            }
        }
    }
    if failed > 0 {
        miette::bail!("{failed} of {} uploads failed", files.len());
    }
    Ok(())
}

fn list(app: &App, query: &Query, as_json: bool) -> miette::Result<()> {
    let view = app.gallery(Some(query)).view();
    if as_json {
        let files: Vec<_> = view.records().iter().map(summary_json).collect();
        let output = json!({ "total": view.total(), "files": files });
        println!("{}", serde_json::to_string_pretty(&output).map_err(|e| miette::miette!("{e}"))?);
        return Ok(());
    }
    let now = OffsetDateTime::now_utc();
    match &view {
        GalleryView::Empty => {
            println!("No files yet. Start by uploading your first file!");
        },
        GalleryView::NoMatches { can_clear_search, .. } => {
            println!("No files found. Try a different search term or file type filter.");
            if *can_clear_search {
                println!("(run without --search to see every file)");
            }
            println!("{}", view.summary());
        },
        GalleryView::Results { records, .. } => {
            println!("{:<15} {:>10} {:<12} {:<16} NAME", "ID", "SIZE", "UPLOADED", "TYPE");
            for record in records {
                println!(
                    "{:<15} {:>10} {:<12} {:<16} {}",
                    record.id,
                    record.display_size(),
                    record.display_date(now),
                    record.mime_type,
                    record.name
                );
            }
            println!("{}", view.summary());
        },
    }
    Ok(())
}

fn summary_json(record: &FileRecord) -> serde_json::Value {
    json!({
        "id": record.id,
        "name": record.name,
        "size": record.size,
        "mimeType": record.mime_type,
        "uploadedAt": record.uploaded_at.format(&Rfc3339).ok(),
        "category": record.category().as_str(),
    })
}

async fn delete(app: &App, ids: &[String]) -> miette::Result<()> {
    let gallery = app.gallery(None);
    for id in ids {
        let name = gallery.store().get(id).map(|record| record.name);
        if gallery.delete(id).await.map_err(report)? {
            println!("deleted {} ({id})", name.unwrap_or_default());
        } else {
            eprintln!("no file with id {id}");
        }
    }
    Ok(())
}

async fn download(app: &App, id: &str, output: &Path) -> miette::Result<()> {
    let path = app.gallery(None).download(id, output).await.map_err(report)?;
    println!("{}", path.display());
    Ok(())
}

async fn render(app: &App, query: &Query, title: Option<String>, output: Option<&Path>) -> miette::Result<()> {
    let mut renderer = Renderer::new().map_err(report)?;
    if let Some(title) = title {
        renderer = renderer.with_title(title);
    }
    let html = renderer.render(&app.gallery(Some(query)), OffsetDateTime::now_utc()).map_err(report)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, html.as_bytes())
                .await
                .map_err(|e| miette::miette!("could not write {}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), "Gallery page written");
        },
        None => print!("{html}"),
    }
    Ok(())
}

fn filters(app: &App) -> miette::Result<()> {
    for filter in app.gallery(None).available_filters() {
        println!("{:<6} {}", filter.token(), filter.label());
    }
    Ok(())
}
