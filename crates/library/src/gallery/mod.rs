//! Browsing the uploaded files: search, type filter, delete and download.

mod view;

pub use self::view::{Filter, GalleryView, available_filters, matches};
use crate::error::{ErrorKind, Result};
use crate::store::Store;
use exn::{OptionExt, ResultExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::instrument;

/// View state over a [`Store`]: the current search and filter, and which
/// records are in the middle of being deleted.
#[derive(Clone)]
pub struct Gallery {
    store: Store,
    search: String,
    filter: Filter,
    delete_delay: Duration,
    removing: Arc<Mutex<HashSet<String>>>,
}

impl Gallery {
    pub fn new(store: Store, delete_delay: Duration) -> Self {
        Self {
            store,
            search: String::new(),
            filter: Filter::All,
            delete_delay,
            removing: Arc::default(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Recompute what to show from the store's current list.
    pub fn view(&self) -> GalleryView {
        GalleryView::build(&self.store.records(), &self.search, self.filter)
    }

    /// Filters worth offering for the current list.
    pub fn available_filters(&self) -> Vec<Filter> {
        available_filters(&self.store.records())
    }

    /// Whether the record is fading out ahead of its removal.
    pub fn is_removing(&self, id: &str) -> bool {
        self.removing_set().contains(id)
    }

    /// Delete a record after the removal transition has played.
    ///
    /// Returns `false` if no record had that id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.removing_set().insert(id.to_string());
        if !self.delete_delay.is_zero() {
            tokio::time::sleep(self.delete_delay).await;
        }
        let removed = self.store.remove_record(id).await;
        self.removing_set().remove(id);
        let removed = removed?;
        if removed {
            tracing::info!("File deleted");
        }
        Ok(removed)
    }

    /// Write a record's bytes into `dir` under its original name.
    ///
    /// Only the final component of the name is used. An existing file is
    /// never replaced; ` (1)`, ` (2)`... is appended to the stem instead.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub async fn download(&self, id: &str, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let record = self.store.get(id).ok_or_raise(|| ErrorKind::NotFound(id.to_string()))?;
        let decoded = record.content.decode().or_raise(|| ErrorKind::Decode(id.to_string()))?;
        let file_name = Path::new(&record.name)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| record.id.clone());
        let path = available_path(dir.as_ref(), &file_name).await;
        tokio::fs::write(&path, &decoded.bytes).await.or_raise(|| ErrorKind::Write(path.clone()))?;
        tracing::info!(path = %path.display(), bytes = decoded.bytes.len(), "File downloaded");
        Ok(path)
    }

    fn removing_set(&self) -> MutexGuard<'_, HashSet<String>> {
        self.removing.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn available_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !exists(&candidate).await {
        return candidate;
    }
    let name = Path::new(file_name);
    let stem = name.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let extension = name.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{stem} ({n}){extension}"));
        if !exists(&candidate).await {
            return candidate;
        }
        n += 1;
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
