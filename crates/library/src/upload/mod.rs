//! The upload flow: validate a selection, encode it while showing simulated
//! progress, then hand the finished record to the [`Store`].

mod notice;
mod selection;
mod stream;

pub use self::notice::{FAILURE_MESSAGE, Notice, NoticeKind, SUCCESS_MESSAGE};
pub use self::selection::{Selection, Source};
use crate::error::{Error, ErrorKind, Result};
use crate::record::FileRecord;
use crate::store::Store;
use futures::{Stream, StreamExt};
use sharehub_config::UploadConfig;
use sharehub_media::Rejection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Events emitted by [`Uploader::upload`], in order:
///
/// 1. [`Validating`](Self::Validating), unless the upload was
///    [`Ignored`](Self::Ignored).
/// 2. Either [`Rejected`](Self::Rejected), ending the stream, or
///    [`Encoding`](Self::Encoding).
/// 3. Zero or more [`Progress`](Self::Progress) values, never decreasing.
///    `Progress(100)` only follows a successful encode.
/// 4. [`Completed`](Self::Completed) or [`Failed`](Self::Failed).
#[derive(Debug)]
pub enum UploadEvent {
    /// Another upload was in flight; this selection was dropped.
    Ignored,
    Validating,
    Rejected(Rejection),
    Encoding,
    Progress(u8),
    Completed(FileRecord),
    Failed(Error),
}

/// Cosmetic timings of the upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTimings {
    pub progress_tick: Duration,
    pub progress_step: u8,
    pub progress_cap: u8,
    pub completion_delay: Duration,
    pub success_notice: Duration,
}

impl UploadTimings {
    /// No waiting at all; progress jumps straight to 100.
    pub fn immediate() -> Self {
        Self {
            progress_tick: Duration::ZERO,
            completion_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

impl Default for UploadTimings {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

impl From<&UploadConfig> for UploadTimings {
    fn from(config: &UploadConfig) -> Self {
        Self {
            progress_tick: config.progress_tick(),
            progress_step: config.progress_step,
            progress_cap: config.progress_cap,
            completion_delay: config.completion_delay(),
            success_notice: config.success_notice(),
        }
    }
}

#[derive(Default)]
struct UploaderState {
    busy: AtomicBool,
    notice: Mutex<Option<Notice>>,
}

/// Accepts one upload at a time into a [`Store`].
///
/// Cloning is cheap and clones share the busy flag and the current notice.
#[derive(Clone)]
pub struct Uploader {
    store: Store,
    timings: UploadTimings,
    state: Arc<UploaderState>,
}

impl Uploader {
    pub fn new(store: Store, timings: UploadTimings) -> Self {
        Self {
            store,
            timings,
            state: Arc::default(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Whether an upload is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.state.busy.load(Ordering::SeqCst)
    }

    /// The notice currently on display, if any.
    pub fn notice(&self) -> Option<Notice> {
        let mut notice = self.notice_slot();
        if notice.as_ref().is_some_and(|n| n.is_expired(Instant::now())) {
            *notice = None;
        }
        notice.clone()
    }

    /// Clear the current notice.
    pub fn dismiss(&self) {
        *self.notice_slot() = None;
    }

    /// Upload a single selection.
    ///
    /// Nothing happens until the stream is polled. Dropping the stream early
    /// abandons the upload and frees the uploader for the next one.
    pub fn upload(&self, selection: Selection) -> impl Stream<Item = UploadEvent> + Send + use<> {
        self::stream::upload(self.clone(), selection)
    }

    /// Drag-and-drop entry point: only the first of several dropped files is
    /// uploaded.
    pub fn drop_files(&self, selections: Vec<Selection>) -> impl Stream<Item = UploadEvent> + Send + use<> {
        let mut selections = selections.into_iter();
        let first = selections.next();
        let ignored = selections.count();
        if ignored > 0 {
            tracing::debug!(ignored, "Only the first dropped file is uploaded");
        }
        let uploader = self.clone();
        futures::stream::iter(first).flat_map(move |selection| uploader.upload(selection))
    }

    /// Run an upload to the end and return its record.
    ///
    /// # Errors
    /// [`ErrorKind::Rejected`] and [`ErrorKind::Busy`] when no upload took
    /// place, otherwise the failure that ended it.
    pub async fn upload_and_wait(&self, selection: Selection) -> Result<FileRecord> {
        let mut events = std::pin::pin!(self.upload(selection));
        while let Some(event) = events.next().await {
            match event {
                UploadEvent::Completed(record) => return Ok(record),
                UploadEvent::Failed(err) => return Err(err),
                UploadEvent::Rejected(rejection) => exn::bail!(ErrorKind::Rejected(rejection)),
                UploadEvent::Ignored => exn::bail!(ErrorKind::Busy),
                UploadEvent::Validating | UploadEvent::Encoding | UploadEvent::Progress(_) => {},
            }
        }
        // The stream always ends on one of the terminal events above.
        exn::bail!(ErrorKind::Busy)
    }

    fn notice_slot(&self) -> MutexGuard<'_, Option<Notice>> {
        self.state.notice.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_notice(&self, notice: Option<Notice>) {
        *self.notice_slot() = notice;
    }

    /// Claim the busy flag; `None` if another upload holds it.
    fn try_begin(&self) -> Option<BusyGuard> {
        let claimed = self.state.busy.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok();
        claimed.then(|| BusyGuard(Arc::clone(&self.state)))
    }
}

/// Releases the busy flag when the upload ends or its stream is dropped.
struct BusyGuard(Arc<UploaderState>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.busy.store(false, Ordering::SeqCst);
    }
}
