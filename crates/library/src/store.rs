//! The persisted list of [`FileRecord`]s.

use crate::error::{ErrorKind, Result};
use crate::record::{FileRecord, timestamp_millis};
use exn::ResultExt;
use sharehub_storage::BackendHandle;
use std::collections::HashSet;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};
use tracing::instrument;

/// A snapshot of the record list, newest first.
pub type Records = Arc<Vec<FileRecord>>;

/// Owning handle over the record list and the slot it is persisted to.
///
/// Cloning is cheap; every clone sees the same list. Mutations are serialized
/// behind one lock that is held until the full list has been written back,
/// and the in-memory list only changes once that write succeeded.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    backend: BackendHandle,
    slot: String,
    records: watch::Sender<Records>,
    mutation: Mutex<()>,
}

impl Store {
    /// Open the store, reading whatever the slot currently holds.
    ///
    /// Never fails: a missing, unreadable or unparsable slot is logged and
    /// treated as an empty list.
    #[instrument(skip(backend), fields(backend = backend.name()))]
    pub async fn load(backend: BackendHandle, slot: &str) -> Self {
        let records = match backend.get(slot).await {
            Ok(Some(data)) => match serde_json::from_slice::<Vec<FileRecord>>(&data) {
                Ok(records) => dedupe(records),
                Err(error) => {
                    tracing::warn!(%error, "Stored file list is unreadable, starting empty");
                    Vec::new()
                },
            },
            Ok(None) => {
                tracing::debug!("Nothing stored yet");
                Vec::new()
            },
            Err(error) => {
                tracing::warn!(error = ?error, "Could not read stored file list, starting empty");
                Vec::new()
            },
        };
        tracing::info!(count = records.len(), "Loaded file list");
        Self {
            inner: Arc::new(Inner {
                backend,
                slot: slot.to_string(),
                records: watch::Sender::new(Arc::new(records)),
                mutation: Mutex::new(()),
            }),
        }
    }

    /// Current list, newest first.
    pub fn records(&self) -> Records {
        Arc::clone(&self.inner.records.borrow())
    }

    pub fn get(&self, id: &str) -> Option<FileRecord> {
        self.inner.records.borrow().iter().find(|record| record.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.borrow().is_empty()
    }

    /// Receiver that is marked changed after every successful mutation.
    pub fn subscribe(&self) -> watch::Receiver<Records> {
        self.inner.records.subscribe()
    }

    /// The millisecond timestamp of `at` as an id, moved forward to the next
    /// millisecond not used by any record in the current list.
    pub fn allocate_id(&self, at: OffsetDateTime) -> String {
        let records = self.records();
        let taken: HashSet<&str> = records.iter().map(|record| record.id.as_str()).collect();
        let mut candidate = timestamp_millis(at);
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    /// Prepend a record and persist the whole list.
    #[instrument(skip_all, fields(id = %record.id, name = %record.name))]
    pub async fn add_record(&self, record: FileRecord) -> Result<()> {
        let _guard = self.inner.mutation.lock().await;
        let current = self.records();
        if current.iter().any(|existing| existing.id == record.id) {
            exn::bail!(ErrorKind::DuplicateId(record.id));
        }
        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(record);
        next.extend(current.iter().cloned());
        self.persist(&next).await?;
        self.inner.records.send_replace(Arc::new(next));
        tracing::debug!("Record added");
        Ok(())
    }

    /// Remove the record with the given id and persist the remaining list.
    ///
    /// Returns `false`, without writing anything, when no record matches.
    #[instrument(skip(self))]
    pub async fn remove_record(&self, id: &str) -> Result<bool> {
        let _guard = self.inner.mutation.lock().await;
        let current = self.records();
        // The stored list already equals the in-memory one, so there is nothing to write.
        if !current.iter().any(|record| record.id == id) {
            tracing::debug!("No such record");
            return Ok(false);
        }
        let next: Vec<FileRecord> = current.iter().filter(|record| record.id != id).cloned().collect();
        self.persist(&next).await?;
        self.inner.records.send_replace(Arc::new(next));
        tracing::debug!("Record removed");
        Ok(true)
    }

    async fn persist(&self, records: &[FileRecord]) -> Result<()> {
        let data = serde_json::to_vec(records).or_raise(|| ErrorKind::Serialize)?;
        self.inner.backend.put(&self.inner.slot, &data).await.or_raise(|| ErrorKind::Storage)?;
        tracing::trace!(bytes = data.len(), "Persisted file list");
        Ok(())
    }
}

/// Keep the first record for every id.
fn dedupe(records: Vec<FileRecord>) -> Vec<FileRecord> {
    let mut seen = HashSet::new();
    let total = records.len();
    let unique: Vec<FileRecord> = records.into_iter().filter(|record| seen.insert(record.id.clone())).collect();
    if unique.len() != total {
        tracing::warn!(dropped = total - unique.len(), "Dropped records with duplicate ids");
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharehub_media::DataUrl;
    use sharehub_storage::backend::{MockBackend, StorageBackend};
    use time::macros::datetime;

    fn record(id: &str, name: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            size: 3,
            mime_type: "application/pdf".to_string(),
            uploaded_at: datetime!(2024-03-01 09:30 UTC),
            content: DataUrl::encode("application/pdf", b"pdf"),
        }
    }

    async fn empty() -> (Arc<MockBackend>, Store) {
        let backend = Arc::new(MockBackend::default());
        let store = Store::load(backend.clone(), "uploadedFiles").await;
        (backend, store)
    }

    #[tokio::test]
    async fn test_load_missing_slot_is_empty() {
        let (_, store) = empty().await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_garbage_is_empty() {
        let backend = Arc::new(MockBackend::with_values([("uploadedFiles", b"{not json".to_vec())]));
        let store = Store::load(backend, "uploadedFiles").await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_drops_duplicate_ids() {
        let stored = serde_json::to_vec(&[record("1", "a.pdf"), record("1", "b.pdf"), record("2", "c.pdf")]).unwrap();
        let backend = Arc::new(MockBackend::with_values([("uploadedFiles", stored)]));
        let store = Store::load(backend, "uploadedFiles").await;
        let names: Vec<_> = store.records().iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, ["a.pdf", "c.pdf"]);
    }

    #[tokio::test]
    async fn test_add_prepends_and_persists() {
        let (backend, store) = empty().await;
        store.add_record(record("1", "first.pdf")).await.unwrap();
        store.add_record(record("2", "second.pdf")).await.unwrap();

        let ids: Vec<_> = store.records().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, ["2", "1"]);
        assert_eq!(backend.writes(), 2);

        let reloaded = Store::load(backend.clone(), "uploadedFiles").await;
        assert_eq!(reloaded.records(), store.records());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_refused() {
        let (backend, store) = empty().await;
        store.add_record(record("1", "first.pdf")).await.unwrap();
        let err = store.add_record(record("1", "again.pdf")).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::DuplicateId("1".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(backend.writes(), 1);
    }

    #[tokio::test]
    async fn test_remove_keeps_order_of_others() {
        let (_, store) = empty().await;
        for id in ["1", "2", "3"] {
            store.add_record(record(id, &format!("{id}.pdf"))).await.unwrap();
        }
        assert!(store.remove_record("2").await.unwrap());
        let ids: Vec<_> = store.records().iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, ["3", "1"]);
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let (backend, store) = empty().await;
        store.add_record(record("1", "first.pdf")).await.unwrap();
        assert!(!store.remove_record("404").await.unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(backend.writes(), 1);
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_list_unchanged() {
        let (backend, store) = empty().await;
        store.add_record(record("1", "first.pdf")).await.unwrap();
        backend.fail_writes(true);

        let err = store.add_record(record("2", "second.pdf")).await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Storage);
        let err = store.remove_record("1").await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Storage);
        assert_eq!(store.len(), 1);

        let stored = backend.get("uploadedFiles").await.unwrap().unwrap();
        let stored: Vec<FileRecord> = serde_json::from_slice(&stored).unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_mutations() {
        let (_, store) = empty().await;
        let mut changes = store.subscribe();
        store.add_record(record("1", "first.pdf")).await.unwrap();
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().len(), 1);
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_allocate_id_skips_taken() {
        let (_, store) = empty().await;
        let at = datetime!(2024-01-05 10:00 UTC);
        assert_eq!(store.allocate_id(at), "1704448800000");
        store.add_record(record("1704448800000", "a.pdf")).await.unwrap();
        store.add_record(record("1704448800001", "b.pdf")).await.unwrap();
        assert_eq!(store.allocate_id(at), "1704448800002");
    }
}
