use futures::StreamExt;
use sharehub_library::{Filter, Gallery, GalleryView, Selection, Store, UploadEvent, UploadTimings, Uploader};
use sharehub_media::FilterBucket;
use sharehub_storage::BackendHandle;
use sharehub_storage::backend::LocalBackend;
use std::sync::Arc;
use std::time::Duration;

const SLOT: &str = "uploadedFiles";

async fn open(root: &std::path::Path) -> (Store, Uploader, Gallery) {
    let backend: BackendHandle = Arc::new(LocalBackend::new("local", root).unwrap());
    let store = Store::load(backend, SLOT).await;
    let uploader = Uploader::new(store.clone(), UploadTimings::immediate());
    let gallery = Gallery::new(store.clone(), Duration::ZERO);
    (store, uploader, gallery)
}

#[tokio::test]
async fn upload_browse_delete_and_restart() {
    let storage = tempfile::tempdir().unwrap();
    let files = tempfile::tempdir().unwrap();
    let picked = files.path().join("Quarterly Report.pdf");
    tokio::fs::write(&picked, b"%PDF-1.7 quarterly numbers").await.unwrap();

    let (store, uploader, mut gallery) = open(storage.path()).await;
    assert_eq!(gallery.view(), GalleryView::Empty);

    let report = uploader.upload_and_wait(Selection::from_path(&picked).await.unwrap()).await.unwrap();
    let photo = uploader
        .upload_and_wait(Selection::from_bytes("beach.png", "image/png", b"\x89PNG\r\n\x1a\n".to_vec()))
        .await
        .unwrap();
    let notes = uploader.upload(Selection::from_bytes("notes.txt", "text/plain", "hello")).collect::<Vec<_>>().await;
    assert!(matches!(notes.last(), Some(UploadEvent::Rejected(_))));

    // Newest first.
    let ids: Vec<_> = store.records().iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, [photo.id.clone(), report.id.clone()]);

    gallery.set_filter(Filter::Bucket(FilterBucket::Pdf));
    assert_eq!(gallery.view().records(), std::slice::from_ref(&report));
    gallery.set_filter(Filter::All);
    gallery.set_search("nothing like this");
    assert!(matches!(gallery.view(), GalleryView::NoMatches { total: 2, can_clear_search: true }));
    gallery.clear_search();

    let downloads = tempfile::tempdir().unwrap();
    let path = gallery.download(&report.id, downloads.path()).await.unwrap();
    assert_eq!(path.file_name().unwrap(), "Quarterly Report.pdf");
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF-1.7 quarterly numbers");

    assert!(gallery.delete(&photo.id).await.unwrap());
    drop((store, uploader, gallery));

    // Simulated restart over the same directory.
    let (store, _, _) = open(storage.path()).await;
    let records = store.records();
    assert_eq!(records.len(), 1);
    let restored = &records[0];
    assert_eq!(restored.id, report.id);
    assert_eq!(restored.name, report.name);
    assert_eq!(restored.size, report.size);
    assert_eq!(restored.mime_type, "application/pdf");
    assert_eq!(restored.content, report.content);
}
