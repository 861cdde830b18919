use super::{Notice, Selection, UploadEvent, Uploader};
use crate::error::{Error, Result};
use crate::record::FileRecord;
use async_stream::stream;
use futures::Stream;
use sharehub_media::{DataUrl, validate};
use time::OffsetDateTime;
use tokio::time::{Instant, MissedTickBehavior};

enum Step {
    Encoded(Result<DataUrl>),
    Tick,
}

pub(super) fn upload(uploader: Uploader, selection: Selection) -> impl Stream<Item = UploadEvent> + Send + use<> {
    stream!({
        let Some(_busy) = uploader.try_begin() else {
            tracing::info!(name = %selection.name(), "Upload already in progress, ignoring selection");
            yield UploadEvent::Ignored;
            return;
        };
        uploader.set_notice(None);

        yield UploadEvent::Validating;
        if let Err(rejection) = validate(&selection) {
            tracing::info!(name = %selection.name(), mime = selection.mime_type(), %rejection, "Selection rejected");
            uploader.set_notice(Some(Notice::error(rejection.to_string())));
            yield UploadEvent::Rejected(rejection);
            return;
        }

        tracing::debug!(name = %selection.name(), size = selection.size(), "Encoding selection");
        yield UploadEvent::Encoding;
        let timings = uploader.timings.clone();
        let mut encode = std::pin::pin!(selection.encode());
        let mut ticker = tokio::time::interval_at(
            Instant::now() + timings.progress_tick,
            timings.progress_tick.max(std::time::Duration::from_millis(1)),
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut progress = 0u8;
        let encoded = loop {
            let ticking = !timings.progress_tick.is_zero() && progress < timings.progress_cap;
            // `yield` is not allowed inside `select!`, so only pick the branch here.
            let step = tokio::select! {
                biased;
                result = &mut encode => Step::Encoded(result),
                _ = ticker.tick(), if ticking => Step::Tick,
            };
            match step {
                Step::Encoded(result) => break result,
                Step::Tick => {
                    progress = progress.saturating_add(timings.progress_step).min(timings.progress_cap);
                    yield UploadEvent::Progress(progress);
                },
            }
        };
        let content = match encoded {
            Ok(content) => content,
            Err(err) => {
                yield fail(&uploader, &selection, err);
                return;
            },
        };
        yield UploadEvent::Progress(100);

        if !timings.completion_delay.is_zero() {
            tokio::time::sleep(timings.completion_delay).await;
        }
        let uploaded_at = OffsetDateTime::now_utc();
        let record = FileRecord {
            id: uploader.store.allocate_id(uploaded_at),
            name: selection.name().to_string(),
            size: selection.size(),
            mime_type: selection.mime_type().to_string(),
            uploaded_at,
            content,
        };
        if let Err(err) = uploader.store.add_record(record.clone()).await {
            yield fail(&uploader, &selection, err);
            return;
        }
        tracing::info!(id = %record.id, name = %record.name, "Upload complete");
        uploader.set_notice(Some(Notice::success(timings.success_notice)));
        yield UploadEvent::Completed(record);
    })
}

fn fail(uploader: &Uploader, selection: &Selection, err: Error) -> UploadEvent {
    tracing::warn!(name = %selection.name(), error = ?err, "Upload failed");
    uploader.set_notice(Some(Notice::error(super::FAILURE_MESSAGE)));
    UploadEvent::Failed(err)
}
