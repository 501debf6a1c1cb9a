//! Batched retrieval of per-video engagement counters.

use tracing::info;

use crate::api::{Counter, MAX_IDS_PER_REQUEST, VIDEOS_ENDPOINT, VideoItem, VideoPlatform};
use crate::error::UpstreamError;
use crate::model::StatsRecord;

/// Fetches statistics for `ids` in consecutive batches of at most
/// [`MAX_IDS_PER_REQUEST`].
///
/// The platform silently leaves out ids it no longer serves (deleted or
/// private videos), and may reorder the rest, so the result is neither
/// complete nor aligned with `ids`.
pub fn fetch_stats<P: VideoPlatform + ?Sized>(
    platform: &P,
    ids: &[String],
) -> Result<Vec<StatsRecord>, UpstreamError> {
    let mut records = Vec::with_capacity(ids.len());
    let mut batches = 0usize;

    for batch in ids.chunks(MAX_IDS_PER_REQUEST) {
        batches += 1;
        let items = platform.video_statistics(batch)?;
        info!(
            batch = batches,
            requested = batch.len(),
            returned = items.len(),
            "fetched statistics batch"
        );
        for item in items {
            records.push(stats_record(item)?);
        }
    }

    info!(
        batches,
        requested = ids.len(),
        returned = records.len(),
        "fetched video statistics"
    );
    Ok(records)
}

fn stats_record(item: VideoItem) -> Result<StatsRecord, UpstreamError> {
    let id = item.id;
    let views = counter(&id, "viewCount", item.statistics.view_count.as_ref())?;
    let likes = counter(&id, "likeCount", item.statistics.like_count.as_ref())?;
    let comments = counter(&id, "commentCount", item.statistics.comment_count.as_ref())?;
    let duration = item
        .content_details
        .and_then(|details| details.duration)
        .ok_or_else(|| {
            UpstreamError::malformed(VIDEOS_ENDPOINT, format!("video {id} has no duration"))
        })?;

    Ok(StatsRecord {
        id,
        views,
        likes,
        comments,
        duration,
    })
}

/// Absent counters are zero; present but unreadable ones are an error.
fn counter(id: &str, field: &str, value: Option<&Counter>) -> Result<u64, UpstreamError> {
    match value {
        None => Ok(0),
        Some(counter) => counter.value().ok_or_else(|| {
            UpstreamError::malformed(
                VIDEOS_ENDPOINT,
                format!("video {id} has non-numeric {field} {counter:?}"),
            )
        }),
    }
}
