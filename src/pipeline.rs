//! End-to-end run: catalog, statistics, join, ratios, monthly rollup.

use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use crate::aggregate::aggregate_monthly;
use crate::api::VideoPlatform;
use crate::catalog::fetch_catalog;
use crate::correlation::{CorrelationMatrix, correlation_matrix};
use crate::error::UpstreamError;
use crate::join::join;
use crate::metrics::derive;
use crate::model::{DerivedRecord, MonthlyBucket};
use crate::stats::fetch_stats;

/// Everything the dashboard layer needs, produced once per run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub channel_id: String,
    pub videos: Vec<DerivedRecord>,
    pub monthly: Vec<MonthlyBucket>,
    pub correlation: CorrelationMatrix,
}

/// Channel-wide sums over every joined video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub videos: usize,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

impl PipelineReport {
    /// Distinct titles in catalog order, for a per-video picker.
    pub fn titles(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.videos
            .iter()
            .map(DerivedRecord::title)
            .filter(|title| seen.insert(*title))
            .collect()
    }

    /// First video carrying `title`. Titles are not unique on a channel, so
    /// the newest upload wins.
    pub fn video_by_title(&self, title: &str) -> Option<&DerivedRecord> {
        self.videos.iter().find(|video| video.title() == title)
    }

    pub fn totals(&self) -> Totals {
        self.videos.iter().fold(Totals::default(), |mut totals, video| {
            totals.videos += 1;
            totals.views += video.record.views;
            totals.likes += video.record.likes;
            totals.comments += video.record.comments;
            totals
        })
    }
}

/// Runs the whole pipeline for `channel_id`.
///
/// Stages run one after the other and every request is sequential. The first
/// upstream failure ends the run; nothing is retried here.
pub fn run<P: VideoPlatform + ?Sized>(
    platform: &P,
    channel_id: &str,
) -> Result<PipelineReport, UpstreamError> {
    let catalog = fetch_catalog(platform, channel_id)?;
    let ids: Vec<String> = catalog.iter().map(|video| video.id.clone()).collect();
    let stats = fetch_stats(platform, &ids)?;

    let joined = join(&catalog, &stats);
    let dropped = catalog.len() - joined.len();
    let videos = derive(&joined);
    let monthly = aggregate_monthly(&videos);
    let correlation = correlation_matrix(&videos);

    info!(
        channel_id,
        videos = videos.len(),
        dropped,
        months = monthly.len(),
        "pipeline finished"
    );

    Ok(PipelineReport {
        channel_id: channel_id.to_string(),
        videos,
        monthly,
        correlation,
    })
}
