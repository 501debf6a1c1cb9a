//! Inner join of the catalog with the statistics on video id.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::{JoinedRecord, StatsRecord, VideoRecord};

/// Joins catalog entries with their statistics.
///
/// Only ids present on both sides survive; a video that vanished between the
/// two fetches simply drops out. Output follows catalog order. If an id
/// repeats on either side, its first occurrence wins.
pub fn join(videos: &[VideoRecord], stats: &[StatsRecord]) -> Vec<JoinedRecord> {
    let mut by_id: HashMap<&str, &StatsRecord> = HashMap::with_capacity(stats.len());
    for record in stats {
        by_id.entry(record.id.as_str()).or_insert(record);
    }

    let mut emitted = HashSet::with_capacity(videos.len());
    let mut joined = Vec::with_capacity(videos.len().min(stats.len()));
    for video in videos {
        if !emitted.insert(video.id.as_str()) {
            continue;
        }
        match by_id.get(video.id.as_str()) {
            Some(stats) => joined.push(JoinedRecord::new(video, stats)),
            None => debug!(id = %video.id, "no statistics for video, dropping it"),
        }
    }
    joined
}
