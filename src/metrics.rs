//! Per-video engagement ratios.

use crate::model::{DerivedRecord, JoinedRecord};

/// Adds `likeRatio` and `commentRatio` to every joined record.
///
/// A video with zero views gets `NaN` for both ratios rather than an error, so
/// consumers can filter it or show "n/a".
pub fn derive(joined: &[JoinedRecord]) -> Vec<DerivedRecord> {
    joined.iter().map(derive_one).collect()
}

fn derive_one(record: &JoinedRecord) -> DerivedRecord {
    DerivedRecord {
        record: record.clone(),
        like_ratio: ratio(record.likes, record.views),
        comment_ratio: ratio(record.comments, record.views),
    }
}

fn ratio(count: u64, views: u64) -> f64 {
    if views == 0 {
        f64::NAN
    } else {
        count as f64 / views as f64
    }
}
