//! Monthly rollup of engagement counters for trend charts.

use std::collections::BTreeMap;

use crate::model::{DerivedRecord, MonthlyBucket, YearMonth};

/// Sums views, likes and comments per calendar month of publication.
///
/// Buckets come back in ascending month order. Months without uploads are
/// left out rather than filled with zeros. The month is read from each
/// timestamp's own wall clock (see [`YearMonth::of`]), so uploads near
/// midnight may land one month off from their UTC month.
pub fn aggregate_monthly(derived: &[DerivedRecord]) -> Vec<MonthlyBucket> {
    let mut buckets: BTreeMap<YearMonth, MonthlyBucket> = BTreeMap::new();

    for entry in derived {
        let record = &entry.record;
        let month = YearMonth::of(&record.published_at);
        let bucket = buckets.entry(month).or_insert_with(|| MonthlyBucket {
            month,
            total_views: 0,
            total_likes: 0,
            total_comments: 0,
        });
        bucket.total_views += record.views;
        bucket.total_likes += record.likes;
        bucket.total_comments += record.comments;
    }

    buckets.into_values().collect()
}
