//! Records produced by each pipeline stage.
//!
//! Every stage returns a fresh collection of one of these types; nothing here
//! is mutated after the stage that built it hands it on.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Serialize, Serializer};

/// Minimal descriptor of a published video, as enumerated by the catalog
/// search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub published_at: DateTime<FixedOffset>,
}

/// Engagement counters for one video id. Counters the platform withholds are
/// stored as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub id: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    /// ISO-8601 duration exactly as reported (e.g. `PT4M13S`).
    pub duration: String,
}

/// A video that appears in both the catalog and the statistics response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedRecord {
    pub id: String,
    pub title: String,
    pub published_at: DateTime<FixedOffset>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub duration: String,
}

impl JoinedRecord {
    pub fn new(video: &VideoRecord, stats: &StatsRecord) -> Self {
        Self {
            id: video.id.clone(),
            title: video.title.clone(),
            published_at: video.published_at,
            views: stats.views,
            likes: stats.likes,
            comments: stats.comments,
            duration: stats.duration.clone(),
        }
    }
}

/// A joined record plus its engagement ratios.
///
/// Both ratios are `NaN` when `views` is zero; they serialize as `null`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedRecord {
    #[serde(flatten)]
    pub record: JoinedRecord,
    pub like_ratio: f64,
    pub comment_ratio: f64,
}

impl DerivedRecord {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn has_ratios(&self) -> bool {
        !self.like_ratio.is_nan() && !self.comment_ratio.is_nan()
    }
}

/// Calendar month key, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month of the timestamp's own wall-clock reading. The offset is dropped,
    /// not applied, so a video stamped `2024-01-31T23:30:00-05:00` lands in
    /// January even though it is already February in UTC.
    pub fn of(instant: &DateTime<FixedOffset>) -> Self {
        let local = instant.naive_local();
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Summed counters for every video published in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    pub month: YearMonth,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timestamp(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).unwrap()
    }

    #[test]
    fn year_month_uses_wall_clock_of_offset() {
        let month = YearMonth::of(&timestamp("2024-01-31T23:30:00-05:00"));
        assert_eq!(month, YearMonth::new(2024, 1).unwrap());
        let utc = YearMonth::of(&timestamp("2024-02-01T04:30:00Z"));
        assert_eq!(utc, YearMonth::new(2024, 2).unwrap());
    }

    #[test]
    fn year_month_orders_and_formats() {
        let dec = YearMonth::new(2023, 12).unwrap();
        let jan = YearMonth::new(2024, 1).unwrap();
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "2024-01");
        assert!(YearMonth::new(2024, 13).is_none());
        assert!(YearMonth::new(2024, 0).is_none());
    }

    #[test]
    fn derived_record_serializes_nan_as_null() {
        let record = DerivedRecord {
            record: JoinedRecord {
                id: "a".into(),
                title: "Intro".into(),
                published_at: timestamp("2024-01-05T10:00:00Z"),
                views: 0,
                likes: 0,
                comments: 0,
                duration: "PT1M".into(),
            },
            like_ratio: f64::NAN,
            comment_ratio: f64::NAN,
        };
        assert!(!record.has_ratios());
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], json!("a"));
        assert!(
            value["publishedAt"]
                .as_str()
                .unwrap()
                .starts_with("2024-01-05T10:00:00")
        );
        assert_eq!(value["likeRatio"], serde_json::Value::Null);
        assert_eq!(value["commentRatio"], serde_json::Value::Null);
    }

    #[test]
    fn bucket_serializes_month_as_string() {
        let bucket = MonthlyBucket {
            month: YearMonth::new(2024, 2).unwrap(),
            total_views: 10,
            total_likes: 2,
            total_comments: 1,
        };
        let value = serde_json::to_value(&bucket).unwrap();
        assert_eq!(value["month"], json!("2024-02"));
        assert_eq!(value["totalViews"], json!(10));
    }
}
