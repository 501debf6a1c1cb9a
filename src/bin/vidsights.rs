#![forbid(unsafe_code)]

//! Command-line front end: runs the engagement pipeline once for a channel,
//! prints the monthly trend and optionally writes the full report as JSON for
//! a dashboard to pick up.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vidsights::api::YouTubeClient;
use vidsights::config::{CHANNEL_ID_VAR, SettingsOverrides, resolve_settings};
use vidsights::model::DerivedRecord;
use vidsights::pipeline::{self, PipelineReport};

#[derive(Debug, Parser)]
#[command(name = "vidsights", about = "Channel engagement trends from the YouTube Data API")]
struct Cli {
    /// Channel to analyse (falls back to YOUTUBE_CHANNEL_ID).
    #[arg(long)]
    channel: Option<String>,
    /// Env file holding YOUTUBE_API_KEY and friends.
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
    /// API key (overrides YOUTUBE_API_KEY).
    #[arg(long)]
    api_key: Option<String>,
    /// Base URL of the Data API.
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
    /// Write the full report (videos, monthly buckets, correlations) as JSON.
    #[arg(long, short, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Print the detail row of the video with this title.
    #[arg(long, value_name = "TITLE")]
    video: Option<String>,
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            api_key: self.api_key.clone(),
            channel_id: self.channel.clone(),
            api_base: self.api_base.clone(),
            timeout_secs: self.timeout_secs,
            env_path: self.env_file.clone(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = resolve_settings(cli.overrides())?;
    let channel_id = settings
        .channel_id
        .clone()
        .ok_or_else(|| anyhow!("no channel given; pass --channel or set {CHANNEL_ID_VAR}"))?;

    let client = YouTubeClient::new(&settings.api_key, &settings.api_base, settings.timeout);
    let report = pipeline::run(&client, &channel_id)
        .with_context(|| format!("analysing channel {channel_id}"))?;

    println!("===================================");
    println!("VidSights - {channel_id}");
    println!("===================================");
    print!("{}", render_summary(&report));
    println!();
    print!("{}", render_monthly(&report));

    if let Some(title) = cli.video.as_deref() {
        println!();
        match report.video_by_title(title) {
            Some(video) => print!("{}", render_video(video)),
            None => println!("No video titled {title:?}"),
        }
    }

    if let Some(path) = cli.output.as_deref() {
        write_json_atomic(path, &report)?;
        println!();
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn render_summary(report: &PipelineReport) -> String {
    let totals = report.totals();
    format!(
        "Videos: {}\nViews: {}\nLikes: {}\nComments: {}\n",
        totals.videos, totals.views, totals.likes, totals.comments
    )
}

fn render_monthly(report: &PipelineReport) -> String {
    if report.monthly.is_empty() {
        return "No published videos.\n".to_string();
    }
    let mut out = format!("{:<8} {:>12} {:>10} {:>10}\n", "Month", "Views", "Likes", "Comments");
    for bucket in &report.monthly {
        out.push_str(&format!(
            "{:<8} {:>12} {:>10} {:>10}\n",
            bucket.month.to_string(),
            bucket.total_views,
            bucket.total_likes,
            bucket.total_comments
        ));
    }
    out
}

fn render_video(video: &DerivedRecord) -> String {
    let record = &video.record;
    format!(
        "{}\n  id: {}\n  published: {}\n  duration: {}\n  views: {}\n  likes: {} (ratio {})\n  comments: {} (ratio {})\n",
        record.title,
        record.id,
        record.published_at.to_rfc3339(),
        record.duration,
        record.views,
        record.likes,
        format_ratio(video.like_ratio),
        record.comments,
        format_ratio(video.comment_ratio),
    )
}

fn format_ratio(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}%", value * 100.0)
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("tmp");
    let payload = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp_path, payload).with_context(|| format!("writing {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("finalizing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use vidsights::aggregate::aggregate_monthly;
    use vidsights::correlation::correlation_matrix;
    use vidsights::metrics::derive;
    use vidsights::model::JoinedRecord;

    fn sample_report() -> PipelineReport {
        let joined = vec![
            JoinedRecord {
                id: "a".into(),
                title: "Launch".into(),
                published_at: DateTime::parse_from_rfc3339("2024-02-01T09:00:00Z").unwrap(),
                views: 400,
                likes: 20,
                comments: 4,
                duration: "PT3M".into(),
            },
            JoinedRecord {
                id: "b".into(),
                title: "Teaser".into(),
                published_at: DateTime::parse_from_rfc3339("2024-01-10T09:00:00Z").unwrap(),
                views: 0,
                likes: 0,
                comments: 0,
                duration: "PT30S".into(),
            },
        ];
        let videos = derive(&joined);
        PipelineReport {
            channel_id: "UC1".into(),
            monthly: aggregate_monthly(&videos),
            correlation: correlation_matrix(&videos),
            videos,
        }
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "vidsights",
            "--channel",
            "UC1",
            "--timeout-secs",
            "5",
            "-o",
            "out/report.json",
            "--video",
            "Launch",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.channel_id.as_deref(), Some("UC1"));
        assert_eq!(overrides.timeout_secs, Some(5));
        assert_eq!(cli.output, Some(PathBuf::from("out/report.json")));
        assert_eq!(cli.video.as_deref(), Some("Launch"));
    }

    #[test]
    fn cli_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["vidsights", "--bogus"]).is_err());
    }

    #[test]
    fn monthly_table_lists_months_in_order() {
        let table = render_monthly(&sample_report());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024-01"));
        assert!(lines[2].starts_with("2024-02"));
        assert!(lines[2].contains("400"));
    }

    #[test]
    fn video_detail_shows_na_for_zero_views() {
        let report = sample_report();
        let teaser = render_video(report.video_by_title("Teaser").unwrap());
        assert!(teaser.contains("(ratio n/a)"));
        let launch = render_video(report.video_by_title("Launch").unwrap());
        assert!(launch.contains("(ratio 5.00%)"));
    }

    #[test]
    fn summary_reports_totals() {
        let summary = render_summary(&sample_report());
        assert!(summary.contains("Videos: 2"));
        assert!(summary.contains("Views: 400"));
    }

    #[test]
    fn write_json_atomic_creates_parent_dirs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("report.json");
        write_json_atomic(&path, &sample_report())?;
        let value: serde_json::Value = serde_json::from_slice(&fs::read(&path)?)?;
        assert_eq!(value["channelId"], "UC1");
        assert_eq!(value["monthly"][0]["month"], "2024-01");
        assert!(value["videos"][1]["likeRatio"].is_null());
        assert!(!path.with_extension("tmp").exists());
        Ok(())
    }
}
