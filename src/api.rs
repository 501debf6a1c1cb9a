//! Boundary with the remote video platform.
//!
//! The pipeline only needs two read-only calls: one page of a channel's
//! search results, and the statistics for up to fifty video ids. Both are
//! expressed through [`VideoPlatform`] so the stages can run against the real
//! HTTP client or an in-memory fake.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::UpstreamError;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
/// Largest `maxResults` the search endpoint accepts.
pub const MAX_PAGE_SIZE: usize = 50;
/// Largest number of ids the statistics endpoint accepts per call.
pub const MAX_IDS_PER_REQUEST: usize = 50;

pub const SEARCH_ENDPOINT: &str = "search";
pub const VIDEOS_ENDPOINT: &str = "videos";

/// One page of `search.list` results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<SearchItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: SearchItemId,
    #[serde(default)]
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

/// One entry of a `videos.list` response with `statistics` and
/// `contentDetails` parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub statistics: VideoStatistics,
    #[serde(default)]
    pub content_details: Option<ContentDetails>,
}

/// Counters are withheld per video at the owner's discretion, so every field
/// is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<Counter>,
    #[serde(default)]
    pub like_count: Option<Counter>,
    #[serde(default)]
    pub comment_count: Option<Counter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentDetails {
    #[serde(default)]
    pub duration: Option<String>,
}

/// The platform encodes 64-bit counters as decimal strings; plain numbers are
/// accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Counter {
    Number(u64),
    Text(String),
}

impl Counter {
    pub fn value(&self) -> Option<u64> {
        match self {
            Counter::Number(value) => Some(*value),
            Counter::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

/// Read-only view of the video platform used by the fetch stages.
pub trait VideoPlatform {
    /// Fetches one page of the channel's videos, newest first.
    fn search_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, UpstreamError>;

    /// Fetches statistics and content details for at most
    /// [`MAX_IDS_PER_REQUEST`] ids.
    fn video_statistics(&self, ids: &[String]) -> Result<Vec<VideoItem>, UpstreamError>;
}

impl<P: VideoPlatform + ?Sized> VideoPlatform for &P {
    fn search_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, UpstreamError> {
        (**self).search_page(channel_id, page_token)
    }

    fn video_statistics(&self, ids: &[String]) -> Result<Vec<VideoItem>, UpstreamError> {
        (**self).video_statistics(ids)
    }
}

/// Blocking client for the YouTube Data API v3.
#[derive(Clone)]
pub struct YouTubeClient {
    agent: ureq::Agent,
    api_base: String,
    api_key: String,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}/{endpoint}", self.api_base);
        debug!(%url, ?query, "calling video platform");

        let mut request = self.agent.get(&url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        request = request.query("key", &self.api_key);

        match request.call() {
            Ok(response) => response
                .into_json::<T>()
                .map_err(|err| UpstreamError::malformed(endpoint, err.to_string())),
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(UpstreamError::status(endpoint, code, api_error_message(&body)))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(UpstreamError::transport(endpoint, transport))
            }
        }
    }
}

impl VideoPlatform for YouTubeClient {
    fn search_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, UpstreamError> {
        let max_results = MAX_PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "id,snippet"),
            ("channelId", channel_id),
            ("maxResults", max_results.as_str()),
            ("order", "date"),
            ("type", "video"),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        self.get_json(SEARCH_ENDPOINT, &query)
    }

    fn video_statistics(&self, ids: &[String]) -> Result<Vec<VideoItem>, UpstreamError> {
        let joined = ids.join(",");
        let response: VideoListResponse = self.get_json(
            VIDEOS_ENDPOINT,
            &[("part", "statistics,contentDetails"), ("id", joined.as_str())],
        )?;
        Ok(response.items)
    }
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Pulls `error.message` out of an error body, falling back to the raw text.
fn api_error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body) {
        if !envelope.error.message.is_empty() {
            return envelope.error.message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
