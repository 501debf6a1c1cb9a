//! Enumerates every video a channel has published.

use std::collections::HashSet;

use chrono::DateTime;
use tracing::{debug, info};

use crate::api::{SEARCH_ENDPOINT, SearchItem, VideoPlatform};
use crate::error::UpstreamError;
use crate::model::VideoRecord;

/// Lazily walks the channel's search pages.
///
/// Each call to `next` issues exactly one request. Iteration ends after the
/// page that carries no continuation token, or right after the first error.
pub struct CatalogPages<'a, P: ?Sized> {
    platform: &'a P,
    channel_id: &'a str,
    next_token: Option<String>,
    requests: usize,
    finished: bool,
}

impl<'a, P: VideoPlatform + ?Sized> CatalogPages<'a, P> {
    pub fn new(platform: &'a P, channel_id: &'a str) -> Self {
        Self {
            platform,
            channel_id,
            next_token: None,
            requests: 0,
            finished: false,
        }
    }

    /// Number of search requests issued so far.
    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl<P: VideoPlatform + ?Sized> Iterator for CatalogPages<'_, P> {
    type Item = Result<Vec<VideoRecord>, UpstreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.next_token.take();
        self.requests += 1;
        let page = match self
            .platform
            .search_page(self.channel_id, token.as_deref())
        {
            Ok(page) => page,
            Err(err) => {
                self.finished = true;
                return Some(Err(err));
            }
        };

        // An empty token means the same as no token.
        self.next_token = page.next_page_token.filter(|token| !token.is_empty());
        if self.next_token.is_none() {
            self.finished = true;
        }

        let records: Result<Vec<_>, _> = page.items.into_iter().map(video_record).collect();
        match &records {
            Ok(videos) => info!(
                page = self.requests,
                videos = videos.len(),
                more = !self.finished,
                "fetched catalog page"
            ),
            Err(_) => self.finished = true,
        }
        Some(records)
    }
}

/// Fetches the whole catalog for `channel_id`, newest first.
///
/// Any page failure aborts the fetch; no partial catalog is returned. When the
/// same id shows up on more than one page only its first occurrence is kept.
pub fn fetch_catalog<P: VideoPlatform + ?Sized>(
    platform: &P,
    channel_id: &str,
) -> Result<Vec<VideoRecord>, UpstreamError> {
    let mut pages = CatalogPages::new(platform, channel_id);
    let mut seen = HashSet::new();
    let mut videos = Vec::new();

    for page in pages.by_ref() {
        for record in page? {
            if seen.insert(record.id.clone()) {
                videos.push(record);
            } else {
                debug!(id = %record.id, "skipping duplicate search result");
            }
        }
    }

    info!(
        channel_id,
        pages = pages.requests(),
        videos = videos.len(),
        "fetched channel catalog"
    );
    Ok(videos)
}

fn video_record(item: SearchItem) -> Result<VideoRecord, UpstreamError> {
    let id = item
        .id
        .video_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| UpstreamError::malformed(SEARCH_ENDPOINT, "search result without videoId"))?;
    let snippet = item.snippet.ok_or_else(|| {
        UpstreamError::malformed(SEARCH_ENDPOINT, format!("video {id} has no snippet"))
    })?;
    let raw_published = snippet.published_at.ok_or_else(|| {
        UpstreamError::malformed(SEARCH_ENDPOINT, format!("video {id} has no publishedAt"))
    })?;
    let published_at = DateTime::parse_from_rfc3339(&raw_published).map_err(|err| {
        UpstreamError::malformed(
            SEARCH_ENDPOINT,
            format!("video {id} has invalid publishedAt {raw_published:?}: {err}"),
        )
    })?;

    Ok(VideoRecord {
        id,
        title: snippet.title,
        published_at,
    })
}
