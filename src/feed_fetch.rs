use anyhow::{Context, Result};
use tracing::info;

use crate::demo_feed;
use crate::feed::{FeedSnapshot, parse_feed_json};
use crate::http_client::{fetch_text, http_client};

pub const DEFAULT_FEED_URL: &str = "https://topembed.pw/api.php?format=json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Remote(String),
    Demo,
}

impl FeedSource {
    pub fn load(&self, now_secs: i64) -> Result<FeedSnapshot> {
        match self {
            FeedSource::Remote(url) => fetch_feed(url),
            FeedSource::Demo => Ok(demo_feed::generate(now_secs)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FeedSource::Remote(url) => url.clone(),
            FeedSource::Demo => "demo feed".to_string(),
        }
    }
}

/// Fetches and parses the feed in one go; either the whole snapshot comes
/// back or an error does.
pub fn fetch_feed(url: &str) -> Result<FeedSnapshot> {
    let client = http_client()?;
    let body = fetch_text(client, url).context("feed request failed")?;
    let feed = parse_feed_json(&body)?;
    info!(
        groups = feed.groups.len(),
        events = feed.event_count(),
        "feed loaded"
    );
    Ok(feed)
}
