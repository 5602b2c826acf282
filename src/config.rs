use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use reqwest::Url;

use crate::channels::parse_stream_base;
use crate::feed_fetch::{DEFAULT_FEED_URL, FeedSource};

pub const DEFAULT_STREAM_PAGE_URL: &str = "https://example.com/streampage/";
pub const DEFAULT_SITE_BASE_URL: &str = "https://streameastv2.world";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LIVE_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed_source: FeedSource,
    pub stream_page_url: Url,
    /// Community widget server; `None` switches the widget off entirely.
    pub presence_server_id: Option<String>,
    pub site_base_url: String,
    pub log_file: Option<PathBuf>,
    pub http_timeout: Duration,
    /// How often the UI re-derives live state from the held snapshot.
    pub live_refresh: Duration,
}

impl AppConfig {
    /// Reads the process environment. Call after `.env` files are loaded.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };

        let feed_source = match get("FEED_SOURCE").map(|s| s.to_lowercase()).as_deref() {
            Some("demo") => FeedSource::Demo,
            _ => FeedSource::Remote(get("FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string())),
        };
        let stream_page_url = parse_stream_base(
            &get("STREAM_PAGE_URL").unwrap_or_else(|| DEFAULT_STREAM_PAGE_URL.to_string()),
        )?;
        let http_timeout_secs = get("HTTP_TIMEOUT_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
            .clamp(2, 60);
        let live_refresh_secs = get("LIVE_REFRESH_SECS")
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_LIVE_REFRESH_SECS)
            .max(5);

        Ok(Self {
            feed_source,
            stream_page_url,
            presence_server_id: get("PRESENCE_SERVER_ID"),
            site_base_url: get("SITE_BASE_URL").unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string()),
            log_file: get("STREAMBOARD_LOG").map(PathBuf::from),
            http_timeout: Duration::from_secs(http_timeout_secs),
            live_refresh: Duration::from_secs(live_refresh_secs),
        })
    }
}
