use std::fmt::Write as _;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::feed::FeedSnapshot;
use crate::locator::identified_events;

pub const DAILY_PAGES: [&str; 2] = ["", "/Schedule/"];
pub const MONTHLY_PAGES: [&str; 6] = [
    "/About/",
    "/Terms/",
    "/Privacy/",
    "/Disclaimer/",
    "/DMCA/",
    "/Contact/",
];

/// Minutes after start during which a match page stays listed.
const CRICKET_RETENTION_MINUTES: i64 = 480;
const DEFAULT_RETENTION_MINUTES: i64 = 180;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

/// Whether a match is still worth listing `now_secs` after its start.
/// Upcoming matches always are.
pub fn is_retained(sport: &str, start_secs: i64, now_secs: i64) -> bool {
    let limit_minutes = if sport.eq_ignore_ascii_case("cricket") {
        CRICKET_RETENTION_MINUTES
    } else {
        DEFAULT_RETENTION_MINUTES
    };
    now_secs - start_secs < limit_minutes * 60
}

/// Detail-page URLs for every listable match, addressed by match id.
pub fn match_urls(feed: &FeedSnapshot, base_url: &str, now_secs: i64) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    identified_events(feed)
        .filter(|located| {
            let event = located.event;
            let Some(sport) = event.sport.as_deref() else {
                return false;
            };
            !event.title.is_empty()
                && event.unix_timestamp != 0
                && is_retained(sport, event.unix_timestamp, now_secs)
        })
        .map(|located| format!("{base}/Matchinformation/?id={}", located.id))
        .collect()
}

pub fn build_entries(base_url: &str, match_urls: &[String], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');
    let today = now.date_naive();
    let month_start = today.with_day(1).unwrap_or(today);

    let mut entries = Vec::with_capacity(DAILY_PAGES.len() + match_urls.len() + MONTHLY_PAGES.len());
    for page in DAILY_PAGES {
        entries.push(SitemapEntry {
            loc: format!("{base}{page}"),
            lastmod: today,
            changefreq: "daily",
            priority: "1.0",
        });
    }
    for url in match_urls {
        entries.push(SitemapEntry {
            loc: url.clone(),
            lastmod: today,
            changefreq: "always",
            priority: "0.8",
        });
    }
    for page in MONTHLY_PAGES {
        entries.push(SitemapEntry {
            loc: format!("{base}{page}"),
            lastmod: month_start,
            changefreq: "monthly",
            priority: "0.5",
        });
    }
    entries
}

pub fn render_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    for entry in entries {
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            escape_xml(&entry.loc),
            entry.lastmod.format("%Y-%m-%d"),
            entry.changefreq,
            entry.priority
        );
    }
    xml.push_str("</urlset>");
    xml
}

fn escape_xml(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
