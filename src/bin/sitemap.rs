use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use streamboard_terminal::config::AppConfig;
use streamboard_terminal::feed_fetch::FeedSource;
use streamboard_terminal::http_client::init_http_client;
use streamboard_terminal::logging::init_stderr_logging;
use streamboard_terminal::sitemap::{build_entries, match_urls, render_xml};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_stderr_logging();

    let config = AppConfig::from_env()?;
    init_http_client(config.http_timeout)?;
    let out = parse_out_arg().unwrap_or_else(|| PathBuf::from("sitemap.xml"));
    let base_url = parse_base_arg().unwrap_or_else(|| config.site_base_url.clone());
    let source = if has_flag("--demo") {
        FeedSource::Demo
    } else {
        config.feed_source.clone()
    };

    let now = Utc::now();
    let feed = source
        .load(now.timestamp())
        .with_context(|| format!("load feed from {}", source.describe()))?;
    let urls = match_urls(&feed, &base_url, now.timestamp());
    let entries = build_entries(&base_url, &urls, now);
    let xml = render_xml(&entries);

    if let Some(dir) = out.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    fs::write(&out, xml).with_context(|| format!("write {}", out.display()))?;
    info!(entries = entries.len(), path = %out.display(), "sitemap written");

    println!("Feed events: {}", feed.event_count());
    println!("Match pages: {}", urls.len());
    println!("Total URLs: {}", entries.len());
    println!("Written: {}", out.display());
    Ok(())
}

fn parse_out_arg() -> Option<PathBuf> {
    parse_value_arg("--out").map(PathBuf::from)
}

fn parse_base_arg() -> Option<String> {
    parse_value_arg("--base")
}

fn parse_value_arg(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn has_flag(flag: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == flag)
}
