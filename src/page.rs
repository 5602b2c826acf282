use std::sync::Arc;

use percent_encoding::utf8_percent_encode;
use reqwest::Url;

use crate::channels::{URI_COMPONENT, channel_label, stream_link};
use crate::error::PageError;
use crate::feed::{FeedEvent, FeedSnapshot};
use crate::live::LiveState;
use crate::locator::{MatchId, identified_events, locate};
use crate::ranking::{CategorySummary, rank_categories};

pub const NO_CATEGORIES_MESSAGE: &str = "No sports categories available right now.";
pub const NO_STREAMS_MESSAGE: &str =
    "No stream links are available at the moment. Please check back closer to the event time.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCard {
    pub name: String,
    pub live_count: usize,
    pub badge: Option<String>,
    pub href: String,
}

impl From<&CategorySummary> for CategoryCard {
    fn from(cat: &CategorySummary) -> Self {
        Self {
            name: cat.name.clone(),
            live_count: cat.live_count,
            badge: (cat.live_count > 0).then(|| format!("{} Live", cat.live_count)),
            href: format!("/Schedule/#/{}", utf8_percent_encode(&cat.name, URI_COMPONENT)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub id: MatchId,
    pub date: String,
    pub sport: Option<String>,
    pub title: String,
    pub tournament: String,
    pub start: i64,
    pub state: LiveState,
}

/// Everything the listing screen shows for one snapshot at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub ranked: Vec<CategorySummary>,
    pub cards: Vec<CategoryCard>,
    pub rows: Vec<EventRow>,
}

impl ListingPage {
    pub fn build(feed: &FeedSnapshot, now_secs: i64) -> Self {
        let ranked = rank_categories(feed, now_secs);
        let cards = ranked.iter().map(CategoryCard::from).collect();
        let rows = identified_events(feed)
            .filter(|located| !located.event.is_placeholder())
            .map(|located| EventRow {
                id: located.id,
                date: located.date.to_string(),
                sport: located.event.sport.clone(),
                title: located.event.title.clone(),
                tournament: located.event.tournament.clone(),
                start: located.event.unix_timestamp,
                state: LiveState::classify(now_secs, located.event.unix_timestamp),
            })
            .collect();
        Self {
            ranked,
            cards,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
}

pub fn meta_for(event: &FeedEvent) -> PageMeta {
    PageMeta {
        title: format!("{} Live Streaming Links", event.title),
        description: format!(
            "To watch {} ({}) streams, scroll down and choose a stream link of your choice. \
             If no links appear, the event may not be live yet.",
            event.title, event.tournament
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLink {
    pub label: String,
    pub endpoint: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPage {
    pub id: MatchId,
    pub date: String,
    pub event: FeedEvent,
    pub meta: PageMeta,
    pub links: Vec<StreamLink>,
    /// Set while the event is still upcoming (not yet live).
    pub countdown_target: Option<i64>,
    pub state: LiveState,
}

impl MatchPage {
    pub fn build(
        feed: &FeedSnapshot,
        id: &str,
        now_secs: i64,
        stream_base: &Url,
    ) -> Result<Self, PageError> {
        let located = locate(feed, id).ok_or_else(|| PageError::MatchNotFound {
            id: id.to_string(),
        })?;
        let match_id = located.id.to_string();
        let event = located.event;
        let links = event
            .channels
            .iter()
            .enumerate()
            .map(|(index, endpoint)| StreamLink {
                label: channel_label(endpoint, index),
                endpoint: endpoint.clone(),
                href: stream_link(stream_base, &match_id, endpoint).to_string(),
            })
            .collect();

        // Inside the sub-minute lead the event already reads as live; no countdown then.
        let state = LiveState::classify(now_secs, event.unix_timestamp);
        let countdown_target = (state == LiveState::Upcoming).then_some(event.unix_timestamp);

        Ok(Self {
            id: located.id,
            date: located.date.to_string(),
            event: event.clone(),
            meta: meta_for(event),
            links,
            countdown_target,
            state,
        })
    }
}

/// Resolves a detail page. A missing or blank id fails before `load_feed`
/// is called, so no feed is fetched or scanned for it.
pub fn resolve_match_page<F>(
    id: Option<&str>,
    load_feed: F,
    now_secs: i64,
    stream_base: &Url,
) -> Result<MatchPage, PageError>
where
    F: FnOnce() -> Result<Arc<FeedSnapshot>, PageError>,
{
    let id = id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(PageError::MissingId)?;
    let feed = load_feed()?;
    MatchPage::build(&feed, id, now_secs, stream_base)
}
