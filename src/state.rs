use std::collections::VecDeque;
use std::sync::Arc;

use reqwest::Url;

use crate::countdown::Remaining;
use crate::error::PageError;
use crate::feed::FeedSnapshot;
use crate::nav::{MenuItem, NavPolicy, Viewport};
use crate::page::{ListingPage, MatchPage, resolve_match_page};
use crate::presence::PresenceWidget;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Listing,
    Match { id: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Loading,
    Ready,
    Failed(PageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceState {
    Disabled,
    Loading,
    Ready(PresenceWidget),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownView {
    Hidden,
    Running { target: i64, remaining: Remaining },
    Expired { target: i64 },
}

#[derive(Debug)]
pub enum Delta {
    SetFeed {
        snapshot: Arc<FeedSnapshot>,
        fetched_at: i64,
    },
    FeedFailed(String),
    CountdownTick {
        target: i64,
        remaining: Remaining,
    },
    CountdownExpired {
        target: i64,
    },
    SetPresence(PresenceWidget),
    PresenceFailed(String),
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    ReloadFeed,
    FetchPresence,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub viewport: Viewport,
    pub stream_base: Url,
    pub feed: Option<Arc<FeedSnapshot>>,
    pub feed_status: FeedStatus,
    pub fetched_at: Option<i64>,
    pub listing: ListingPage,
    pub menu: Vec<MenuItem>,
    pub selected: usize,
    pub match_page: Option<Result<MatchPage, PageError>>,
    pub countdown: CountdownView,
    pub presence: PresenceState,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(screen: Screen, stream_base: Url, presence_enabled: bool) -> Self {
        let mut state = Self {
            screen: Screen::Listing,
            viewport: Viewport::Wide,
            stream_base,
            feed: None,
            feed_status: FeedStatus::Loading,
            fetched_at: None,
            listing: ListingPage::default(),
            menu: Vec::new(),
            selected: 0,
            match_page: None,
            countdown: CountdownView::Hidden,
            presence: if presence_enabled {
                PresenceState::Loading
            } else {
                PresenceState::Disabled
            },
            logs: VecDeque::new(),
            help_overlay: false,
        };
        state.enter(screen);
        state
    }

    pub fn nav_policy(&self) -> NavPolicy {
        match self.screen {
            Screen::Listing => NavPolicy::LISTING,
            Screen::Match { .. } => NavPolicy::MATCH_PAGE,
        }
    }

    pub fn match_id(&self) -> Option<&str> {
        match &self.screen {
            Screen::Match { id } => id.as_deref(),
            Screen::Listing => None,
        }
    }

    /// Re-derives the menu from the current snapshot. Without a snapshot the
    /// previous menu is left as it is.
    pub fn rebuild_menu(&mut self) {
        if self.feed.is_none() {
            return;
        }
        self.menu = self.nav_policy().build(&self.listing.ranked, self.viewport);
    }

    pub fn set_viewport_width(&mut self, width: u16) {
        self.viewport = Viewport::classify(width);
        self.rebuild_menu();
    }

    /// Re-evaluates everything that depends on the wall clock.
    pub fn refresh(&mut self, now_secs: i64) {
        if let Some(feed) = self.feed.clone() {
            self.listing = ListingPage::build(&feed, now_secs);
            if self.selected >= self.listing.rows.len() {
                self.selected = self.listing.rows.len().saturating_sub(1);
            }
        }
        self.rebuild_menu();
        self.resolve_match(now_secs);
    }

    fn resolve_match(&mut self, now_secs: i64) {
        let Screen::Match { id } = &self.screen else {
            self.match_page = None;
            return;
        };
        let feed = self.feed.clone();
        let status = self.feed_status.clone();
        let resolved = resolve_match_page(
            id.as_deref(),
            move || match (feed, status) {
                (Some(feed), _) => Ok(feed),
                (None, FeedStatus::Failed(err)) => Err(err),
                (None, _) => Err(PageError::FeedUnavailable("feed still loading".to_string())),
            },
            now_secs,
            &self.stream_base,
        );
        // While loading, only a missing id is already final.
        if self.feed.is_none() && matches!(self.feed_status, FeedStatus::Loading) {
            self.match_page = match resolved {
                Err(PageError::MissingId) => Some(Err(PageError::MissingId)),
                _ => None,
            };
            return;
        }
        if let Ok(page) = &resolved
            && page.countdown_target.is_none()
        {
            self.countdown = CountdownView::Hidden;
        }
        self.match_page = Some(resolved);
    }

    fn enter(&mut self, screen: Screen) {
        self.screen = screen;
        self.countdown = CountdownView::Hidden;
        self.match_page = None;
        if let Screen::Match { id } = &self.screen
            && id.as_deref().is_none_or(|id| id.trim().is_empty())
        {
            self.match_page = Some(Err(PageError::MissingId));
        }
        self.rebuild_menu();
    }

    pub fn open_selected(&mut self, now_secs: i64) {
        let Some(row) = self.listing.rows.get(self.selected) else {
            self.push_log("[INFO] No event selected");
            return;
        };
        let id = row.id.to_string();
        self.push_log(format!("[INFO] Opening match {id}"));
        self.enter(Screen::Match { id: Some(id) });
        self.resolve_match(now_secs);
    }

    pub fn back_to_listing(&mut self) {
        self.enter(Screen::Listing);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.listing.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Countdown target the current page wants running, if any.
    pub fn wanted_countdown(&self) -> Option<i64> {
        match &self.match_page {
            Some(Ok(page)) => page.countdown_target,
            _ => None,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta, now_secs: i64) {
    match delta {
        Delta::SetFeed {
            snapshot,
            fetched_at,
        } => {
            state.push_log(format!(
                "[INFO] Feed loaded: {} events in {} date groups",
                snapshot.event_count(),
                snapshot.groups.len()
            ));
            state.feed = Some(snapshot);
            state.feed_status = FeedStatus::Ready;
            state.fetched_at = Some(fetched_at);
            state.refresh(now_secs);
        }
        Delta::FeedFailed(message) => {
            state.push_log(format!("[WARN] Feed error: {message}"));
            state.feed = None;
            state.listing = ListingPage::default();
            // The menu was derived from the discarded snapshot.
            state.menu.clear();
            state.feed_status = FeedStatus::Failed(PageError::FeedUnavailable(message));
            state.resolve_match(now_secs);
        }
        Delta::CountdownTick { target, remaining } => {
            if state.wanted_countdown() == Some(target) {
                state.countdown = CountdownView::Running { target, remaining };
            }
        }
        Delta::CountdownExpired { target } => {
            if state.wanted_countdown() == Some(target) {
                state.countdown = CountdownView::Expired { target };
                state.push_log("[INFO] Event has started");
            }
        }
        Delta::SetPresence(widget) => {
            if state.presence != PresenceState::Disabled {
                state.presence = PresenceState::Ready(widget);
            }
        }
        Delta::PresenceFailed(message) => {
            if state.presence != PresenceState::Disabled {
                state.push_log(format!("[WARN] Community widget error: {message}"));
                state.presence = PresenceState::Failed(message);
            }
        }
        Delta::Log(message) => state.push_log(message),
    }
}
