use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::InvalidMatchId;
use crate::feed::{FeedEvent, FeedSnapshot};

/// Page identifier of an event: its start time plus its position inside its
/// date group. Only meaningful against the snapshot it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchId {
    pub unix_timestamp: i64,
    pub index: usize,
}

impl MatchId {
    pub fn new(unix_timestamp: i64, index: usize) -> Self {
        Self {
            unix_timestamp,
            index,
        }
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.unix_timestamp, self.index)
    }
}

impl FromStr for MatchId {
    type Err = InvalidMatchId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMatchId(raw.to_string());
        let (ts, index) = raw.trim().rsplit_once('_').ok_or_else(invalid)?;
        let unix_timestamp = ts.parse::<i64>().map_err(|_| invalid())?;
        let index = index.parse::<usize>().map_err(|_| invalid())?;
        Ok(Self::new(unix_timestamp, index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedEvent<'a> {
    pub id: MatchId,
    pub date: &'a str,
    pub event: &'a FeedEvent,
}

/// Walks every event in snapshot order together with its computed identifier.
pub fn identified_events(feed: &FeedSnapshot) -> impl Iterator<Item = LocatedEvent<'_>> {
    feed.groups.iter().flat_map(|group| {
        group
            .events
            .iter()
            .enumerate()
            .map(move |(index, event)| LocatedEvent {
                id: MatchId::new(event.unix_timestamp, index),
                date: group.date.as_str(),
                event,
            })
    })
}

/// First event whose computed identifier equals `id`, or `None`.
///
/// Matching is textual, so `"0100_0"` does not address the event `100_0`.
/// Placeholder slots are never returned.
pub fn locate<'a>(feed: &'a FeedSnapshot, id: &str) -> Option<LocatedEvent<'a>> {
    let found = identified_events(feed)
        .find(|candidate| !candidate.event.is_placeholder() && candidate.id.to_string() == id);
    match &found {
        Some(hit) => debug!(id, date = hit.date, title = %hit.event.title, "located event"),
        None => debug!(id, events = feed.event_count(), "no event for id"),
    }
    found
}
