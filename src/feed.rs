use anyhow::{Context, Result, anyhow, bail};
use serde::de::{self, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

/// One listed event, normalized at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    pub sport: Option<String>,
    pub title: String,
    pub tournament: String,
    pub unix_timestamp: i64,
    pub channels: Vec<String>,
}

impl FeedEvent {
    /// Stand-in for an event the feed sent in a shape we cannot read.
    pub fn placeholder() -> Self {
        Self {
            sport: None,
            title: String::new(),
            tournament: String::new(),
            unix_timestamp: 0,
            channels: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.sport.is_none() && self.title.is_empty() && self.unix_timestamp == 0
    }
}

/// Events for one date key, in the order the feed listed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup {
    pub date: String,
    pub events: Vec<FeedEvent>,
}

/// Immutable result of one feed fetch. Date groups keep document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub groups: Vec<DateGroup>,
}

impl FeedSnapshot {
    pub fn new(groups: Vec<DateGroup>) -> Self {
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.events.is_empty())
    }

    pub fn event_count(&self) -> usize {
        self.groups.iter().map(|g| g.events.len()).sum()
    }

    pub fn events(&self) -> impl Iterator<Item = &FeedEvent> {
        self.groups.iter().flat_map(|g| g.events.iter())
    }
}

/// Wire shape of a channel entry: either a bare endpoint or `{ "channel": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawChannel {
    Url(String),
    Entry {
        #[serde(default)]
        channel: Option<String>,
    },
    Other(IgnoredAny),
}

impl RawChannel {
    pub fn into_endpoint(self) -> Option<String> {
        let endpoint = match self {
            RawChannel::Url(url) => url,
            RawChannel::Entry { channel } => channel?,
            RawChannel::Other(_) => return None,
        };
        let trimmed = endpoint.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireFeed {
    #[serde(default)]
    events: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(default)]
    sport: Option<String>,
    #[serde(rename = "match", default)]
    title: Option<String>,
    #[serde(default)]
    tournament: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    unix_timestamp: i64,
    #[serde(default)]
    channels: Option<Vec<RawChannel>>,
}

impl From<WireEvent> for FeedEvent {
    fn from(wire: WireEvent) -> Self {
        let sport = wire
            .sport
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let channels = wire
            .channels
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawChannel::into_endpoint)
            .collect();
        FeedEvent {
            sport,
            title: wire.title.unwrap_or_default().trim().to_string(),
            tournament: wire.tournament.unwrap_or_default().trim().to_string(),
            unix_timestamp: wire.unix_timestamp,
            channels,
        }
    }
}

/// Parses a full feed document. Anything that is not a JSON object with an
/// `events` map is rejected as a whole; a single unreadable event is not.
pub fn parse_feed_json(raw: &str) -> Result<FeedSnapshot> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("empty feed body");
    }
    let wire: WireFeed = serde_json::from_str(trimmed).context("invalid feed json")?;
    let events = wire
        .events
        .ok_or_else(|| anyhow!("feed response has no events"))?;

    let mut groups = Vec::with_capacity(events.len());
    for (date, value) in events {
        let events = parse_date_group(&date, value)?;
        groups.push(DateGroup { date, events });
    }
    Ok(FeedSnapshot { groups })
}

fn parse_date_group(date: &str, value: Value) -> Result<Vec<FeedEvent>> {
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, item)| parse_event(date, index, item))
            .collect()),
        // Some feeds collapse a one-event date into a bare object.
        Value::Object(_) => Ok(vec![parse_event(date, 0, value)]),
        Value::Null => Ok(Vec::new()),
        other => bail!("date group {date}: unexpected value {other}"),
    }
}

/// An event that does not deserialize keeps its slot as a placeholder, so the
/// positional ids of the events after it stay aligned with the raw array.
fn parse_event(date: &str, index: usize, item: Value) -> FeedEvent {
    match serde_json::from_value::<WireEvent>(item) {
        Ok(wire) => wire.into(),
        Err(err) => {
            warn!(date, index, error = %err, "skipping unreadable feed event");
            FeedEvent::placeholder()
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| de::Error::custom("unix_timestamp out of range")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("unix_timestamp not numeric: {s}"))),
        Value::Null => Ok(0),
        other => Err(de::Error::custom(format!(
            "unix_timestamp has unexpected type: {other}"
        ))),
    }
}
