use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::feed::{DateGroup, FeedEvent, FeedSnapshot};

const SPORTS: &[(&str, &[&str], &[&str])] = &[
    (
        "Football",
        &["Premier League", "La Liga", "Serie A"],
        &["Arsenal", "Chelsea", "Real Madrid", "Sevilla", "Inter", "Napoli"],
    ),
    (
        "Basketball",
        &["NBA", "EuroLeague"],
        &["Lakers", "Celtics", "Real Madrid", "Olympiacos"],
    ),
    ("Tennis", &["ATP Vienna", "WTA Tokyo"], &["Sinner", "Alcaraz", "Swiatek", "Gauff"]),
    ("Cricket", &["IPL", "The Ashes"], &["Mumbai", "Chennai", "England", "Australia"]),
    ("Ice Hockey", &["NHL"], &["Rangers", "Bruins", "Oilers", "Flames"]),
    ("Darts", &["Grand Slam"], &["Littler", "Humphries", "van Gerwen"]),
];

const CHANNEL_HOSTS: &[&str] = &["https://embed.example.tv/channel", "https://streams.example.net"];
const NAMED_CHANNELS: &[&str] = &["SkySports%20Main", "bbc-1", "espn-us", "DAZN%201"];

/// Offline stand-in for the remote feed: three date groups around `now`
/// with a handful of events already live.
pub fn generate(now_secs: i64) -> FeedSnapshot {
    generate_with(&mut rand::thread_rng(), now_secs)
}

pub fn generate_with<R: Rng>(rng: &mut R, now_secs: i64) -> FeedSnapshot {
    let mut groups = Vec::new();
    for day_offset in -1..=1_i64 {
        let date = date_key(now_secs + day_offset * 86_400);
        let count = rng.gen_range(4..=9);
        let mut events = Vec::with_capacity(count);
        for _ in 0..count {
            let start = match day_offset {
                -1 => now_secs - rng.gen_range(3..=20) * 3_600,
                0 => now_secs + rng.gen_range(-140..=240) * 60,
                _ => now_secs + rng.gen_range(20..=30) * 3_600,
            };
            events.push(random_event(rng, start));
        }
        events.sort_by_key(|e| e.unix_timestamp);
        groups.push(DateGroup { date, events });
    }
    FeedSnapshot::new(groups)
}

fn random_event<R: Rng>(rng: &mut R, start: i64) -> FeedEvent {
    let (sport, tournaments, teams) = SPORTS[rng.gen_range(0..SPORTS.len())];
    let mut pair = teams.choose_multiple(rng, 2);
    let home = pair.next().copied().unwrap_or("Home");
    let away = pair.next().copied().unwrap_or("Away");
    let tournament = tournaments.choose(rng).copied().unwrap_or_default();

    let channel_count = rng.gen_range(0..=4);
    let channels = (0..channel_count)
        .map(|_| {
            let host = CHANNEL_HOSTS.choose(rng).copied().unwrap_or_default();
            if rng.gen_bool(0.5) {
                format!("{host}/ex{}", rng.gen_range(1000..99_999))
            } else {
                let name = NAMED_CHANNELS.choose(rng).copied().unwrap_or_default();
                format!("{host}/{name}")
            }
        })
        .collect();

    FeedEvent {
        sport: Some(sport.to_string()),
        title: format!("{home} - {away}"),
        tournament: tournament.to_string(),
        unix_timestamp: start,
        channels,
    }
}

fn date_key(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d")
        .to_string()
}
