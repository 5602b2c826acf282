use streamboard_terminal::feed::{DateGroup, FeedEvent, FeedSnapshot};
use streamboard_terminal::live::{LIVE_WINDOW_MINUTES, LiveState, is_live};
use streamboard_terminal::ranking::{CategorySummary, rank_categories, total_live};

const T: i64 = 1_760_000_000;

fn event(sport: Option<&str>, ts: i64) -> FeedEvent {
    FeedEvent {
        sport: sport.map(str::to_string),
        title: "Home - Away".to_string(),
        tournament: "League".to_string(),
        unix_timestamp: ts,
        channels: Vec::new(),
    }
}

fn snapshot(groups: Vec<(&str, Vec<FeedEvent>)>) -> FeedSnapshot {
    FeedSnapshot::new(
        groups
            .into_iter()
            .map(|(date, events)| DateGroup {
                date: date.to_string(),
                events,
            })
            .collect(),
    )
}

fn summary(name: &str, live_count: usize) -> CategorySummary {
    CategorySummary {
        name: name.to_string(),
        live_count,
    }
}

#[test]
fn live_window_is_half_open() {
    assert!(is_live(T, T));
    assert!(is_live(T + 149 * 60 + 59, T));
    assert!(!is_live(T + LIVE_WINDOW_MINUTES * 60, T));
    assert!(!is_live(T - 60, T));
    assert!(is_live(T - 59, T));
}

#[test]
fn classify_covers_all_states() {
    assert_eq!(LiveState::classify(T - 60, T), LiveState::Upcoming);
    assert_eq!(LiveState::classify(T + 60, T), LiveState::Live);
    assert_eq!(LiveState::classify(T + 151 * 60, T), LiveState::Ended);
}

#[test]
fn ranks_by_live_count_then_first_seen() {
    let feed = snapshot(vec![
        (
            "2025-10-09",
            vec![
                event(Some("Tennis"), T - 600),
                event(Some("Football"), T + 3_600),
                event(Some("Cricket"), T - 60),
            ],
        ),
        (
            "2025-10-10",
            vec![
                event(Some("Football"), T - 30),
                event(Some("Football"), T - 10),
                event(None, T),
            ],
        ),
    ]);

    let ranked = rank_categories(&feed, T);
    assert_eq!(
        ranked,
        vec![
            summary("Football", 2),
            summary("Tennis", 1),
            summary("Cricket", 1),
        ]
    );
    assert_eq!(total_live(&ranked), 4);
}

#[test]
fn sports_without_live_events_are_still_listed() {
    let feed = snapshot(vec![(
        "2025-10-09",
        vec![event(Some("Golf"), T + 86_400), event(Some("Boxing"), T - 86_400)],
    )]);
    let ranked = rank_categories(&feed, T);
    assert_eq!(ranked, vec![summary("Golf", 0), summary("Boxing", 0)]);
}

#[test]
fn empty_feed_ranks_nothing() {
    let ranked = rank_categories(&FeedSnapshot::default(), T);
    assert!(ranked.is_empty());
    assert_eq!(total_live(&ranked), 0);
}
