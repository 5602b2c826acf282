use std::fs;
use std::path::PathBuf;

use streamboard_terminal::feed::parse_feed_json;
use streamboard_terminal::presence::parse_presence_json;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_feed_fixture() {
    let raw = read_fixture("feed.json");
    let feed = parse_feed_json(&raw).expect("fixture should parse");

    let dates: Vec<&str> = feed.groups.iter().map(|g| g.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-06-01", "2025-06-02", "2025-06-03"]);
    assert_eq!(feed.event_count(), 4);

    let first = &feed.groups[0].events[0];
    assert_eq!(first.sport.as_deref(), Some("Football"));
    assert_eq!(first.title, "Arsenal - Chelsea");
    assert_eq!(first.tournament, "Premier League");
    assert_eq!(first.unix_timestamp, 1_748_779_200);
    assert_eq!(
        first.channels,
        vec![
            "https://embed.example.net/channel/ex1234".to_string(),
            "https://embed.example.net/channel/Sky%20Sports".to_string(),
        ]
    );
}

#[test]
fn string_timestamps_and_single_object_groups_are_accepted() {
    let feed = parse_feed_json(&read_fixture("feed.json")).expect("fixture should parse");
    assert_eq!(feed.groups[0].events[1].unix_timestamp, 1_748_782_800);
    assert_eq!(feed.groups[1].events.len(), 1);
    assert_eq!(feed.groups[1].events[0].title, "India - Australia");
    assert!(feed.groups[2].events.is_empty());
}

#[test]
fn rejects_unusable_bodies() {
    assert!(parse_feed_json("").is_err());
    assert!(parse_feed_json("   ").is_err());
    assert!(parse_feed_json("<html>bad gateway</html>").is_err());
    assert!(parse_feed_json(r#"{"status":"ok"}"#).is_err());
    assert!(parse_feed_json(r#"{"events":{"d":42}}"#).is_err());
}

#[test]
fn empty_events_map_is_an_empty_snapshot() {
    let feed = parse_feed_json(r#"{"events":{}}"#).expect("empty feed should parse");
    assert!(feed.is_empty());
    assert_eq!(feed.event_count(), 0);
}

#[test]
fn parses_presence_fixture() {
    let widget = parse_presence_json(&read_fixture("presence.json")).expect("fixture should parse");
    assert_eq!(widget.online_count, 42);
    let names: Vec<&str> = widget
        .members
        .iter()
        .map(|m| m.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["alpha", "bravo", "delta", "echo", "foxtrot"]);
    assert!(widget.members[1].avatar_url.is_none());
    assert_eq!(
        widget.invite_url.as_deref(),
        Some("https://discord.com/invite/abc123")
    );
}
