use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rand::SeedableRng;
use rand::rngs::StdRng;

use streamboard_terminal::demo_feed::generate_with;
use streamboard_terminal::feed::{FeedSnapshot, parse_feed_json};
use streamboard_terminal::locator::{identified_events, locate};
use streamboard_terminal::nav::{NavPolicy, Viewport};
use streamboard_terminal::page::ListingPage;
use streamboard_terminal::ranking::rank_categories;

const NOW: i64 = 1_760_600_000;

fn sample_feed() -> FeedSnapshot {
    generate_with(&mut StdRng::seed_from_u64(42), NOW)
}

fn feed_json(groups: usize, per_group: usize) -> String {
    let mut dates = Vec::with_capacity(groups);
    for day in 0..groups {
        let events: Vec<String> = (0..per_group)
            .map(|i| {
                format!(
                    r#"{{"unix_timestamp":{ts},"sport":"Sport{sport}","match":"Home {i} - Away {i}","tournament":"Cup","channels":["https://embed.example.tv/channel/ex{i:04}",{{"channel":"https://embed.example.tv/channel/Named%20{i}"}}]}}"#,
                    ts = NOW + (day * per_group + i) as i64 * 60 - 7_200,
                    sport = i % 12,
                )
            })
            .collect();
        dates.push(format!(r#""2025-10-{:02}":[{}]"#, day + 1, events.join(",")));
    }
    format!(r#"{{"events":{{{}}}}}"#, dates.join(","))
}

fn bench_feed_parse(c: &mut Criterion) {
    let raw = feed_json(3, 120);
    c.bench_function("feed_parse", |b| {
        b.iter(|| {
            let feed = parse_feed_json(black_box(&raw)).unwrap();
            black_box(feed.event_count());
        })
    });
}

fn bench_rank_and_menu(c: &mut Criterion) {
    let feed = parse_feed_json(&feed_json(3, 120)).unwrap();
    c.bench_function("rank_and_menu", |b| {
        b.iter(|| {
            let ranked = rank_categories(black_box(&feed), NOW);
            let menu = NavPolicy::LISTING.build(&ranked, Viewport::Wide);
            black_box(menu.len());
        })
    });
}

fn bench_listing_build(c: &mut Criterion) {
    let feed = sample_feed();
    c.bench_function("listing_build", |b| {
        b.iter(|| {
            let page = ListingPage::build(black_box(&feed), NOW);
            black_box(page.rows.len());
        })
    });
}

fn bench_locate_last(c: &mut Criterion) {
    let feed = parse_feed_json(&feed_json(3, 120)).unwrap();
    let last = identified_events(&feed)
        .last()
        .map(|e| e.id.to_string())
        .unwrap();
    c.bench_function("locate_last", |b| {
        b.iter(|| {
            let hit = locate(black_box(&feed), black_box(&last));
            black_box(hit.is_some());
        })
    });
}

criterion_group!(
    benches,
    bench_feed_parse,
    bench_rank_and_menu,
    bench_listing_build,
    bench_locate_last
);
criterion_main!(benches);
