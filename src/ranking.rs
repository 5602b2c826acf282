use std::collections::HashMap;

use crate::feed::FeedSnapshot;
use crate::live::is_live;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: String,
    pub live_count: usize,
}

/// Groups events by sport and orders the groups by how many are live right now.
/// Sports with the same live count stay in the order they first appear in the feed.
pub fn rank_categories(feed: &FeedSnapshot, now_secs: i64) -> Vec<CategorySummary> {
    let mut categories: Vec<CategorySummary> = Vec::new();
    let mut slot_by_name: HashMap<&str, usize> = HashMap::new();

    for event in feed.events() {
        let Some(sport) = event.sport.as_deref() else {
            continue;
        };
        let slot = *slot_by_name.entry(sport).or_insert_with(|| {
            categories.push(CategorySummary {
                name: sport.to_string(),
                live_count: 0,
            });
            categories.len() - 1
        });
        if is_live(now_secs, event.unix_timestamp) {
            categories[slot].live_count += 1;
        }
    }

    // sort_by is stable; ties keep first-seen order.
    categories.sort_by(|a, b| b.live_count.cmp(&a.live_count));
    categories
}

pub fn total_live(categories: &[CategorySummary]) -> usize {
    categories.iter().map(|c| c.live_count).sum()
}
