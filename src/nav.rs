use std::collections::HashSet;

use percent_encoding::utf8_percent_encode;

use crate::channels::URI_COMPONENT;
use crate::ranking::CategorySummary;

pub const LISTING_PRIORITY_SPORTS: [&str; 10] = [
    "Football",
    "Basketball",
    "Baseball",
    "Tennis",
    "UFC",
    "F1",
    "Cricket",
    "Boxing",
    "American Football",
    "Ice Hockey",
];

pub const MATCH_PAGE_PRIORITY_SPORTS: [&str; 6] =
    ["Football", "Basketball", "Baseball", "Tennis", "UFC", "F1"];

/// Terminals at or below this width get the compact menu.
pub const NARROW_MAX_COLUMNS: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    Narrow,
    Wide,
}

impl Viewport {
    pub fn classify(width: u16) -> Self {
        if width <= NARROW_MAX_COLUMNS {
            Viewport::Narrow
        } else {
            Viewport::Wide
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTarget {
    Home,
    Schedule,
    Sport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub target: MenuTarget,
}

impl MenuItem {
    fn home() -> Self {
        Self {
            label: "Home".to_string(),
            target: MenuTarget::Home,
        }
    }

    fn schedule() -> Self {
        Self {
            label: "Schedule".to_string(),
            target: MenuTarget::Schedule,
        }
    }

    fn sport(name: &str) -> Self {
        Self {
            label: name.to_string(),
            target: MenuTarget::Sport(name.to_string()),
        }
    }

    pub fn target_sport(&self) -> Option<&str> {
        match &self.target {
            MenuTarget::Sport(name) => Some(name.as_str()),
            MenuTarget::Home | MenuTarget::Schedule => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.target_sport().is_some()
    }

    pub fn href(&self) -> String {
        match &self.target {
            MenuTarget::Home => "/".to_string(),
            MenuTarget::Schedule => "/schedule/".to_string(),
            MenuTarget::Sport(name) => {
                format!("/schedule/#/{}", utf8_percent_encode(name, URI_COMPONENT))
            }
        }
    }
}

/// How many sport entries a page shows and which sports fill the gaps.
#[derive(Debug, Clone, Copy)]
pub struct NavPolicy {
    pub narrow_cap: usize,
    pub wide_cap: usize,
    pub priority: &'static [&'static str],
}

impl NavPolicy {
    pub const LISTING: NavPolicy = NavPolicy {
        narrow_cap: 3,
        wide_cap: 8,
        priority: &LISTING_PRIORITY_SPORTS,
    };

    pub const MATCH_PAGE: NavPolicy = NavPolicy {
        narrow_cap: 3,
        wide_cap: 6,
        priority: &MATCH_PAGE_PRIORITY_SPORTS,
    };

    pub fn max_dynamic_items(&self, viewport: Viewport) -> usize {
        match viewport {
            Viewport::Narrow => self.narrow_cap,
            Viewport::Wide => self.wide_cap,
        }
    }

    pub fn build(&self, ranked: &[CategorySummary], viewport: Viewport) -> Vec<MenuItem> {
        build_menu(ranked, self.priority, self.max_dynamic_items(viewport))
    }
}

/// Home and Schedule first, then live sports by rank, then priority sports,
/// never more than `max_dynamic_items` sport entries and never one sport twice.
pub fn build_menu(
    ranked: &[CategorySummary],
    priority: &[&str],
    max_dynamic_items: usize,
) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::home(), MenuItem::schedule()];
    let mut added: HashSet<&str> = HashSet::new();

    for cat in ranked.iter().filter(|cat| cat.live_count > 0) {
        if added.len() >= max_dynamic_items {
            return items;
        }
        if added.insert(cat.name.as_str()) {
            items.push(MenuItem::sport(&cat.name));
        }
    }

    for &sport in priority {
        if added.len() >= max_dynamic_items {
            break;
        }
        if added.insert(sport) {
            items.push(MenuItem::sport(sport));
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(name: &str, live_count: usize) -> CategorySummary {
        CategorySummary {
            name: name.to_string(),
            live_count,
        }
    }

    #[test]
    fn live_sports_come_before_priority_fill() {
        let ranked = vec![cat("Darts", 2), cat("Tennis", 1), cat("Golf", 0)];
        let menu = build_menu(&ranked, &MATCH_PAGE_PRIORITY_SPORTS, 4);
        let labels: Vec<&str> = menu.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Home", "Schedule", "Darts", "Tennis", "Football", "Basketball"]
        );
    }

    #[test]
    fn zero_cap_keeps_fixed_entries_only() {
        let menu = build_menu(&[cat("Darts", 5)], &LISTING_PRIORITY_SPORTS, 0);
        assert_eq!(menu.len(), 2);
        assert!(menu.iter().all(|m| !m.is_dynamic()));
    }

    #[test]
    fn href_encodes_sport_names() {
        assert_eq!(
            MenuItem::sport("Ice Hockey").href(),
            "/schedule/#/Ice%20Hockey"
        );
        assert_eq!(MenuItem::home().href(), "/");
        assert_eq!(MenuItem::schedule().href(), "/schedule/");
    }

    #[test]
    fn viewport_policy_caps() {
        assert_eq!(Viewport::classify(80), Viewport::Narrow);
        assert_eq!(Viewport::classify(160), Viewport::Wide);
        assert_eq!(NavPolicy::LISTING.max_dynamic_items(Viewport::Wide), 8);
        assert_eq!(NavPolicy::MATCH_PAGE.max_dynamic_items(Viewport::Wide), 6);
        assert_eq!(NavPolicy::MATCH_PAGE.max_dynamic_items(Viewport::Narrow), 3);
    }
}
