/// Minutes after kickoff during which an event counts as live.
pub const LIVE_WINDOW_MINUTES: i64 = 150;

/// An event is live when `0 <= (now - start) / 60 < 150`, in whole minutes.
///
/// The division truncates toward zero, so a start less than a minute in
/// the future already reads as minute 0. Exactly 150 minutes after kickoff
/// is no longer live.
pub fn is_live(now_secs: i64, start_secs: i64) -> bool {
    let minutes = now_secs.saturating_sub(start_secs) / 60;
    (0..LIVE_WINDOW_MINUTES).contains(&minutes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveState {
    Upcoming,
    Live,
    Ended,
}

impl LiveState {
    pub fn classify(now_secs: i64, start_secs: i64) -> Self {
        if is_live(now_secs, start_secs) {
            LiveState::Live
        } else if now_secs < start_secs {
            LiveState::Upcoming
        } else {
            LiveState::Ended
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LiveState::Upcoming => "SOON",
            LiveState::Live => "LIVE",
            LiveState::Ended => "ENDED",
        }
    }
}
