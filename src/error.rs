use thiserror::Error;

/// Every way a page can end up without its primary content. All of them are
/// rendered; none of them abort the app.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("no match id supplied")]
    MissingId,

    #[error("match not found: {id}")]
    MatchNotFound { id: String },
}

impl PageError {
    pub fn from_fetch(err: &anyhow::Error) -> Self {
        PageError::FeedUnavailable(format!("{err:#}"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PageError::MissingId | PageError::MatchNotFound { .. })
    }

    pub fn heading(&self) -> &'static str {
        match self {
            PageError::FeedUnavailable(_) => "Content Unavailable",
            PageError::MissingId | PageError::MatchNotFound { .. } => "Error Loading Match",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            PageError::FeedUnavailable(_) => "⚠ Error loading content. Please try again later.",
            PageError::MissingId | PageError::MatchNotFound { .. } => {
                "The requested match could not be found. Please return to the schedule."
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid match id: {0:?}")]
pub struct InvalidMatchId(pub String);
