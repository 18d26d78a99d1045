use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid page URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// A single card could not be read. Recovered locally: the card is skipped
/// and its siblings are still extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("card {index} contains none of the expected fields")]
    UnrecognisedCard { index: usize },

    #[error("card {index} wraps another card")]
    NestedCard { index: usize },
}

impl ExtractionError {
    #[must_use]
    pub fn card_index(&self) -> usize {
        match self {
            Self::UnrecognisedCard { index } | Self::NestedCard { index } => *index,
        }
    }
}
