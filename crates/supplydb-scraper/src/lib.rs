pub mod client;
pub mod document;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod parse;
pub mod pipeline;
mod retry;
pub mod trust;

pub use client::{page_domain, FetchedPage, PageClient};
pub use document::{Element, HtmlElement, HtmlPage, TagSelector};
pub use error::{ExtractionError, ScraperError};
pub use extract::{extract_candidates, extract_card, CardSelectors, Extraction};
pub use normalize::{normalize_signals, NormalizedSignals, Signal, SIGNAL_COUNT};
pub use pipeline::{score_page, score_record, PageContext, PageReport};
pub use trust::{baseline_score, compute_trust_score};
