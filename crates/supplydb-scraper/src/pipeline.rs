//! Extract → normalize → score for one page.

use chrono::{DateTime, Utc};
use supplydb_core::{CandidateRecord, ScoredRecord, ScoringConfig};

use crate::document::Element;
use crate::extract::{extract_candidates, CardSelectors};
use crate::normalize::normalize_signals;
use crate::trust::compute_trust_score;

/// Where a page came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Domain the page was fetched from; part of every record's identity.
    pub source_domain: String,
    pub page_url: Option<String>,
}

impl PageContext {
    #[must_use]
    pub fn new(source_domain: impl Into<String>) -> Self {
        Self {
            source_domain: source_domain.into(),
            page_url: None,
        }
    }

    #[must_use]
    pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
        self.page_url = Some(url.into());
        self
    }
}

/// Scored output of one page plus a count of cards that could not be read.
#[derive(Debug, Default)]
pub struct PageReport {
    pub records: Vec<ScoredRecord>,
    pub skipped_cards: usize,
}

/// Score a single candidate record.
#[must_use]
pub fn score_record(
    candidate: CandidateRecord,
    source_domain: &str,
    config: &ScoringConfig,
    extracted_at: DateTime<Utc>,
) -> ScoredRecord {
    let signals = normalize_signals(&candidate, config);
    let score = compute_trust_score(&signals, &config.weights);
    ScoredRecord::new(candidate, source_domain, score, extracted_at)
}

/// Extract and score every card on `page`.
///
/// All records from one page share `extracted_at`.
#[must_use]
pub fn score_page<E: Element>(
    page: &E,
    context: &PageContext,
    config: &ScoringConfig,
    selectors: &CardSelectors,
    extracted_at: DateTime<Utc>,
) -> PageReport {
    let extraction = extract_candidates(page, selectors, context.page_url.as_deref());
    let skipped_cards = extraction.skipped.len();

    let records: Vec<ScoredRecord> = extraction
        .records
        .into_iter()
        .map(|candidate| score_record(candidate, &context.source_domain, config, extracted_at))
        .collect();

    tracing::debug!(
        domain = %context.source_domain,
        scored = records.len(),
        skipped = skipped_cards,
        "page scored"
    );

    PageReport {
        records,
        skipped_cards,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::document::HtmlPage;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    const PAGE: &str = r#"<html><body>
<div class="product-card">
  <h2>Shenzhen Bright Electronics</h2>
  <span class="price">45</span>
  <span class="moq">500</span>
  <ul class="certifications"><li>ISO9001</li></ul>
  <span class="years-active">3</span>
  <span class="review-count">200</span>
  <span class="response-rate">90%</span>
</div>
<div class="product-card"><img src="broken.png"></div>
<div class="product-card"><span class="price">12</span></div>
</body></html>"#;

    #[test]
    fn page_is_scored_and_bad_cards_counted() {
        let page = HtmlPage::parse(PAGE);
        let context =
            PageContext::new("Www.Example.COM").with_page_url("https://www.example.com/parts");
        let report = score_page(
            &page.root(),
            &context,
            &ScoringConfig::default(),
            &CardSelectors::default(),
            at(),
        );

        assert_eq!(report.skipped_cards, 1);
        assert_eq!(report.records.len(), 2);

        let first = &report.records[0];
        assert_eq!(first.trust_score(), 73);
        assert_eq!(first.score_confidence(), 1.0);
        assert_eq!(first.source_domain(), "www.example.com");
        assert_eq!(first.extracted_at(), at());
        assert_eq!(first.record().category.as_deref(), Some("parts"));

        // Unnamed records are still scored; they just have no identity.
        let second = &report.records[1];
        assert!(second.identity().is_none());
        assert!(second.score_confidence() > 0.0);
    }

    #[test]
    fn score_record_on_empty_candidate_is_baseline() {
        let scored = score_record(
            CandidateRecord::default(),
            "example.com",
            &ScoringConfig::default(),
            at(),
        );
        assert_eq!(scored.trust_score(), 50);
        assert_eq!(scored.score_confidence(), 0.0);
    }

    #[test]
    fn scoring_is_deterministic_across_runs() {
        let page = HtmlPage::parse(PAGE);
        let context = PageContext::new("example.com");
        let config = ScoringConfig::default();
        let selectors = CardSelectors::default();
        let a = score_page(&page.root(), &context, &config, &selectors, at());
        let b = score_page(&page.root(), &context, &config, &selectors, at());
        assert_eq!(a.records, b.records);
    }
}
