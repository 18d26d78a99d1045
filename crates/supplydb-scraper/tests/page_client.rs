//! Integration tests for `PageClient::fetch` and the fetch → score path.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made.

use chrono::Utc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use supplydb_core::ScoringConfig;
use supplydb_scraper::{score_page, CardSelectors, HtmlPage, PageClient, PageContext, ScraperError};

const LISTING: &str = r#"<html><body>
<div class="product-card">
  <h2>Ningbo Harbor Textiles</h2>
  <span class="price">25</span>
  <span class="moq">300 meters</span>
  <ul class="certifications"><li>ISO9001</li><li>BSCI</li></ul>
  <span class="years-active">12</span>
  <span class="review-count">40</span>
  <span class="response-rate">95%</span>
</div>
</body></html>"#;

fn test_client() -> PageClient {
    PageClient::new(5, "supplydb-test/0.1").expect("failed to build test PageClient")
}

#[tokio::test]
async fn fetch_returns_body_and_domain() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/textiles"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&server)
        .await;

    let page = test_client()
        .fetch(&format!("{}/textiles", server.uri()))
        .await
        .expect("fetch should succeed");

    assert_eq!(page.domain, "127.0.0.1");
    assert!(page.url.ends_with("/textiles"));
    assert!(page.body.contains("Ningbo Harbor Textiles"));
}

#[tokio::test]
async fn fetched_page_scores_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/textiles"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&server)
        .await;

    let fetched = test_client()
        .fetch(&format!("{}/textiles", server.uri()))
        .await
        .unwrap();
    let html = HtmlPage::parse(&fetched.body);
    let context = PageContext::new(fetched.domain.clone()).with_page_url(fetched.url.clone());
    let report = score_page(
        &html.root(),
        &context,
        &ScoringConfig::default(),
        &CardSelectors::default(),
        Utc::now(),
    );

    assert_eq!(report.skipped_cards, 0);
    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.score_confidence(), 1.0);
    assert_eq!(record.record().category.as_deref(), Some("textiles"));
    let identity = record.identity().expect("named record has identity");
    assert_eq!(identity.name(), "ningbo harbor textiles");
    assert_eq!(identity.domain(), "127.0.0.1");
}

#[tokio::test]
async fn fetch_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = test_client()
        .fetch(&format!("{}/missing", server.uri()))
        .await;
    assert!(
        matches!(result, Err(ScraperError::NotFound { .. })),
        "expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_maps_500_to_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = test_client().fetch(&server.uri()).await;
    assert!(matches!(
        result,
        Err(ScraperError::UnexpectedStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn fetch_reports_rate_limit_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let result = test_client().fetch(&server.uri()).await;
    match result {
        Err(ScraperError::RateLimited {
            retry_after_secs, ..
        }) => assert_eq!(retry_after_secs, 7),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_retries_rate_limit_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&server)
        .await;

    let client = test_client().with_retries(2, 0);
    let page = client.fetch(&server.uri()).await.expect("retry should succeed");
    assert!(page.body.contains("product-card"));
}

#[tokio::test]
async fn fetch_rejects_relative_url_without_network() {
    let result = test_client().fetch("suppliers/list.html").await;
    assert!(matches!(result, Err(ScraperError::InvalidUrl { .. })));
}
