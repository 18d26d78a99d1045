//! Crawl command: load pages, score them, and upsert into a record store.
//!
//! Pages run with bounded concurrency. A page that cannot be loaded is
//! logged and counted, never fatal, unless every page fails.

use std::fmt;
use std::path::PathBuf;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use supplydb_core::{AppConfig, ScoringConfig};
use supplydb_db::{DbError, RecordStore};
use supplydb_scraper::{score_page, CardSelectors, HtmlPage, PageClient, PageContext};

/// Where a listing page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageSource {
    File(PathBuf),
    Url(String),
}

impl PageSource {
    pub(crate) fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(raw.to_owned())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    pub(crate) fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl fmt::Display for PageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

pub(crate) struct CrawlOptions<'a> {
    /// Overrides the URL host; required for file sources.
    pub domain: Option<&'a str>,
    pub max_concurrent_pages: usize,
}

/// Per-page counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageTotals {
    pub records: usize,
    pub upserted: usize,
    pub skipped_cards: usize,
    pub unidentified: usize,
    pub store_errors: usize,
}

/// Aggregated counts for one crawl run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CrawlTotals {
    pub pages: usize,
    pub failed_pages: usize,
    pub records: usize,
    pub upserted: usize,
    pub skipped_cards: usize,
    pub unidentified: usize,
    pub store_errors: usize,
}

impl CrawlTotals {
    fn add(&mut self, page: PageTotals) {
        self.records += page.records;
        self.upserted += page.upserted;
        self.skipped_cards += page.skipped_cards;
        self.unidentified += page.unidentified;
        self.store_errors += page.store_errors;
    }

    pub(crate) fn summary(&self) -> String {
        format!(
            "crawled {} page(s) ({} failed): {} record(s), {} upserted, \
             {} card(s) skipped, {} unidentified, {} store error(s)",
            self.pages,
            self.failed_pages,
            self.records,
            self.upserted,
            self.skipped_cards,
            self.unidentified,
            self.store_errors
        )
    }
}

/// Page client with the configured timeout, user agent and fetch retries.
pub(crate) fn build_page_client(config: &AppConfig) -> anyhow::Result<PageClient> {
    let client = PageClient::new(config.scraper_request_timeout_secs, &config.scraper_user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build page client: {e}"))?;
    Ok(client.with_retries(config.scraper_max_retries, config.scraper_backoff_base_ms))
}

struct LoadedPage {
    body: String,
    context: PageContext,
}

async fn load_page(
    source: &PageSource,
    client: Option<&PageClient>,
    domain: Option<&str>,
) -> anyhow::Result<LoadedPage> {
    match source {
        PageSource::File(path) => {
            let domain = domain.ok_or_else(|| {
                anyhow::anyhow!("--domain is required for local file {}", path.display())
            })?;
            let body = tokio::fs::read_to_string(path).await?;
            Ok(LoadedPage {
                body,
                context: PageContext::new(domain),
            })
        }
        PageSource::Url(url) => {
            let client =
                client.ok_or_else(|| anyhow::anyhow!("no page client configured for {url}"))?;
            let fetched = client.fetch(url).await?;
            let domain = domain.map_or(fetched.domain, str::to_owned);
            Ok(LoadedPage {
                body: fetched.body,
                context: PageContext::new(domain).with_page_url(fetched.url),
            })
        }
    }
}

async fn process_page<S: RecordStore>(
    store: &S,
    client: Option<&PageClient>,
    source: &PageSource,
    scoring: &ScoringConfig,
    selectors: &CardSelectors,
    domain: Option<&str>,
) -> anyhow::Result<PageTotals> {
    let page = load_page(source, client, domain).await?;

    // The parsed document is dropped before any await.
    let report = {
        let html = HtmlPage::parse(&page.body);
        score_page(&html.root(), &page.context, scoring, selectors, Utc::now())
    };

    let mut totals = PageTotals {
        records: report.records.len(),
        skipped_cards: report.skipped_cards,
        ..PageTotals::default()
    };

    for record in &report.records {
        match store.upsert(record).await {
            Ok(_) => totals.upserted += 1,
            Err(DbError::MissingIdentity { .. }) => totals.unidentified += 1,
            Err(err) => {
                tracing::error!(source = %source, error = %err, "failed to store record");
                totals.store_errors += 1;
            }
        }
    }

    tracing::info!(
        source = %source,
        domain = %page.context.source_domain,
        records = totals.records,
        upserted = totals.upserted,
        skipped_cards = totals.skipped_cards,
        unidentified = totals.unidentified,
        "page processed"
    );
    Ok(totals)
}

/// Process every source and upsert the scored records into `store`.
///
/// # Errors
///
/// Returns an error only if there were sources and every one of them failed
/// to load.
pub(crate) async fn run_crawl<S: RecordStore>(
    store: &S,
    client: Option<&PageClient>,
    sources: &[PageSource],
    scoring: &ScoringConfig,
    options: &CrawlOptions<'_>,
) -> anyhow::Result<CrawlTotals> {
    let selectors = CardSelectors::default();
    let max_concurrent = options.max_concurrent_pages.max(1);

    let results: Vec<(&PageSource, anyhow::Result<PageTotals>)> = stream::iter(sources)
        .map(|source| {
            let fut = process_page(store, client, source, scoring, &selectors, options.domain);
            async move { (source, fut.await) }
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    let mut totals = CrawlTotals {
        pages: sources.len(),
        ..CrawlTotals::default()
    };
    for (source, outcome) in results {
        match outcome {
            Ok(page) => totals.add(page),
            Err(e) => {
                tracing::error!(source = %source, error = %e, "failed to process page");
                totals.failed_pages += 1;
            }
        }
    }

    if totals.failed_pages > 0 {
        tracing::warn!(
            failed_pages = totals.failed_pages,
            total_pages = totals.pages,
            "some pages failed during crawl"
        );
    }
    if totals.pages > 0 && totals.failed_pages == totals.pages {
        anyhow::bail!("all {} page(s) failed to load", totals.pages);
    }

    Ok(totals)
}
