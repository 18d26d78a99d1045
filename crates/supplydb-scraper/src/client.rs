use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use supplydb_core::normalize_domain;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

/// A listing page as fetched from the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects.
    pub url: String,
    /// Normalized host of `url`; becomes each record's source domain.
    pub domain: String,
    pub body: String,
}

/// HTTP client for supplier listing pages.
///
/// 429 and network failures are retried with exponential backoff; 404 and
/// other non-2xx statuses are returned as typed errors without retrying.
pub struct PageClient {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

/// Host of `url`, normalized the same way as supplier identities.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if `url` does not parse or has no host.
pub fn page_domain(url: &str) -> Result<String, ScraperError> {
    let parsed = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;
    parsed
        .host_str()
        .map(normalize_domain)
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: "URL has no host".to_owned(),
        })
}

impl PageClient {
    /// Creates a `PageClient` with the given timeout and `User-Agent`, and no retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Enable retries for transient failures.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Fetch one listing page.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `url` is not an absolute URL with a host.
    /// - [`ScraperError::RateLimited`] on HTTP 429 after retries are exhausted.
    /// - [`ScraperError::NotFound`] on HTTP 404.
    /// - [`ScraperError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ScraperError::Http`] on network or body-read failure after retries.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let domain = page_domain(url)?;

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let domain = domain.clone();
            async move {
                let response = self.client.get(url).send().await?;
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited {
                        domain,
                        retry_after_secs,
                    });
                }
                if status == StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound {
                        url: url.to_owned(),
                    });
                }
                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_owned(),
                    });
                }

                let final_url = response.url().to_string();
                let final_domain = page_domain(&final_url).unwrap_or(domain);
                let body = response.text().await?;
                tracing::debug!(url, domain = %final_domain, bytes = body.len(), "page fetched");

                Ok(FetchedPage {
                    url: final_url,
                    domain: final_domain,
                    body,
                })
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
