//! HTTP fetcher with retry, backoff and terminal/transient error
//! classification.
//!
//! One `HttpFetcher` owns a pooled `reqwest::Client`; batch workloads keep
//! a single fetcher alive across many calls so TCP connections are reused.
//! Constructing a fetcher ad-hoc for a one-shot call is also fine.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, error, warn};

use crate::error::FetchError;

/// Browser-like User-Agent sent with every request.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Per-attempt deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A fetched page together with the URL the request ended up at after
/// redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub body: String,
}

/// HTTP fetcher shared by extractors and discoverers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
    base_backoff: f64,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_policy(DEFAULT_TIMEOUT, 3, 2.0)
    }

    /// Build a fetcher with an explicit retry policy. Backoff before
    /// attempt `n + 1` is `base_backoff^n` seconds (2, 4, 8 with the
    /// defaults).
    pub fn with_policy(timeout: Duration, max_retries: u32, base_backoff: f64) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .expect("reqwest client construction cannot fail with static options");

        Self {
            client,
            max_retries,
            base_backoff,
        }
    }

    /// Fetch a URL, returning the response body.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_page(url, None).await.map(|page| page.body)
    }

    /// Fetch a URL, reporting the final URL after redirects.
    ///
    /// When `base_redirect` is given and the request lands on exactly that
    /// page, the fetch fails immediately with
    /// [`FetchError::RedirectedToBase`] and is never retried. The archive
    /// walker uses this to distinguish "date does not exist" from a real
    /// 404.
    pub async fn fetch_page(
        &self,
        url: &str,
        base_redirect: Option<&str>,
    ) -> Result<FetchedPage, FetchError> {
        let mut last_message = String::new();

        for attempt in 1..=self.max_retries {
            match self.attempt(url, base_redirect).await {
                Ok(page) => return Ok(page),
                Err(err) if err.is_retryable() => {
                    last_message = err.to_string();
                    if attempt < self.max_retries {
                        let backoff = self.base_backoff.powi(attempt as i32);
                        warn!(
                            url,
                            attempt,
                            max_retries = self.max_retries,
                            backoff_secs = backoff,
                            error = %err,
                            "Fetch attempt failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_secs_f64(backoff)).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        error!(
            url,
            max_retries = self.max_retries,
            "Fetch failed after all retries"
        );
        Err(FetchError::Terminal {
            url: url.to_string(),
            status: None,
            message: format!(
                "failed after {} attempts: {last_message}",
                self.max_retries
            ),
        })
    }

    async fn attempt(
        &self,
        url: &str,
        base_redirect: Option<&str>,
    ) -> Result<FetchedPage, FetchError> {
        debug!(url, "Fetching");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transient {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let final_url = response.url().to_string();

        if let Some(base) = base_redirect {
            if final_url != url
                && (final_url.trim_end_matches('/') == base.trim_end_matches('/'))
            {
                return Err(FetchError::RedirectedToBase {
                    url: url.to_string(),
                    redirect_url: final_url,
                });
            }
        }

        let status = response.status();
        classify_status(url, status)?;

        let body = response.text().await.map_err(|e| FetchError::Transient {
            url: url.to_string(),
            message: format!("failed reading body: {e}"),
        })?;

        debug!(url, bytes = body.len(), "Fetched successfully");
        Ok(FetchedPage { final_url, body })
    }
}

fn classify_status(url: &str, status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    if status.is_server_error() {
        return Err(FetchError::Transient {
            url: url.to_string(),
            message: format!("HTTP {status}"),
        });
    }
    Err(FetchError::Terminal {
        url: url.to_string(),
        status: Some(status.as_u16()),
        message: format!("HTTP {status}"),
    })
}
