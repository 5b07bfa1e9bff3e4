//! Historical archive discovery by date-range walking.
//!
//! The archive exposes one page set per calendar date at
//! `/{publication}/YYYY-MM-DD/`, paginated through `<link rel="next">`
//! tags. A date that never existed redirects to the publication's base
//! page; that redirect is a "date does not exist" signal, distinct from a
//! real 404 (which falls back to `/page-1/`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, error, info};

use crate::discovery::{deduplicate_discovered_articles, ArticleDiscoverer};
use crate::error::{FetchError, PipelineError, Result};
use crate::fetch::HttpFetcher;
use crate::models::DiscoveredArticle;

const DEFAULT_BASE_URL: &str = "https://gleaner.newspaperarchive.com";
const DEFAULT_PUBLICATION: &str = "kingston-gleaner";

/// Archive date-range walker.
pub struct ArchiveDiscoverer {
    fetcher: HttpFetcher,
    base_url: String,
    publication: String,
    end_date: DateTime<Utc>,
    days_back: u32,
    crawl_delay: Duration,
}

/// Tunables shared by the constructors.
#[derive(Debug, Clone)]
pub struct ArchivePolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_backoff: f64,
    pub crawl_delay: Duration,
}

impl Default for ArchivePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_backoff: 2.0,
            crawl_delay: Duration::from_secs(2),
        }
    }
}

impl ArchiveDiscoverer {
    pub fn new(
        base_url: impl Into<String>,
        publication: impl Into<String>,
        end_date: DateTime<Utc>,
        days_back: u32,
        policy: ArchivePolicy,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let publication = publication.into();

        info!(
            base_url = %base_url,
            publication = %publication,
            end_date = %end_date.date_naive(),
            days_back,
            "Initialized archive discoverer"
        );

        Self {
            fetcher: HttpFetcher::with_policy(
                policy.timeout,
                policy.max_retries,
                policy.base_backoff,
            ),
            base_url,
            publication,
            end_date,
            days_back,
            crawl_delay: policy.crawl_delay,
        }
    }

    /// Discoverer covering an entire month (inclusive).
    pub fn for_month(year: i32, month: u32, policy: ArchivePolicy) -> Result<Self> {
        validate_year(year)?;
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            PipelineError::InvalidInput(format!("Invalid month: {month} (must be between 1-12)"))
        })?;
        let last = last_day_of_month(year, month);
        let days_back = (last - first).num_days() as u32;

        Ok(Self::new(
            DEFAULT_BASE_URL,
            DEFAULT_PUBLICATION,
            midnight_utc(last),
            days_back,
            policy,
        ))
    }

    /// Discoverer covering a single date, useful for retrying individual
    /// dates that failed during bulk discovery.
    pub fn for_date(year: i32, month: u32, day: u32, policy: ArchivePolicy) -> Result<Self> {
        validate_year(year)?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            PipelineError::InvalidInput(format!(
                "Invalid date: {year}-{month:02}-{day:02}"
            ))
        })?;

        Ok(Self::new(
            DEFAULT_BASE_URL,
            DEFAULT_PUBLICATION,
            midnight_utc(date),
            0,
            policy,
        ))
    }

    fn base_page(&self) -> String {
        format!("{}/{}/", self.base_url, self.publication)
    }

    fn date_url(&self, date: NaiveDate, page: Option<u32>) -> String {
        match page {
            None => format!("{}/{}/{}/", self.base_url, self.publication, date),
            Some(n) => format!("{}/{}/{}/page-{n}/", self.base_url, self.publication, date),
        }
    }

    /// Dates from `end_date - days_back` through `end_date`, inclusive.
    fn date_range(&self) -> Vec<NaiveDate> {
        let end = self.end_date.date_naive();
        let start = end - chrono::Duration::days(self.days_back as i64);
        start.iter_days().take_while(|d| *d <= end).collect()
    }

    /// Walk every page of one date. Returns an empty list when the date
    /// does not exist in the archive.
    async fn discover_pages_for_date(
        &self,
        date: NaiveDate,
        news_source_id: i32,
    ) -> Result<Vec<DiscoveredArticle>> {
        let base_page = self.base_page();
        let first_url = self.date_url(date, None);
        debug!(url = %first_url, "Trying base date URL");

        let (mut current_url, mut html) =
            match self.fetcher.fetch_page(&first_url, Some(&base_page)).await {
                Ok(page) => (first_url, page.body),
                Err(FetchError::RedirectedToBase { .. }) => {
                    info!(date = %date, "Date does not exist in archive (redirected), skipping");
                    return Ok(Vec::new());
                }
                Err(err) if err.status() == Some(404) => {
                    let page_1 = self.date_url(date, Some(1));
                    debug!(url = %page_1, "Base URL returned 404, trying page-1");
                    let page = self.fetcher.fetch_page(&page_1, Some(&base_page)).await?;
                    (page_1, page.body)
                }
                Err(err) => return Err(err.into()),
            };

        let mut articles = Vec::new();
        let mut page_count = 1u32;

        loop {
            articles.push(self.page_to_article(&current_url, &html, news_source_id)?);
            debug!(url = %current_url, "Discovered archive page");

            let Some(next_url) = parse_next_page_url(&html) else {
                debug!(date = %date, pages = page_count, "No more pages for date");
                break;
            };

            tokio::time::sleep(self.crawl_delay).await;

            debug!(url = %next_url, "Following next link");
            let page = self.fetcher.fetch_page(&next_url, Some(&base_page)).await?;
            current_url = next_url;
            html = page.body;
            page_count += 1;
        }

        Ok(articles)
    }

    fn page_to_article(
        &self,
        url: &str,
        html: &str,
        news_source_id: i32,
    ) -> Result<DiscoveredArticle> {
        DiscoveredArticle::new(
            url,
            news_source_id,
            "archive",
            Utc::now(),
            extract_page_title(html),
            parse_date_from_url(url),
        )
    }
}

#[async_trait]
impl ArticleDiscoverer for ArchiveDiscoverer {
    async fn discover(&self, news_source_id: i32) -> Result<Vec<DiscoveredArticle>> {
        if news_source_id <= 0 {
            return Err(PipelineError::InvalidInput(format!(
                "news_source_id must be positive, got: {news_source_id}"
            )));
        }

        let dates = self.date_range();
        info!(
            news_source_id,
            dates = dates.len(),
            from = %dates[0],
            to = %dates[dates.len() - 1],
            "Starting archive discovery"
        );

        let mut all_articles = Vec::new();
        for date in &dates {
            match self.discover_pages_for_date(*date, news_source_id).await {
                Ok(articles) => {
                    info!(date = %date, articles = articles.len(), "Date discovered");
                    all_articles.extend(articles);
                }
                Err(err) => {
                    error!(date = %date, error = %err, "Failed to discover pages for date, continuing");
                }
            }
        }

        let deduplicated = deduplicate_discovered_articles(all_articles);
        info!(
            unique = deduplicated.len(),
            dates = dates.len(),
            "Archive discovery complete"
        );

        Ok(deduplicated)
    }
}

fn validate_year(year: i32) -> Result<()> {
    if !(1900..=3000).contains(&year) {
        return Err(PipelineError::InvalidInput(format!(
            "Invalid year: {year} (must be between 1900-3000)"
        )));
    }
    Ok(())
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month.expect("valid successor month") - chrono::Duration::days(1)
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
}

/// `<link rel="next" href="...">` target, if present.
fn parse_next_page_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("link[rel=\"next\"]").expect("static selector");
    document
        .select(&selector)
        .next()
        .and_then(|e| e.value().attr("href"))
        .map(|href| href.to_string())
        .filter(|href| !href.is_empty())
}

/// Page title from `og:title` metadata, falling back to `<title>`.
fn extract_page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let og = Selector::parse("meta[property=\"og:title\"]").expect("static selector");
    if let Some(title) = document
        .select(&og)
        .next()
        .and_then(|e| e.value().attr("content"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(title.to_string());
    }

    let title_tag = Selector::parse("title").expect("static selector");
    document
        .select(&title_tag)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Published date from the `/YYYY-MM-DD/` URL component, at UTC midnight.
fn parse_date_from_url(url: &str) -> Option<DateTime<Utc>> {
    let re = Regex::new(r"/(\d{4}-\d{2}-\d{2})/").expect("valid regex");
    let date_str = re.captures(url)?.get(1)?.as_str();
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .ok()
        .map(midnight_utc)
}
