//! Archive discovery entry point with JSONL export.
//!
//! Discovers articles from the Gleaner newspaper archive month by month
//! using parallel workers and writes results to JSONL for pipeline
//! ingestion. A month whose discovery fails outright produces a stub
//! lead pointing at the month's first date, so failed months can be
//! retried later.
//!
//! ```text
//! discover_archive --year 2021 --start-month 9 --end-month 11 --workers 3
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use clap::Parser;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use graftwatch::config::init_tracing;
use graftwatch::discovery::archive::{ArchiveDiscoverer, ArchivePolicy};
use graftwatch::discovery::{deduplicate_discovered_articles, ArticleDiscoverer};
use graftwatch::models::DiscoveredArticle;
use graftwatch::services::batch::write_jsonl_articles;

#[derive(Parser, Debug)]
#[command(
    name = "discover_archive",
    about = "Discover Gleaner archive articles and export them as JSONL"
)]
struct Args {
    /// Year to discover (e.g. 2021)
    #[arg(long)]
    year: i32,

    /// Starting month (1-12, inclusive)
    #[arg(long)]
    start_month: u32,

    /// Ending month (1-12, inclusive)
    #[arg(long)]
    end_month: u32,

    /// Maximum number of parallel workers
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Delay between page requests in seconds
    #[arg(long, default_value_t = 0.5)]
    crawl_delay: f64,

    /// Database ID of the news source
    #[arg(long, default_value_t = 1)]
    news_source_id: i32,

    /// Output directory path
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

struct MonthDiscoveryResult {
    year: i32,
    month: u32,
    articles: Vec<DiscoveredArticle>,
    success: bool,
}

/// Discover one month; on failure, emit a stub lead for retry tracking.
async fn discover_month(
    year: i32,
    month: u32,
    news_source_id: i32,
    policy: ArchivePolicy,
) -> MonthDiscoveryResult {
    info!(year, month, "Worker started");

    let outcome = async {
        let discoverer = ArchiveDiscoverer::for_month(year, month, policy)?;
        discoverer.discover(news_source_id).await
    }
    .await;

    match outcome {
        Ok(articles) => {
            info!(year, month, articles = articles.len(), "Worker completed");
            MonthDiscoveryResult {
                year,
                month,
                articles,
                success: true,
            }
        }
        Err(err) => {
            error!(year, month, error = %err, "Worker failed");

            let stub = DiscoveredArticle::new(
                format!(
                    "https://gleaner.newspaperarchive.com/kingston-gleaner/{year}-{month:02}-01/"
                ),
                news_source_id,
                "archive",
                Utc::now(),
                Some(format!("FAILED: {year}-{month:02}")),
                Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single(),
            )
            .expect("stub lead is always valid");

            MonthDiscoveryResult {
                year,
                month,
                articles: vec![stub],
                success: false,
            }
        }
    }
}

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    if !(1..=12).contains(&args.start_month) || !(1..=12).contains(&args.end_month) {
        error!("Months must be between 1 and 12");
        return 1;
    }
    if args.start_month > args.end_month {
        error!(
            start_month = args.start_month,
            end_month = args.end_month,
            "start-month must not be after end-month"
        );
        return 1;
    }

    let months: Vec<u32> = (args.start_month..=args.end_month).collect();
    info!(
        year = args.year,
        months = months.len(),
        workers = args.workers,
        crawl_delay = args.crawl_delay,
        "Starting parallel archive discovery"
    );

    let policy = ArchivePolicy {
        crawl_delay: Duration::from_secs_f64(args.crawl_delay),
        ..ArchivePolicy::default()
    };

    let semaphore = Arc::new(Semaphore::new(args.workers.max(1)));
    let tasks = months.into_iter().map(|month| {
        let semaphore = semaphore.clone();
        let policy = policy.clone();
        async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("discovery semaphore is never closed");
            discover_month(args.year, month, args.news_source_id, policy).await
        }
    });

    let results = join_all(tasks).await;

    let mut success_articles = Vec::new();
    let mut failure_articles = Vec::new();
    let mut failed_months = Vec::new();

    for result in results {
        if result.success {
            success_articles.extend(result.articles);
        } else {
            failure_articles.extend(result.articles);
            failed_months.push(format!("{}-{:02}", result.year, result.month));
        }
    }

    if !failed_months.is_empty() {
        warn!(months = %failed_months.join(", "), "Failed months");
    }

    let success_articles = deduplicate_discovered_articles(success_articles);
    let failure_articles = deduplicate_discovered_articles(failure_articles);

    let prefix = format!(
        "gleaner_archive_{}_{:02}-{:02}",
        args.year, args.start_month, args.end_month
    );
    let success_path = args.output_dir.join(format!("{prefix}.jsonl"));
    let failures_path = args.output_dir.join(format!("{prefix}-failures.jsonl"));

    if let Err(err) = write_jsonl_articles(&success_path, &success_articles) {
        error!(error = %err, "Failed to write success file");
        return 1;
    }
    info!(
        articles = success_articles.len(),
        file = %success_path.display(),
        "Wrote discovered articles"
    );

    if !failure_articles.is_empty() {
        if let Err(err) = write_jsonl_articles(&failures_path, &failure_articles) {
            error!(error = %err, "Failed to write failures file");
            return 1;
        }
        info!(
            stubs = failure_articles.len(),
            file = %failures_path.display(),
            "Wrote failure stubs for retry"
        );
    }

    0
}
