//! Batch processing entry point.
//!
//! Reads discovered article URLs from a JSONL file and runs them through
//! the full pipeline with bounded concurrency.
//!
//! ```text
//! process_batch --input output/gleaner_archive_2021_11-11.jsonl \
//!     --concurrency 4 --skip-existing
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use graftwatch::config::{init_tracing, AppConfig};
use graftwatch::database::Database;
use graftwatch::services::{BatchOptions, BatchProcessor, OrchestrationService};

#[derive(Parser, Debug)]
#[command(
    name = "process_batch",
    about = "Process discovered articles through the ingestion pipeline"
)]
struct Args {
    /// Path to JSONL file with discovered articles
    #[arg(long)]
    input: PathBuf,

    /// Max concurrent article processing (range: 1-10)
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Pre-query the database for existing URLs and skip them
    #[arg(long)]
    skip_existing: bool,

    /// Classify articles but roll every transaction back (no writes)
    #[arg(long)]
    dry_run: bool,

    /// Minimum confidence threshold for relevance (range: 0.0-1.0)
    #[arg(long, default_value_t = 0.7)]
    min_confidence: f64,

    /// Output directory for reports
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let options = BatchOptions {
        input: args.input,
        concurrency: args.concurrency,
        min_confidence: args.min_confidence,
        skip_existing: args.skip_existing,
        dry_run: args.dry_run,
        output_dir: args.output_dir,
    };

    if let Err(err) = options.validate() {
        error!(error = %err, "Invalid arguments");
        return 1;
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Configuration error");
            return 1;
        }
    };

    info!(
        input = %options.input.display(),
        concurrency = options.concurrency,
        min_confidence = options.min_confidence,
        skip_existing = options.skip_existing,
        dry_run = options.dry_run,
        "Batch processing started"
    );

    // Pool sized to the worker count: each worker holds at most one
    // connection, with headroom for the pre-filter query.
    let database = match Database::with_pool_size(
        &config.database.url,
        options.concurrency as u32,
        (options.concurrency * 2) as u32,
        Duration::from_secs(60),
    )
    .await
    {
        Ok(db) => db,
        Err(err) => {
            error!(error = %err, "Failed to initialize database pool");
            return 1;
        }
    };

    let service = Arc::new(OrchestrationService::production(&config));
    let processor = BatchProcessor::new(service, database.pool());

    let exit_code = match processor.run(&options).await {
        Ok(report) => {
            info!(
                processed = report.summary.processed,
                stored = report.summary.stored,
                errors = report.summary.total_errors,
                "Batch processing completed successfully"
            );
            0
        }
        Err(err) => {
            error!(error = %err, "Fatal error");
            1
        }
    };

    database.close().await;
    exit_code
}
