//! Batch driver: bounded-concurrency processing of discovered article
//! files.
//!
//! Reads a JSONL file of leads, optionally pre-filters URLs already in
//! the corpus, then drains the remainder through the orchestration
//! pipeline with `N` workers behind a semaphore. Every worker checks one
//! pooled connection out per URL; dry runs wrap the pipeline call in a
//! transaction that is always rolled back. The run always produces a
//! summary JSON and a per-error JSONL, however many URLs failed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use sqlx::{Acquire, PgPool};
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

use crate::error::{PipelineError, Result};
use crate::models::orchestration::{classify_error, ErrorCategory};
use crate::models::{DiscoveredArticle, OrchestrationResult};
use crate::repositories::ArticleRepository;
use crate::services::orchestration::unexpected_error_result;
use crate::services::OrchestrationService;

/// How often the live statistics are re-rendered.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Batch run options, mirroring the CLI surface.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input: PathBuf,
    pub concurrency: usize,
    pub min_confidence: f64,
    pub skip_existing: bool,
    pub dry_run: bool,
    pub output_dir: PathBuf,
}

impl BatchOptions {
    pub fn validate(&self) -> Result<()> {
        if !(1..=10).contains(&self.concurrency) {
            return Err(PipelineError::InvalidInput(format!(
                "concurrency must be between 1 and 10, got: {}",
                self.concurrency
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(PipelineError::InvalidInput(format!(
                "min_confidence must be between 0.0 and 1.0, got: {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

/// Counter block guarded by the statistics mutex.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Counters {
    pub total: usize,
    pub processed: usize,
    pub extracted: usize,
    pub classified: usize,
    pub relevant: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub skipped_existing: usize,
    pub extraction_errors: usize,
    pub classification_errors: usize,
    pub storage_errors: usize,
    pub other_errors: usize,
}

impl Counters {
    pub fn total_errors(&self) -> usize {
        self.extraction_errors + self.classification_errors + self.storage_errors
            + self.other_errors
    }
}

/// Point-in-time view of a running batch.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    #[serde(flatten)]
    pub counters: Counters,
    pub elapsed_seconds: f64,
    pub articles_per_second: f64,
}

/// Shared statistics: one mutex guards all counters; snapshots copy them
/// atomically. Workers never hold the lock across I/O.
pub struct BatchStatistics {
    counters: Mutex<Counters>,
    start: Instant,
}

impl BatchStatistics {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(Counters::default()),
            start: Instant::now(),
        }
    }

    pub async fn update(&self, apply: impl FnOnce(&mut Counters)) {
        let mut counters = self.counters.lock().await;
        apply(&mut counters);
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        let counters = self.counters.lock().await.clone();
        let elapsed = self.start.elapsed().as_secs_f64();
        let articles_per_second = if elapsed > 0.0 {
            counters.processed as f64 / elapsed
        } else {
            0.0
        };
        StatsSnapshot {
            counters,
            elapsed_seconds: elapsed,
            articles_per_second,
        }
    }

    /// Fold one pipeline result into the counters.
    pub async fn record_result(&self, result: &OrchestrationResult) {
        let category = classify_error(result);
        let is_duplicate = result.is_duplicate();
        self.update(|c| {
            c.processed += 1;
            if result.extracted {
                c.extracted += 1;
            }
            if result.classified {
                c.classified += 1;
            }
            if result.relevant {
                c.relevant += 1;
            }
            if result.stored {
                c.stored += 1;
            }
            if is_duplicate {
                c.duplicates += 1;
            }
            match category {
                ErrorCategory::None => {}
                ErrorCategory::Extraction => c.extraction_errors += 1,
                ErrorCategory::Classification => c.classification_errors += 1,
                ErrorCategory::Storage => c.storage_errors += 1,
                ErrorCategory::Other => c.other_errors += 1,
            }
        })
        .await;
    }
}

impl Default for BatchStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Final report written to `batch_<timestamp>.json`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub errors_by_category: HashMap<String, usize>,
    pub performance: ReportPerformance,
    pub outcomes: ReportOutcomes,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub input_file: String,
    pub dry_run: bool,
    pub concurrency: usize,
    pub min_confidence: f64,
    pub skip_existing: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_articles: usize,
    pub processed: usize,
    pub extracted: usize,
    pub classified: usize,
    pub relevant: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub skipped_existing: usize,
    pub total_errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportPerformance {
    pub elapsed_seconds: f64,
    pub articles_per_second: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportOutcomes {
    pub success_rate: String,
    pub relevance_rate: String,
    pub storage_rate: String,
}

#[derive(Debug, Serialize)]
struct ErrorRecord<'a> {
    url: &'a str,
    section: &'a str,
    error_category: &'a str,
    error_message: &'a str,
    extracted: bool,
    classified: bool,
    relevant: bool,
    stored: bool,
    timestamp: String,
}

/// Load and validate a JSONL file of discovered articles. Any JSON or
/// schema error aborts the batch with the offending line number.
pub fn load_jsonl_articles(path: &Path) -> Result<Vec<DiscoveredArticle>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::InvalidInput(format!("Cannot read input file {}: {e}", path.display()))
    })?;

    let mut articles = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut article: DiscoveredArticle = serde_json::from_str(line).map_err(|e| {
            PipelineError::InvalidInput(format!("Line {line_num}: Invalid JSON: {e}"))
        })?;
        article
            .validate()
            .map_err(|e| PipelineError::InvalidInput(format!("Line {line_num}: {e}")))?;
        articles.push(article);
    }

    info!(
        count = articles.len(),
        file = %path.display(),
        "Loaded articles from JSONL"
    );
    Ok(articles)
}

/// Serialize discovered articles to a JSONL file (one object per line).
pub fn write_jsonl_articles(path: &Path, articles: &[DiscoveredArticle]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PipelineError::InvalidInput(format!("Cannot create {}: {e}", parent.display()))
        })?;
    }

    let mut out = String::new();
    for article in articles {
        let line = serde_json::to_string(article)
            .map_err(|e| PipelineError::Unexpected(format!("serialization failed: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }

    std::fs::write(path, out).map_err(|e| {
        PipelineError::InvalidInput(format!("Cannot write {}: {e}", path.display()))
    })?;
    Ok(())
}

pub struct BatchProcessor {
    service: Arc<OrchestrationService>,
    pool: PgPool,
}

impl BatchProcessor {
    pub fn new(service: Arc<OrchestrationService>, pool: PgPool) -> Self {
        Self { service, pool }
    }

    /// Run a batch end-to-end and write both report artifacts.
    pub async fn run(&self, options: &BatchOptions) -> Result<BatchReport> {
        options.validate()?;

        let mut articles = load_jsonl_articles(&options.input)?;
        let stats = Arc::new(BatchStatistics::new());

        if options.skip_existing {
            articles = self.filter_existing(articles, &stats).await?;
        }

        stats
            .update(|c| c.total = articles.len())
            .await;

        if articles.is_empty() {
            warn!("No articles to process (all skipped or empty input)");
        } else {
            info!(
                articles = articles.len(),
                concurrency = options.concurrency,
                dry_run = options.dry_run,
                "Processing batch"
            );
        }

        let results = self.process_concurrent(&articles, options, &stats).await;

        let timestamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let report = self.build_report(options, &stats).await;
        write_report(&report, &options.output_dir, &timestamp)?;
        write_error_report(&results, &options.output_dir, &timestamp)?;

        let snapshot = stats.snapshot().await;
        info!(
            processed = snapshot.counters.processed,
            stored = snapshot.counters.stored,
            errors = snapshot.counters.total_errors(),
            "Batch processing complete"
        );

        Ok(report)
    }

    /// Batch-query the corpus for already-ingested URLs and drop them.
    async fn filter_existing(
        &self,
        articles: Vec<DiscoveredArticle>,
        stats: &BatchStatistics,
    ) -> Result<Vec<DiscoveredArticle>> {
        let urls: Vec<String> = articles.iter().map(|a| a.url.clone()).collect();

        let mut conn = self.pool.acquire().await?;
        let existing = ArticleRepository::new()
            .get_existing_urls(&mut conn, &urls)
            .await?;
        drop(conn);

        let filtered: Vec<DiscoveredArticle> = articles
            .into_iter()
            .filter(|a| !existing.contains(&a.url))
            .collect();

        info!(
            existing = existing.len(),
            to_process = filtered.len(),
            "Pre-query filter complete"
        );

        stats
            .update(|c| c.skipped_existing = existing.len())
            .await;

        Ok(filtered)
    }

    async fn process_concurrent(
        &self,
        articles: &[DiscoveredArticle],
        options: &BatchOptions,
        stats: &Arc<BatchStatistics>,
    ) -> Vec<OrchestrationResult> {
        let semaphore = Arc::new(Semaphore::new(options.concurrency));
        let total = articles.len();

        let progress = tokio::spawn(progress_reporter(stats.clone(), total));

        let tasks = articles.iter().map(|article| {
            let semaphore = semaphore.clone();
            let stats = stats.clone();
            let service = self.service.clone();
            let pool = self.pool.clone();
            let article = article.clone();
            let min_confidence = options.min_confidence;
            let dry_run = options.dry_run;

            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("batch semaphore is never closed");

                match process_single_article(&service, &pool, &article, min_confidence, dry_run)
                    .await
                {
                    Ok(result) => {
                        stats.record_result(&result).await;
                        result
                    }
                    Err(err) => {
                        // Unexpected failure outside the pipeline (pool
                        // acquire, transaction bookkeeping). Counted as
                        // "other"; the pool keeps draining.
                        error!(url = %article.url, error = %err, "Unexpected error processing article");
                        stats
                            .update(|c| {
                                c.processed += 1;
                                c.other_errors += 1;
                            })
                            .await;
                        unexpected_error_result(&article.url, &article.section, &err)
                    }
                }
            })
        });

        let mut results = Vec::with_capacity(total);
        for outcome in join_all(tasks).await {
            match outcome {
                Ok(result) => results.push(result),
                Err(join_err) => {
                    // A panicked worker still counts as processed.
                    error!(error = %join_err, "Batch worker panicked");
                    stats
                        .update(|c| {
                            c.processed += 1;
                            c.other_errors += 1;
                        })
                        .await;
                }
            }
        }

        progress.abort();
        let snapshot = stats.snapshot().await;
        log_progress(&snapshot, total);

        results
    }

    async fn build_report(&self, options: &BatchOptions, stats: &BatchStatistics) -> BatchReport {
        let snapshot = stats.snapshot().await;
        let c = &snapshot.counters;
        let total_errors = c.total_errors();

        let rate = |count: usize| -> String {
            if c.processed > 0 {
                format!("{:.1}%", count as f64 / c.processed as f64 * 100.0)
            } else {
                "0.0%".to_string()
            }
        };
        let success_count = c.processed.saturating_sub(total_errors);

        BatchReport {
            metadata: ReportMetadata {
                timestamp: Utc::now().to_rfc3339(),
                input_file: options.input.display().to_string(),
                dry_run: options.dry_run,
                concurrency: options.concurrency,
                min_confidence: options.min_confidence,
                skip_existing: options.skip_existing,
            },
            summary: ReportSummary {
                total_articles: c.total,
                processed: c.processed,
                extracted: c.extracted,
                classified: c.classified,
                relevant: c.relevant,
                stored: c.stored,
                duplicates: c.duplicates,
                skipped_existing: c.skipped_existing,
                total_errors,
            },
            errors_by_category: HashMap::from([
                ("extraction".to_string(), c.extraction_errors),
                ("classification".to_string(), c.classification_errors),
                ("storage".to_string(), c.storage_errors),
                ("other".to_string(), c.other_errors),
            ]),
            performance: ReportPerformance {
                elapsed_seconds: (snapshot.elapsed_seconds * 100.0).round() / 100.0,
                articles_per_second: (snapshot.articles_per_second * 100.0).round() / 100.0,
            },
            outcomes: ReportOutcomes {
                success_rate: rate(success_count),
                relevance_rate: rate(c.relevant),
                storage_rate: rate(c.stored),
            },
        }
    }
}

/// Process one article on one pooled connection. An error here means the
/// failure happened outside the pipeline itself (the pipeline captures
/// its own stage failures into the result).
async fn process_single_article(
    service: &OrchestrationService,
    pool: &PgPool,
    article: &DiscoveredArticle,
    min_confidence: f64,
    dry_run: bool,
) -> Result<OrchestrationResult> {
    let mut conn = pool.acquire().await.map_err(PipelineError::Storage)?;

    if dry_run {
        // Classification runs normally but nothing persists: the
        // orchestrator's storage transaction nests inside this one, and
        // the outer transaction is always rolled back.
        let mut tx = conn.begin().await.map_err(PipelineError::Storage)?;
        let result = service
            .process_article(
                &mut tx,
                &article.url,
                &article.section,
                article.news_source_id,
                min_confidence,
            )
            .await;
        tx.rollback().await.map_err(PipelineError::Storage)?;
        Ok(result)
    } else {
        let result = service
            .process_article(
                &mut conn,
                &article.url,
                &article.section,
                article.news_source_id,
                min_confidence,
            )
            .await;
        Ok(result)
    }
}

/// Periodically re-render the live statistics table until the batch
/// drains.
async fn progress_reporter(stats: Arc<BatchStatistics>, total: usize) {
    loop {
        tokio::time::sleep(PROGRESS_INTERVAL).await;
        let snapshot = stats.snapshot().await;
        log_progress(&snapshot, total);
        if total > 0 && snapshot.counters.processed >= total {
            break;
        }
    }
}

fn log_progress(snapshot: &StatsSnapshot, total: usize) {
    let c = &snapshot.counters;
    let percent = if total > 0 {
        c.processed as f64 / total as f64 * 100.0
    } else {
        100.0
    };
    info!(
        processed = c.processed,
        total,
        percent = format!("{percent:.1}%"),
        extracted = c.extracted,
        classified = c.classified,
        relevant = c.relevant,
        stored = c.stored,
        duplicates = c.duplicates,
        errors = c.total_errors(),
        articles_per_second = format!("{:.2}", snapshot.articles_per_second),
        "Batch progress"
    );
}

fn write_report(report: &BatchReport, output_dir: &Path, timestamp: &str) -> Result<()> {
    let results_dir = output_dir.join("batch_results");
    std::fs::create_dir_all(&results_dir).map_err(|e| {
        PipelineError::InvalidInput(format!("Cannot create {}: {e}", results_dir.display()))
    })?;

    let report_file = results_dir.join(format!("batch_{timestamp}.json"));
    let body = serde_json::to_string_pretty(report)
        .map_err(|e| PipelineError::Unexpected(format!("report serialization failed: {e}")))?;
    std::fs::write(&report_file, body).map_err(|e| {
        PipelineError::InvalidInput(format!("Cannot write {}: {e}", report_file.display()))
    })?;

    info!(file = %report_file.display(), "Final report written");
    Ok(())
}

fn write_error_report(
    results: &[OrchestrationResult],
    output_dir: &Path,
    timestamp: &str,
) -> Result<()> {
    let errors: Vec<&OrchestrationResult> = results.iter().filter(|r| r.error.is_some()).collect();
    if errors.is_empty() {
        info!("No errors to report");
        return Ok(());
    }

    let results_dir = output_dir.join("batch_results");
    std::fs::create_dir_all(&results_dir).map_err(|e| {
        PipelineError::InvalidInput(format!("Cannot create {}: {e}", results_dir.display()))
    })?;

    let error_file = results_dir.join(format!("batch_{timestamp}_errors.jsonl"));
    let mut body = String::new();
    for result in &errors {
        let record = ErrorRecord {
            url: &result.url,
            section: &result.section,
            error_category: classify_error(result).as_str(),
            error_message: result.error.as_deref().unwrap_or_default(),
            extracted: result.extracted,
            classified: result.classified,
            relevant: result.relevant,
            stored: result.stored,
            timestamp: Utc::now().to_rfc3339(),
        };
        body.push_str(&serde_json::to_string(&record).map_err(|e| {
            PipelineError::Unexpected(format!("error record serialization failed: {e}"))
        })?);
        body.push('\n');
    }

    std::fs::write(&error_file, body).map_err(|e| {
        PipelineError::InvalidInput(format!("Cannot write {}: {e}", error_file.display()))
    })?;

    info!(
        file = %error_file.display(),
        errors = errors.len(),
        "Error report written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lead(url: &str) -> DiscoveredArticle {
        DiscoveredArticle::new(url, 1, "news", Utc::now(), Some("T".to_string()), None).unwrap()
    }

    #[test]
    fn options_validation() {
        let mut options = BatchOptions {
            input: PathBuf::from("in.jsonl"),
            concurrency: 4,
            min_confidence: 0.7,
            skip_existing: false,
            dry_run: false,
            output_dir: PathBuf::from("out"),
        };
        assert!(options.validate().is_ok());

        options.concurrency = 0;
        assert!(options.validate().is_err());
        options.concurrency = 11;
        assert!(options.validate().is_err());
        options.concurrency = 4;

        options.min_confidence = 1.5;
        assert!(options.validate().is_err());
        options.min_confidence = 0.0;
        assert!(options.validate().is_ok());
        options.min_confidence = 1.0;
        assert!(options.validate().is_ok());
    }

    #[test]
    fn jsonl_round_trip_preserves_articles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.jsonl");

        let articles = vec![lead("https://example.com/a"), lead("https://example.com/b")];
        write_jsonl_articles(&path, &articles).unwrap();
        let loaded = load_jsonl_articles(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].url, articles[0].url);
        assert_eq!(loaded[1].url, articles[1].url);
    }

    #[test]
    fn load_reports_offending_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(
            &path,
            "{\"url\":\"https://example.com/a\",\"news_source_id\":1,\"section\":\"news\",\"discovered_at\":\"2025-12-01T12:00:00+00:00\"}\nnot json\n",
        )
        .unwrap();

        let err = load_jsonl_articles(&path).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn load_rejects_schema_violations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_schema.jsonl");
        // news_source_id must be positive.
        std::fs::write(
            &path,
            "{\"url\":\"https://example.com/a\",\"news_source_id\":0,\"section\":\"news\",\"discovered_at\":\"2025-12-01T12:00:00+00:00\"}\n",
        )
        .unwrap();

        let err = load_jsonl_articles(&path).unwrap_err();
        assert!(err.to_string().contains("Line 1"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.jsonl");
        std::fs::write(
            &path,
            "\n{\"url\":\"https://example.com/a\",\"news_source_id\":1,\"section\":\"news\",\"discovered_at\":\"2025-12-01T12:00:00+00:00\"}\n\n",
        )
        .unwrap();

        assert_eq!(load_jsonl_articles(&path).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn statistics_accounting_invariant() {
        let stats = BatchStatistics::new();
        stats.update(|c| c.total = 4).await;

        // stored
        stats
            .record_result(&OrchestrationResult {
                url: "https://example.com/a".to_string(),
                section: "news".to_string(),
                extracted: true,
                classified: true,
                relevant: true,
                stored: true,
                article_id: Some(1),
                classification_count: 1,
                classification_results: vec![],
                error: None,
            })
            .await;
        // duplicate
        stats
            .record_result(&OrchestrationResult {
                url: "https://example.com/b".to_string(),
                section: "news".to_string(),
                extracted: true,
                classified: true,
                relevant: true,
                stored: false,
                article_id: None,
                classification_count: 0,
                classification_results: vec![],
                error: None,
            })
            .await;
        // not relevant
        stats
            .record_result(&OrchestrationResult::not_relevant(
                "https://example.com/c",
                "news",
                vec![],
            ))
            .await;
        // extraction error
        stats
            .record_result(&OrchestrationResult::failure(
                "https://example.com/d",
                "news",
                false,
                false,
                false,
                vec![],
                "Failed to extract article: 404",
            ))
            .await;

        let snapshot = stats.snapshot().await;
        let c = &snapshot.counters;
        assert_eq!(c.processed, 4);
        assert_eq!(c.stored, 1);
        assert_eq!(c.duplicates, 1);
        assert_eq!(c.extraction_errors, 1);

        // processed = stored + duplicates + relevant_not_stored + not_relevant + errors
        let relevant_not_stored = c.relevant - c.stored - c.duplicates;
        let not_relevant = c.processed - c.relevant - c.extraction_errors;
        assert_eq!(
            c.processed,
            c.stored + c.duplicates + relevant_not_stored + not_relevant + c.total_errors()
        );
    }

    #[test]
    fn error_report_excludes_duplicates_and_successes() {
        let dir = tempfile::tempdir().unwrap();
        let results = vec![
            // success: no error
            OrchestrationResult {
                url: "https://example.com/ok".to_string(),
                section: "news".to_string(),
                extracted: true,
                classified: true,
                relevant: true,
                stored: true,
                article_id: Some(1),
                classification_count: 1,
                classification_results: vec![],
                error: None,
            },
            // duplicate: no error
            OrchestrationResult {
                url: "https://example.com/dup".to_string(),
                section: "news".to_string(),
                extracted: true,
                classified: true,
                relevant: true,
                stored: false,
                article_id: None,
                classification_count: 0,
                classification_results: vec![],
                error: None,
            },
            // failure
            OrchestrationResult::failure(
                "https://example.com/bad",
                "news",
                false,
                false,
                false,
                vec![],
                "Failed to extract article: 404",
            ),
        ];

        write_error_report(&results, dir.path(), "test").unwrap();

        let content =
            std::fs::read_to_string(dir.path().join("batch_results/batch_test_errors.jsonl"))
                .unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("https://example.com/bad"));
        assert!(lines[0].contains("\"error_category\":\"extraction\""));
    }

    #[test]
    fn empty_error_report_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_error_report(&[], dir.path(), "test").unwrap();
        assert!(!dir.path().join("batch_results/batch_test_errors.jsonl").exists());
    }
}
