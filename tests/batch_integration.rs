//! Batch driver tests against a live Postgres instance.
//!
//! Ignored by default; run with `DATABASE_URL` set:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test --test batch_integration -- --ignored
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use graftwatch::classification::{ClassificationService, EntityNormalizerService, LlmClassifier};
use graftwatch::config::LlmSettings;
use graftwatch::extraction::{ArticleExtractor, ExtractionService, GleanerExtractor};
use graftwatch::fetch::HttpFetcher;
use graftwatch::models::{DiscoveredArticle, NewsSource};
use graftwatch::repositories::NewsSourceRepository;
use graftwatch::services::batch::write_jsonl_articles;
use graftwatch::services::{BatchOptions, BatchProcessor, OrchestrationService, PersistenceService};

const ARTICLE_HTML: &str = r#"<html><head>
<script type="application/ld+json">
{"@type": "Article", "headline": "OCG Probes Ministry",
 "datePublished": "2025-12-01T10:00:00Z"}
</script>
</head><body>
<div class="article--body">
<p>The Office of the Contractor General has launched a probe into contract
irregularities at the Ministry of Education.</p>
</div>
</body></html>"#;

const RELEVANT_VERDICT: &str = r#"{
    "is_relevant": true, "confidence": 0.9,
    "reasoning": "OCG investigation", "key_entities": ["OCG"]
}"#;

const NORMALIZATION_REPLY: &str = r#"{
    "normalized_entities": [
        {"original_value": "OCG", "normalized_value": "ocg",
         "confidence": 0.98, "reason": "Acronym preserved"}
    ]
}"#;

fn llm_reply(text: &str) -> serde_json::Value {
    serde_json::json!({"content": [{"type": "text", "text": text}]})
}

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

fn build_service(llm_base: String) -> Arc<OrchestrationService> {
    let settings = LlmSettings {
        api_key: "test-key".to_string(),
        base_url: llm_base,
        classification_model: "m1".to_string(),
        normalization_model: "m1".to_string(),
    };

    let mut extractors: HashMap<String, Box<dyn ArticleExtractor>> = HashMap::new();
    extractors.insert("127.0.0.1".to_string(), Box::new(GleanerExtractor::new()));

    Arc::new(OrchestrationService::new(
        Arc::new(ExtractionService::with_extractors(
            HttpFetcher::with_policy(Duration::from_secs(5), 2, 0.01),
            extractors,
        )),
        ClassificationService::new(vec![Arc::new(LlmClassifier::corruption(&settings))]),
        Arc::new(PersistenceService::new()),
        Arc::new(EntityNormalizerService::new(&settings, None)),
    ))
}

#[tokio::test]
#[ignore]
async fn batch_with_skip_existing_processes_only_new_urls() {
    let pool = test_pool().await;

    let mut conn = pool.acquire().await.unwrap();
    let source = NewsSourceRepository::new()
        .insert(
            &mut conn,
            &NewsSource::new(
                format!("Batch Source {}", Uuid::new_v4()),
                "https://jamaica-gleaner.com",
            )
            .unwrap(),
        )
        .await
        .unwrap();
    drop(conn);
    let news_source_id = source.id.unwrap();

    let article_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_string_contains("Normalize these entities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply(NORMALIZATION_REPLY)))
        .mount(&llm_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply(RELEVANT_VERDICT)))
        .mount(&llm_server)
        .await;

    let mut leads = Vec::new();
    for _ in 0..3 {
        let slug = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path(format!("/news/{slug}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_HTML))
            .mount(&article_server)
            .await;
        leads.push(
            DiscoveredArticle::new(
                format!("{}/news/{slug}", article_server.uri()),
                news_source_id,
                "news",
                Utc::now(),
                None,
                None,
            )
            .unwrap(),
        );
    }

    let service = build_service(llm_server.uri());

    // First pass: ingest only the first URL so the DB "already contains"
    // one of the three.
    let mut conn = pool.acquire().await.unwrap();
    let first = service
        .process_article(
            &mut conn,
            &leads[0].url,
            "news",
            news_source_id,
            0.7,
        )
        .await;
    drop(conn);
    assert!(first.stored, "precondition failed: {:?}", first.error);

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("leads.jsonl");
    write_jsonl_articles(&input, &leads).unwrap();

    let options = BatchOptions {
        input,
        concurrency: 2,
        min_confidence: 0.7,
        skip_existing: true,
        dry_run: false,
        output_dir: dir.path().to_path_buf(),
    };

    let processor = BatchProcessor::new(service, pool.clone());
    let report = processor.run(&options).await.unwrap();

    assert_eq!(report.summary.total_articles, 2);
    assert_eq!(report.summary.skipped_existing, 1);
    assert_eq!(report.summary.processed, 2);
    assert_eq!(report.summary.stored, 2);
    assert_eq!(report.summary.total_errors, 0);

    // Summary artifact exists.
    let results_dir = dir.path().join("batch_results");
    let entries: Vec<_> = std::fs::read_dir(&results_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(entries.iter().any(|name| name.starts_with("batch_") && name.ends_with(".json")));

    // Second run with skip_existing: everything already present.
    let dir2 = tempfile::tempdir().unwrap();
    let input2 = dir2.path().join("leads.jsonl");
    write_jsonl_articles(&input2, &leads).unwrap();
    let options2 = BatchOptions {
        input: input2,
        concurrency: 2,
        min_confidence: 0.7,
        skip_existing: true,
        dry_run: false,
        output_dir: dir2.path().to_path_buf(),
    };
    let processor2 = BatchProcessor::new(build_service(llm_server.uri()), pool.clone());
    let report2 = processor2.run(&options2).await.unwrap();

    assert_eq!(report2.summary.stored, 0);
    assert_eq!(report2.summary.skipped_existing, 3);
    assert_eq!(report2.summary.processed, 0);
}

#[tokio::test]
#[ignore]
async fn dry_run_persists_nothing() {
    let pool = test_pool().await;

    let mut conn = pool.acquire().await.unwrap();
    let source = NewsSourceRepository::new()
        .insert(
            &mut conn,
            &NewsSource::new(
                format!("DryRun Source {}", Uuid::new_v4()),
                "https://jamaica-gleaner.com",
            )
            .unwrap(),
        )
        .await
        .unwrap();
    drop(conn);
    let news_source_id = source.id.unwrap();

    let article_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_string_contains("Normalize these entities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply(NORMALIZATION_REPLY)))
        .mount(&llm_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply(RELEVANT_VERDICT)))
        .mount(&llm_server)
        .await;

    let slug = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/news/{slug}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_HTML))
        .mount(&article_server)
        .await;

    let url = format!("{}/news/{slug}", article_server.uri());
    let leads = vec![DiscoveredArticle::new(
        url.clone(),
        news_source_id,
        "news",
        Utc::now(),
        None,
        None,
    )
    .unwrap()];

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("leads.jsonl");
    write_jsonl_articles(&input, &leads).unwrap();

    let options = BatchOptions {
        input,
        concurrency: 1,
        min_confidence: 0.7,
        skip_existing: false,
        dry_run: true,
        output_dir: dir.path().to_path_buf(),
    };

    let processor = BatchProcessor::new(build_service(llm_server.uri()), pool.clone());
    let report = processor.run(&options).await.unwrap();

    // The pipeline reports storage, but the rollback discarded the rows.
    assert_eq!(report.summary.processed, 1);
    let stored_rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE url = $1")
            .bind(&url)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(stored_rows, 0);
}
