use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use ns_archive::prelude::*;
use ns_archive::parse_target_date;
use ns_core::{SentimentLabel, WarningKind};
use ns_inference::models::LexiconModel;
use ns_inference::SentimentAdapter;

/// Serves `/news/{ticker}-stock?p=N` like the live archive.
///
/// `aapl` has three pages, `gone` answers 404, `flaky` answers 503 and
/// `messy` has one page with a broken story among good ones.
#[derive(Default)]
struct FixtureArchive {
    hits: AtomicUsize,
}

fn story(datetime: &str, title: &str, source: &str) -> String {
    format!(
        r#"<div class="latest-news__story">
            <time class="latest-news__date" datetime="{datetime}">{datetime}</time>
            <div class="latest-news__story-body">
                <a class="news-link" href="/news/stocks/story">{title}</a>
                <span class="latest-news__source">{source}</span>
            </div>
        </div>"#
    )
}

fn listing(stories: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>News</title></head>
        <body><section class="latest-news">{}</section></body></html>"#,
        stories.join("\n")
    )
}

fn aapl_page(page: u32) -> Vec<String> {
    match page {
        1 => vec![
            story("3/10/2024 6:00:00 PM", "Apple stock jumps ahead of event", "Reuters"),
            story("3/9/2024 11:15:00 AM", "Apple supplier news", "Bloomberg"),
            story("3/8/2024 7:45:00 AM", "Analysts weigh Apple", "CNBC"),
        ],
        2 => vec![
            story("3/7/2024 4:30:00 PM", "Apple shares surge on record sales", "Reuters"),
            story("3/6/2024 1:00:00 PM", "Apple hit with EU lawsuit", "AP"),
            story("3/5/2024 9:00:00 AM", "Apple to hold shareholder meeting", "Business Insider"),
        ],
        3 => vec![
            story("3/4/2024 3:00:00 PM", "Apple slumps after downgrade", "MarketWatch"),
            story("3/1/2024 10:00:00 AM", "Apple product roundup", "The Verge"),
        ],
        _ => Vec::new(),
    }
}

async fn serve_page(
    State(archive): State<Arc<FixtureArchive>>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    archive.hits.fetch_add(1, Ordering::SeqCst);
    let page: u32 = params.get("p").and_then(|p| p.parse().ok()).unwrap_or(1);

    match slug.as_str() {
        "aapl-stock" => Html(listing(&aapl_page(page))).into_response(),
        "messy-stock" => {
            let mut stories = vec![
                story("3/6/2024 5:00:00 PM", "One", "AP"),
                story("3/6/2024 4:00:00 PM", "Two", "AP"),
                r#"<div class="latest-news__story"><span>layout changed</span></div>"#.to_string(),
                story("3/6/2024 3:00:00 PM", "Three", "AP"),
            ];
            stories.push(story("3/6/2024 2:00:00 PM", "Four", "AP"));
            stories.push(story("3/6/2024 1:00:00 PM", "Five", "AP"));
            Html(listing(&stories)).into_response()
        }
        "gone-stock" => StatusCode::NOT_FOUND.into_response(),
        "flaky-stock" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        _ => Html(listing(&[])).into_response(),
    }
}

async fn spawn_archive() -> (Arc<FixtureArchive>, String) {
    let archive = Arc::new(FixtureArchive::default());
    let app = Router::new()
        .route("/news/:slug", get(serve_page))
        .with_state(archive.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (archive, format!("http://{}", addr))
}

fn config(base_url: &str) -> ArchiveConfig {
    ArchiveConfig {
        timeout: Duration::from_secs(5),
        retry_delay: Duration::from_millis(10),
        max_pages: 3,
        ..ArchiveConfig::default().with_base_url(base_url)
    }
}

fn day(s: &str) -> NaiveDate {
    parse_target_date(s).unwrap()
}

#[tokio::test]
async fn test_fetch_page_over_http() {
    let (_archive, base_url) = spawn_archive().await;
    let fetcher = ArchiveFetcher::new(&config(&base_url)).unwrap();

    let page = fetcher.fetch_page("AAPL", 2).await;
    assert!(!page.is_failure());
    assert_eq!(page.articles.len(), 3);
    assert_eq!(page.articles[0].title(), "Apple shares surge on record sales");
    assert_eq!(page.articles[1].date(), day("2024-03-06"));
    assert_eq!(page.articles[2].source(), "Business Insider");

    let past_end = fetcher.fetch_page("AAPL", 9).await;
    assert!(past_end.is_empty());
    assert!(!past_end.is_failure());
}

#[tokio::test]
async fn test_malformed_story_does_not_sink_page() {
    let (_archive, base_url) = spawn_archive().await;
    let fetcher = ArchiveFetcher::new(&config(&base_url)).unwrap();

    let page = fetcher.fetch_page("MESSY", 1).await;
    let titles: Vec<&str> = page.articles.iter().map(|a| a.title()).collect();
    assert_eq!(titles, vec!["One", "Two", "Three", "Four", "Five"]);
}

#[tokio::test]
async fn test_locate_scenario_takes_one_request() {
    let (archive, base_url) = spawn_archive().await;
    let fetcher = ArchiveFetcher::new(&config(&base_url)).unwrap();

    let located = locate_date_page(&fetcher, "AAPL", day("03/06/2024"), 3).await.unwrap();
    assert_eq!(located, Located::Found(2));
    assert_eq!(archive.hits.load(Ordering::SeqCst), 1);

    let located = locate_date_page(&fetcher, "AAPL", day("03/01/2024"), 200).await.unwrap();
    assert_eq!(located, Located::Found(3));
}

#[tokio::test]
async fn test_not_found_status_reads_as_past_the_end() {
    let (_archive, base_url) = spawn_archive().await;
    let fetcher = ArchiveFetcher::new(&config(&base_url)).unwrap();

    let page = fetcher.fetch_page("GONE", 1).await;
    assert!(page.is_empty());
    assert!(!page.is_failure());

    let located = locate_date_page(&fetcher, "GONE", day("2024-03-06"), 50).await.unwrap();
    assert_eq!(located, Located::NotFound);
}

#[tokio::test]
async fn test_server_errors_are_retried_then_reported() {
    let (archive, base_url) = spawn_archive().await;
    let fetcher = ArchiveFetcher::new(&ArchiveConfig {
        retries: 2,
        ..config(&base_url)
    })
    .unwrap();

    let page = fetcher.fetch_page("FLAKY", 1).await;
    let failure = page.failure.expect("503 should be reported as a failure");
    assert_eq!(failure.status, Some(503));
    assert_eq!(archive.hits.load(Ordering::SeqCst), 3);

    let result = locate_date_page(&fetcher, "FLAKY", day("2024-03-06"), 10).await;
    assert!(matches!(result, Err(Error::Fetch(_))));
}

#[tokio::test]
async fn test_report_end_to_end() {
    let (_archive, base_url) = spawn_archive().await;
    let adapter = SentimentAdapter::new(Arc::new(LexiconModel::new()));
    let manager = ReportManager::with_archive(adapter, config(&base_url)).unwrap();

    let tickers = vec!["aapl".to_string(), "gone".to_string(), "flaky".to_string()];
    let report = manager.build_report(&tickers, day("2024-03-06")).await;

    assert_eq!(report.rows.len(), 3);
    assert!(report.rows.iter().all(|r| r.ticker == "AAPL"));
    assert_eq!(report.rows[0].label, SentimentLabel::Positive);
    assert_eq!(report.rows[1].label, SentimentLabel::Negative);

    let warnings: Vec<_> = report.warnings.iter().map(|w| (w.ticker.as_str(), w.kind)).collect();
    assert_eq!(
        warnings,
        vec![("GONE", WarningKind::NotFound), ("FLAKY", WarningKind::FetchError)]
    );
}
