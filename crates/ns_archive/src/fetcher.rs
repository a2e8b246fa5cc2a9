use async_trait::async_trait;
use chrono::NaiveDateTime;
use ns_core::{
    normalize_ticker, ArchiveConfig, ArticleRecord, Error, FetchFailure, PageResult, PageSource, Result,
};
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

use crate::logging::Logger;

/// Timestamp format of the `datetime` attribute on archive entries.
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

const STORY_SELECTOR: &str = "div.latest-news__story";
const DATE_SELECTOR: &str = "time.latest-news__date";
const TITLE_SELECTOR: &str = "a.news-link";
const SOURCE_SELECTOR: &str = "span.latest-news__source";

struct Selectors {
    story: Selector,
    date: Selector,
    title: Selector,
    source: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            story: parse_selector(STORY_SELECTOR)?,
            date: parse_selector(DATE_SELECTOR)?,
            title: parse_selector(TITLE_SELECTOR)?,
            source: parse_selector(SOURCE_SELECTOR)?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Parse(format!("Invalid selector {}: {}", selector, e)))
}

fn extract_text(element: &ElementRef, selector: &Selector) -> Result<String> {
    element
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .ok_or_else(|| Error::Parse(format!("No element found for selector: {:?}", selector)))
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| Error::Parse(format!("Bad timestamp '{}': {}", raw.trim(), e)))
}

fn parse_story(story: &ElementRef, selectors: &Selectors) -> Result<ArticleRecord> {
    let raw_date = story
        .select(&selectors.date)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .ok_or_else(|| Error::Parse("Story has no publication time".to_string()))?;
    let published_at = parse_timestamp(raw_date)?;

    let title = extract_text(story, &selectors.title)?;
    if title.is_empty() {
        return Err(Error::Parse("Story has an empty headline".to_string()));
    }
    let source = extract_text(story, &selectors.source)?;

    Ok(ArticleRecord::new(published_at, title, source))
}

/// Extracts every well-formed story block of an archive page, in document order.
///
/// Malformed blocks are skipped one by one; only an unusable selector fails the call.
pub fn parse_page(html: &str) -> Result<Vec<ArticleRecord>> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(html);

    let mut articles = Vec::new();
    for (index, story) in document.select(&selectors.story).enumerate() {
        match parse_story(&story, &selectors) {
            Ok(article) => articles.push(article),
            Err(e) => tracing::debug!("Skipping story {}: {}", index, e),
        }
    }
    Ok(articles)
}

/// HTTP client for the per-ticker news archive.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    client: Client,
    base_url: Url,
    retries: u32,
    retry_delay: Duration,
}

impl ArchiveFetcher {
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        let base_url = config.parsed_base_url()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            base_url,
            retries: config.retries,
            retry_delay: config.retry_delay,
        })
    }

    /// `{base}/news/{ticker}-stock?p={page}` with the ticker lower-cased.
    pub fn page_url(&self, ticker: &str, page: u32) -> Result<Url> {
        let ticker = normalize_ticker(ticker)
            .ok_or_else(|| Error::InvalidInput(format!("Invalid ticker symbol: '{}'", ticker)))?;
        if page == 0 {
            return Err(Error::InvalidInput("Page numbers start at 1".to_string()));
        }
        let mut url = self
            .base_url
            .join(&format!("news/{}-stock", ticker.to_lowercase()))
            .map_err(|e| Error::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("p", &page.to_string());
        Ok(url)
    }

    /// One GET. `Ok(None)` is a 404, which reads as a page past the end.
    async fn get_html(&self, url: &Url) -> std::result::Result<Option<String>, FetchFailure> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| FetchFailure {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchFailure {
                status: Some(status.as_u16()),
                message: status.canonical_reason().unwrap_or("unexpected status").to_string(),
            });
        }

        response.text().await.map(Some).map_err(|e| FetchFailure {
            status: None,
            message: format!("Failed to read body: {}", e),
        })
    }

    async fn get_html_with_retry(&self, url: &Url, logger: &Logger) -> std::result::Result<Option<String>, FetchFailure> {
        let mut attempt = 0;
        loop {
            match self.get_html(url).await {
                Ok(body) => return Ok(body),
                Err(failure) if attempt < self.retries => {
                    attempt += 1;
                    logger.warn(&format!(
                        "Request failed ({}), retrying {}/{}...",
                        failure, attempt, self.retries
                    ));
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(failure) => return Err(failure),
            }
        }
    }
}

#[async_trait]
impl PageSource for ArchiveFetcher {
    async fn fetch_page(&self, ticker: &str, page: u32) -> PageResult {
        let logger = Logger::for_ticker(ticker).with_prefix(format!("[p{}]", page));

        let url = match self.page_url(ticker, page) {
            Ok(url) => url,
            Err(e) => {
                logger.error(&e.to_string());
                return PageResult::failed(ticker, page, FetchFailure { status: None, message: e.to_string() });
            }
        };

        logger.debug(&format!("GET {}", url));
        let html = match self.get_html_with_retry(&url, &logger).await {
            Ok(Some(html)) => html,
            Ok(None) => {
                logger.debug("Page not found, treating as past the end of the archive");
                return PageResult::new(ticker, page, Vec::new());
            }
            Err(failure) => {
                logger.warn(&format!("Failed to fetch page: {}", failure));
                return PageResult::failed(ticker, page, failure);
            }
        };

        let articles = match parse_page(&html) {
            Ok(articles) => articles,
            Err(e) => {
                logger.error(&format!("Failed to parse page: {}", e));
                Vec::new()
            }
        };
        logger.debug(&format!("Parsed {} articles", articles.len()));
        PageResult::new(ticker, page, articles)
    }
}
