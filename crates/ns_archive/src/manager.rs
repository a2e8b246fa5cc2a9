use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use ns_core::{
    normalize_ticker, ArchiveConfig, Located, PageResult, PageSource, Report, ReportRow, Result,
    SentimentLabel, TickerWarning, WarningKind,
};
use ns_inference::SentimentAdapter;
use tokio::sync::Semaphore;
use tracing::info;

use crate::fetcher::ArchiveFetcher;
use crate::locator::locate_date_page;
use crate::logging::Logger;

/// Rows and warnings produced by one ticker, merged into the report afterwards.
#[derive(Debug, Default)]
struct TickerOutcome {
    rows: Vec<ReportRow>,
    warnings: Vec<TickerWarning>,
}

impl TickerOutcome {
    fn warning(ticker: &str, kind: WarningKind, message: String) -> Self {
        Self {
            rows: Vec::new(),
            warnings: vec![TickerWarning::new(ticker, kind, message)],
        }
    }
}

/// Runs locate, fetch and classify for a set of tickers.
pub struct ReportManager {
    source: Arc<dyn PageSource>,
    adapter: SentimentAdapter,
    config: ArchiveConfig,
    semaphore: Arc<Semaphore>,
}

impl ReportManager {
    pub fn new(source: Arc<dyn PageSource>, adapter: SentimentAdapter, config: ArchiveConfig) -> Result<Self> {
        config.validate()?;
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        Ok(Self {
            source,
            adapter,
            config,
            semaphore,
        })
    }

    /// Manager backed by the live HTTP archive.
    pub fn with_archive(adapter: SentimentAdapter, config: ArchiveConfig) -> Result<Self> {
        let fetcher = ArchiveFetcher::new(&config)?;
        Self::new(Arc::new(fetcher), adapter, config)
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    pub fn adapter(&self) -> &SentimentAdapter {
        &self.adapter
    }

    pub async fn locate(&self, ticker: &str, target_date: NaiveDate) -> Result<Located> {
        locate_date_page(self.source.as_ref(), ticker, target_date, self.config.max_pages).await
    }

    pub async fn fetch_page(&self, ticker: &str, page: u32) -> PageResult {
        self.source.fetch_page(ticker, page).await
    }

    /// Builds one report across `tickers`. A failing ticker only adds a warning.
    pub async fn build_report(&self, tickers: &[String], target_date: NaiveDate) -> Report {
        let mut report = Report::new(target_date);

        let mut valid: Vec<String> = Vec::new();
        for raw in tickers {
            match normalize_ticker(raw) {
                Some(ticker) if !valid.contains(&ticker) => valid.push(ticker),
                Some(_) => {}
                None => report.warnings.push(TickerWarning::new(
                    raw.trim(),
                    WarningKind::InvalidTicker,
                    format!("'{}' is not a valid ticker symbol", raw.trim()),
                )),
            }
        }

        info!("🗞️ Building report for {} on {}", valid.join(", "), target_date);
        let outcomes = join_all(valid.iter().map(|ticker| self.process_ticker(ticker, target_date))).await;

        for outcome in outcomes {
            report.rows.extend(outcome.rows);
            report.warnings.extend(outcome.warnings);
        }

        info!(
            "✅ Report ready: {} rows from {} tickers, {} warnings",
            report.rows.len(),
            report.tickers().len(),
            report.warnings.len()
        );
        report
    }

    async fn process_ticker(&self, ticker: &str, target_date: NaiveDate) -> TickerOutcome {
        let logger = Logger::for_ticker(ticker);
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => return TickerOutcome::warning(ticker, WarningKind::FetchError, e.to_string()),
        };

        logger.info(&format!("🔍 Searching archive for {}", target_date));
        let page = match self.locate(ticker, target_date).await {
            Ok(Located::Found(page)) => page,
            Ok(Located::NotFound) => {
                logger.warn("No archive page found for the target date");
                return TickerOutcome::warning(
                    ticker,
                    WarningKind::NotFound,
                    format!(
                        "no articles found for {} within {} pages",
                        target_date, self.config.max_pages
                    ),
                );
            }
            Err(e) => {
                logger.error(&format!("Search failed: {}", e));
                return TickerOutcome::warning(ticker, WarningKind::FetchError, e.to_string());
            }
        };

        let result = self.source.fetch_page(ticker, page).await;
        if let Some(failure) = result.failure {
            logger.error(&format!("Failed to fetch page {}: {}", page, failure));
            return TickerOutcome::warning(
                ticker,
                WarningKind::FetchError,
                format!("page {}: {}", page, failure),
            );
        }

        let articles: Vec<_> = result
            .articles
            .into_iter()
            .filter(|a| !self.config.only_target_date || a.date() == target_date)
            .collect();
        if articles.is_empty() {
            logger.warn(&format!("Page {} has no usable articles", page));
            return TickerOutcome::warning(
                ticker,
                WarningKind::NoData,
                format!("page {} returned no articles", page),
            );
        }

        logger.info(&format!("🤖 Scoring {} headlines from page {}", articles.len(), page));
        let titles: Vec<String> = articles.iter().map(|a| a.title().to_string()).collect();
        let sentiments = self.adapter.classify(&titles).await;

        let mut outcome = TickerOutcome::default();
        if sentiments.iter().all(|s| s.label == SentimentLabel::Unknown) {
            outcome.warnings.push(TickerWarning::new(
                ticker,
                WarningKind::ClassifierDegraded,
                format!("{} could not score any headline", self.adapter.model_name()),
            ));
        }
        outcome.rows = articles
            .iter()
            .zip(sentiments)
            .map(|(article, sentiment)| ReportRow::new(ticker, article, sentiment))
            .collect();
        outcome
    }
}
