use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One article block parsed from an archive listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    published_at: NaiveDateTime,
    title: String,
    source: String,
}

impl ArticleRecord {
    pub fn new(published_at: NaiveDateTime, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            published_at,
            title: title.into(),
            source: source.into(),
        }
    }

    /// Publication time in the archive's local time.
    pub fn published_at(&self) -> NaiveDateTime {
        self.published_at
    }

    /// Calendar date of publication, time of day dropped.
    pub fn date(&self) -> NaiveDate {
        self.published_at.date()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Why a page request did not produce a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// The articles of one archive page, in document order.
///
/// An empty `articles` list with no `failure` means the page held nothing
/// parseable, which the locator reads as "past the end of the archive".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub ticker: String,
    pub page: u32,
    pub articles: Vec<ArticleRecord>,
    pub failure: Option<FetchFailure>,
}

impl PageResult {
    pub fn new(ticker: impl Into<String>, page: u32, articles: Vec<ArticleRecord>) -> Self {
        Self {
            ticker: ticker.into(),
            page,
            articles,
            failure: None,
        }
    }

    pub fn failed(ticker: impl Into<String>, page: u32, failure: FetchFailure) -> Self {
        Self {
            ticker: ticker.into(),
            page,
            articles: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.articles.iter().map(ArticleRecord::date).collect()
    }
}

/// Binary-search bounds over page numbers, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub low: u32,
    pub high: u32,
}

impl SearchWindow {
    pub fn new(max_pages: u32) -> Self {
        Self { low: 1, high: max_pages }
    }

    pub fn is_open(&self) -> bool {
        self.low <= self.high
    }

    pub fn mid(&self) -> u32 {
        self.low + (self.high - self.low) / 2
    }
}

/// Outcome of a date search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Located {
    Found(u32),
    NotFound,
}

impl Located {
    pub fn page(&self) -> Option<u32> {
        match self {
            Located::Found(page) => Some(*page),
            Located::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Unknown => "unknown",
        }
    }

    /// Maps a classifier label onto the closed set. Anything unrecognised is `Unknown`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" | "pos" | "bullish" => SentimentLabel::Positive,
            "negative" | "neg" | "bearish" => SentimentLabel::Negative,
            "neutral" | "neu" => SentimentLabel::Neutral,
            _ => SentimentLabel::Unknown,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label plus classifier confidence in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f32,
}

impl SentimentResult {
    pub fn new(label: SentimentLabel, score: f32) -> Self {
        Self {
            label,
            score: score.clamp(0.0, 1.0),
        }
    }

    pub fn unknown() -> Self {
        Self {
            label: SentimentLabel::Unknown,
            score: 0.0,
        }
    }

    /// Signed score in `[-1, 1]`: positive confidence counts up, negative down.
    pub fn polarity(&self) -> f32 {
        match self.label {
            SentimentLabel::Positive => self.score,
            SentimentLabel::Negative => -self.score,
            SentimentLabel::Neutral | SentimentLabel::Unknown => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub ticker: String,
    pub published_at: NaiveDateTime,
    pub title: String,
    pub source: String,
    pub label: SentimentLabel,
    pub score: f32,
}

impl ReportRow {
    pub fn new(ticker: &str, article: &ArticleRecord, sentiment: SentimentResult) -> Self {
        Self {
            ticker: ticker.to_string(),
            published_at: article.published_at(),
            title: article.title().to_string(),
            source: article.source().to_string(),
            label: sentiment.label,
            score: sentiment.score,
        }
    }

    pub fn polarity(&self) -> f32 {
        SentimentResult {
            label: self.label,
            score: self.score,
        }
        .polarity()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    InvalidTicker,
    NotFound,
    FetchError,
    NoData,
    ClassifierDegraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerWarning {
    pub ticker: String,
    pub kind: WarningKind,
    pub message: String,
}

impl TickerWarning {
    pub fn new(ticker: impl Into<String>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TickerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ticker, self.message)
    }
}

/// Rows for every ticker that produced data, plus one warning per skipped or degraded ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub target_date: NaiveDate,
    pub rows: Vec<ReportRow>,
    pub warnings: Vec<TickerWarning>,
}

impl Report {
    pub fn new(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            rows: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True when no ticker contributed a single row.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tickers that contributed rows, in first-seen order.
    pub fn tickers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.ticker.as_str()) {
                seen.push(&row.ticker);
            }
        }
        seen
    }

    /// Number of rows per ticker and label.
    pub fn label_counts(&self) -> BTreeMap<(String, SentimentLabel), usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry((row.ticker.clone(), row.label)).or_insert(0) += 1;
        }
        counts
    }

    /// The `n` rows with the strongest sentiment either way.
    pub fn top_by_polarity(&self, n: usize) -> Vec<&ReportRow> {
        let mut rows: Vec<&ReportRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.polarity().abs().total_cmp(&a.polarity().abs()));
        rows.truncate(n);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn row(ticker: &str, label: SentimentLabel, score: f32) -> ReportRow {
        let article = ArticleRecord::new(at("2024-03-06 09:30:00"), "headline", "Reuters");
        ReportRow::new(ticker, &article, SentimentResult::new(label, score))
    }

    #[test]
    fn test_article_date_drops_time() {
        let article = ArticleRecord::new(at("2024-03-06 23:59:59"), "t", "s");
        assert_eq!(article.date(), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    }

    #[test]
    fn test_search_window() {
        let mut window = SearchWindow::new(200);
        assert!(window.is_open());
        assert_eq!(window.mid(), 100);
        window.low = 101;
        assert_eq!(window.mid(), 150);
        window.high = 100;
        assert!(!window.is_open());
    }

    #[test]
    fn test_label_parse() {
        assert_eq!(SentimentLabel::parse("Positive"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::parse(" NEGATIVE "), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::parse("neutral"), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::parse("LABEL_0"), SentimentLabel::Unknown);
    }

    #[test]
    fn test_polarity() {
        assert_eq!(SentimentResult::new(SentimentLabel::Positive, 0.8).polarity(), 0.8);
        assert_eq!(SentimentResult::new(SentimentLabel::Negative, 0.5).polarity(), -0.5);
        assert_eq!(SentimentResult::new(SentimentLabel::Neutral, 0.9).polarity(), 0.0);
        assert_eq!(SentimentResult::new(SentimentLabel::Positive, 1.7).score, 1.0);
        assert_eq!(SentimentResult::unknown().polarity(), 0.0);
    }

    #[test]
    fn test_report_aggregates() {
        let mut report = Report::new(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert!(report.is_empty());

        report.rows.push(row("AAA", SentimentLabel::Positive, 0.6));
        report.rows.push(row("BBB", SentimentLabel::Negative, 0.9));
        report.rows.push(row("AAA", SentimentLabel::Positive, 0.7));
        report.rows.push(row("AAA", SentimentLabel::Neutral, 0.99));

        assert!(!report.is_empty());
        assert_eq!(report.tickers(), vec!["AAA", "BBB"]);

        let counts = report.label_counts();
        assert_eq!(counts[&("AAA".to_string(), SentimentLabel::Positive)], 2);
        assert_eq!(counts[&("AAA".to_string(), SentimentLabel::Neutral)], 1);
        assert_eq!(counts[&("BBB".to_string(), SentimentLabel::Negative)], 1);

        let top = report.top_by_polarity(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].ticker, "BBB");
        assert_eq!(top[1].score, 0.7);
    }

    #[test]
    fn test_top_by_polarity_ranks_neutral_last() {
        let mut report = Report::new(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        report.rows.push(row("AAA", SentimentLabel::Neutral, 0.99));
        report.rows.push(row("AAA", SentimentLabel::Negative, 0.4));
        report.rows.push(row("BBB", SentimentLabel::Positive, 0.55));

        let top = report.top_by_polarity(3);
        assert_eq!(top[0].label, SentimentLabel::Positive);
        assert_eq!(top[1].label, SentimentLabel::Negative);
        assert_eq!(top[2].label, SentimentLabel::Neutral);
        assert!(report.top_by_polarity(0).is_empty());
    }
}
