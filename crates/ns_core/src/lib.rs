pub mod config;
pub mod error;
pub mod models;
pub mod source;
pub mod types;

pub use config::ArchiveConfig;
pub use error::Error;
pub use models::SentimentModel;
pub use source::PageSource;
pub use types::{
    ArticleRecord, FetchFailure, Located, PageResult, Report, ReportRow, SearchWindow,
    SentimentLabel, SentimentResult, TickerWarning, WarningKind,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Trims and upper-cases a ticker symbol.
///
/// Returns `None` for an empty symbol or one with characters that cannot
/// appear in an archive URL path segment.
pub fn normalize_ticker(ticker: &str) -> Option<String> {
    let ticker = ticker.trim();
    let valid = !ticker.is_empty()
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    valid.then(|| ticker.to_uppercase())
}
