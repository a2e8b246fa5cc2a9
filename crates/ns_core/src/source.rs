use async_trait::async_trait;
use crate::types::PageResult;

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches one listing page for `ticker`. Pages are numbered from 1.
    ///
    /// Never fails outright: transport problems are reported through
    /// `PageResult::failure` and unparseable pages come back empty.
    async fn fetch_page(&self, ticker: &str, page: u32) -> PageResult;
}
