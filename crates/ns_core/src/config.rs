use std::time::Duration;
use url::Url;
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://markets.businessinsider.com";
pub const DEFAULT_MAX_PAGES: u32 = 200;
pub const DEFAULT_USER_AGENT: &str = concat!("ns/", env!("CARGO_PKG_VERSION"));

/// Settings for talking to the news archive and running a report.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_pages: u32,
    /// Extra attempts after a transport failure. Zero means a single request.
    pub retries: u32,
    pub retry_delay: Duration,
    pub user_agent: String,
    /// Keep only the articles published on the target date in reports.
    pub only_target_date: bool,
    /// Tickers processed at the same time.
    pub concurrency: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_pages: DEFAULT_MAX_PAGES,
            retries: 0,
            retry_delay: Duration::from_secs(1),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            only_target_date: false,
            concurrency: 4,
        }
    }
}

impl ArchiveConfig {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn parsed_base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!("{} cannot be used as a base URL", self.base_url)));
        }
        // Url::join drops the last segment unless the path ends with a slash
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::InvalidInput("max_pages must be at least 1".to_string()));
        }
        if self.concurrency == 0 {
            return Err(Error::InvalidInput("concurrency must be at least 1".to_string()));
        }
        self.parsed_base_url().map(|_| ())
    }
}
