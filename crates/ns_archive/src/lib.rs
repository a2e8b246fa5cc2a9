pub mod cli;
pub mod fetcher;
pub mod locator;
pub mod logging;
pub mod manager;

pub use cli::{handle_command, ArchiveArgs, ArchiveCommands};
pub use fetcher::{parse_page, ArchiveFetcher};
pub use locator::{locate_date_page, parse_target_date, DEFAULT_MAX_PAGES};
pub use logging::{init_logging, Logger};
pub use manager::ReportManager;

pub mod prelude {
    pub use super::fetcher::ArchiveFetcher;
    pub use super::locator::locate_date_page;
    pub use super::manager::ReportManager;
    pub use ns_core::{ArchiveConfig, ArticleRecord, Error, Located, PageResult, PageSource, Report, Result};
}
