use chrono::NaiveDate;
use ns_core::{normalize_ticker, Error, Located, PageSource, Result, SearchWindow};

use crate::logging::Logger;

pub use ns_core::config::DEFAULT_MAX_PAGES;

/// Accepts `MM/DD/YYYY` or `YYYY-MM-DD`.
pub fn parse_target_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| Error::InvalidInput(format!("Invalid date '{}', expected MM/DD/YYYY or YYYY-MM-DD", raw)))
}

/// Binary-searches pages `1..=max_pages` for one holding an article dated `target`.
///
/// Relies on the archive listing newest first: each page descends in time
/// and later pages never hold newer dates than earlier ones. Any page with a
/// matching article is returned, not necessarily the first such page. A page
/// that could not be fetched stops the search with [`Error::Fetch`] rather
/// than being read as the end of the archive.
pub async fn locate_date_page(
    source: &dyn PageSource,
    ticker: &str,
    target: NaiveDate,
    max_pages: u32,
) -> Result<Located> {
    let ticker = normalize_ticker(ticker)
        .ok_or_else(|| Error::InvalidInput(format!("Invalid ticker symbol: '{}'", ticker)))?;
    if max_pages == 0 {
        return Err(Error::InvalidInput("max_pages must be at least 1".to_string()));
    }

    let logger = Logger::for_ticker(&ticker).with_prefix("[locate]".to_string());
    let mut window = SearchWindow::new(max_pages);

    while window.is_open() {
        let mid = window.mid();
        let page = source.fetch_page(&ticker, mid).await;

        if let Some(failure) = &page.failure {
            return Err(Error::Fetch(format!("{} page {}: {}", ticker, mid, failure)));
        }

        let dates = page.dates();
        let (first, last) = match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                logger.debug(&format!("Page {} is empty, searching lower pages", mid));
                window.high = mid - 1;
                continue;
            }
        };

        if dates.contains(&target) {
            logger.info(&format!("📍 Found {} on page {}", target, mid));
            return Ok(Located::Found(mid));
        }

        if first > target {
            logger.debug(&format!("Page {} covers {}..{}, searching older pages", mid, first, last));
            window.low = mid + 1;
        } else if last < target {
            logger.debug(&format!("Page {} covers {}..{}, searching newer pages", mid, first, last));
            window.high = mid - 1;
        } else {
            // only reachable when a page is not sorted newest first
            logger.warn(&format!(
                "Page {} is out of order ({} before {}), giving up",
                mid, first, last
            ));
            return Ok(Located::NotFound);
        }
    }

    logger.info(&format!("No page within 1..={} has articles from {}", max_pages, target));
    Ok(Located::NotFound)
}
