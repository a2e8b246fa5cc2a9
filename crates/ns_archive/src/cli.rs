use chrono::NaiveDate;
use clap::{Args, Subcommand};
use ns_core::{Error, Located, PageResult, Report, Result};

use crate::locator::parse_target_date;
use crate::manager::ReportManager;

const TITLE_WIDTH: usize = 60;

#[derive(Args, Debug, Clone)]
pub struct ArchiveArgs {
    #[command(subcommand)]
    pub command: ArchiveCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ArchiveCommands {
    /// Find the archive page for a date and score its headlines, for each ticker
    Report {
        /// Ticker symbols (e.g. AAPL TSLA)
        #[arg(required = true)]
        tickers: Vec<String>,
        /// Target date, MM/DD/YYYY or YYYY-MM-DD
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Number of strongest headlines to list after the table
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Print the archive page number that holds a date
    Locate {
        ticker: String,
        /// Target date, MM/DD/YYYY or YYYY-MM-DD
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
    },
    /// Fetch and print a single archive page
    Page {
        ticker: String,
        page: u32,
    },
}

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_target_date(raw).map_err(|e| e.to_string())
}

pub async fn handle_command(args: ArchiveArgs, manager: &ReportManager) -> Result<()> {
    match args.command {
        ArchiveCommands::Report { tickers, date, json, top } => {
            let report = manager.build_report(&tickers, date).await;
            for warning in &report.warnings {
                eprintln!("⚠️  {}", warning);
            }
            if report.is_empty() {
                return Err(Error::NoResults(format!(
                    "No articles found for {} on {}",
                    tickers.join(", "),
                    date.format("%m/%d/%Y")
                )));
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report, top));
            }
        }
        ArchiveCommands::Locate { ticker, date } => match manager.locate(&ticker, date).await? {
            Located::Found(page) => println!("{} {}: page {}", ticker.to_uppercase(), date.format("%m/%d/%Y"), page),
            Located::NotFound => {
                return Err(Error::NoResults(format!(
                    "No page within 1..={} has {} articles from {}",
                    manager.config().max_pages,
                    ticker.to_uppercase(),
                    date.format("%m/%d/%Y")
                )))
            }
        },
        ArchiveCommands::Page { ticker, page } => {
            let result = manager.fetch_page(&ticker, page).await;
            if let Some(failure) = &result.failure {
                return Err(Error::Fetch(format!("{} page {}: {}", ticker, page, failure)));
            }
            print!("{}", render_page(&result));
        }
    }
    Ok(())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

pub fn render_page(page: &PageResult) -> String {
    let mut out = format!("{} page {}: {} articles\n", page.ticker.to_uppercase(), page.page, page.articles.len());
    for article in &page.articles {
        out.push_str(&format!(
            "{}  {:<width$}  {}\n",
            article.published_at().format("%m/%d/%Y %H:%M"),
            truncate(article.title(), TITLE_WIDTH),
            article.source(),
            width = TITLE_WIDTH
        ));
    }
    out
}

/// Table of rows, per-ticker label counts and the strongest headlines.
pub fn render_report(report: &Report, top: usize) -> String {
    let mut out = format!("News sentiment for {}\n\n", report.target_date.format("%m/%d/%Y"));
    out.push_str(&format!(
        "{:<8} {:<16} {:<width$} {:<20} {:<9} {:>5}\n",
        "Ticker",
        "Date",
        "Title",
        "Source",
        "Sentiment",
        "Score",
        width = TITLE_WIDTH
    ));
    for row in &report.rows {
        out.push_str(&format!(
            "{:<8} {:<16} {:<width$} {:<20} {:<9} {:>5.2}\n",
            row.ticker,
            row.published_at.format("%m/%d/%Y %H:%M").to_string(),
            truncate(&row.title, TITLE_WIDTH),
            truncate(&row.source, 20),
            row.label.as_str(),
            row.score,
            width = TITLE_WIDTH
        ));
    }

    out.push_str("\nSentiment distribution\n");
    for ((ticker, label), count) in report.label_counts() {
        out.push_str(&format!("  {:<8} {:<9} {}\n", ticker, label.as_str(), count));
    }

    if top > 0 {
        out.push_str(&format!("\nTop {} by sentiment strength\n", top));
        for row in report.top_by_polarity(top) {
            out.push_str(&format!("  {:+.2}  {:<8} {}\n", row.polarity(), row.ticker, truncate(&row.title, TITLE_WIDTH)));
        }
    }
    out
}
