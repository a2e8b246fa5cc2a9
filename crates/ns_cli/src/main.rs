use clap::Parser;
use ns_archive::{handle_command, init_logging, ArchiveArgs, ArchiveCommands, ReportManager};
use ns_core::config::{DEFAULT_BASE_URL, DEFAULT_MAX_PAGES};
use ns_core::{ArchiveConfig, Result};
use ns_inference::SentimentAdapter;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    /// Parses `30s`, `2m`, `1h`, `1m30s`, `250ms`; a bare number is seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total = Duration::ZERO;
        let mut current_number = String::new();
        let mut chars = s.trim().chars().peekable();
        let mut has_value = false;

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                current_number.push(c);
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            let num: u64 = current_number
                .parse()
                .map_err(|_| format!("Expected a number before '{}'", c))?;
            let part = match c {
                'm' if chars.peek() == Some(&'s') => {
                    chars.next();
                    Some(Duration::from_millis(num))
                }
                's' => Some(Duration::from_secs(num)),
                'm' => num.checked_mul(60).map(Duration::from_secs),
                'h' => num.checked_mul(3600).map(Duration::from_secs),
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total = part
                .and_then(|part| total.checked_add(part))
                .ok_or_else(|| "Duration is too large".to_string())?;
            current_number.clear();
            has_value = true;
        }

        if !current_number.is_empty() {
            let num: u64 = current_number
                .parse()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total = total
                .checked_add(Duration::from_secs(num))
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_value = true;
        }

        if !has_value {
            return Err("Duration must include a number".to_string());
        }
        Ok(HumanDuration(total))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Find a day's news for a ticker and score the headlines", long_about = None)]
pub struct Cli {
    /// Archive root, e.g. a local mirror
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Per-request timeout (e.g. 30s, 1m)
    #[arg(long, global = true, default_value = "30s")]
    timeout: HumanDuration,
    /// Extra attempts after a failed request
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,
    /// Pause between retries
    #[arg(long, global = true, default_value = "1s")]
    retry_delay: HumanDuration,
    /// Highest page number the date search may probe
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,
    /// Tickers processed at the same time
    #[arg(long, global = true, default_value_t = 4)]
    concurrency: usize,
    /// Keep only articles published on the target date
    #[arg(long, global = true)]
    only_target_date: bool,
    #[arg(long, global = true, help = "Sentiment model to use. Available models: lexicon (default), huggingface, ollama")]
    model: Option<String>,
    /// Classifier endpoint (huggingface) or http://host:port/model (ollama)
    #[arg(long, global = true)]
    model_url: Option<String>,
    /// Bearer token for the classifier endpoint, falls back to HF_API_TOKEN
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: ArchiveCommands,
}

impl Cli {
    fn archive_config(&self) -> ArchiveConfig {
        ArchiveConfig {
            timeout: self.timeout.0,
            max_pages: self.max_pages,
            retries: self.retries,
            retry_delay: self.retry_delay.0,
            only_target_date: self.only_target_date,
            concurrency: self.concurrency,
            ..ArchiveConfig::default().with_base_url(self.base_url.clone())
        }
    }

    fn inference_config(&self) -> ns_inference::Config {
        ns_inference::Config {
            model_name: self.model.clone(),
            model_url: self.model_url.clone(),
            api_key: self.api_key.clone(),
        }
        .or(ns_inference::Config::from_env())
    }

    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let config = cli.archive_config();
    let model = ns_inference::create_model(Some(cli.inference_config())).await?;
    let manager = ReportManager::with_archive(SentimentAdapter::new(model), config)?;
    info!(
        "🦗 Archive client ready ({}, max {} pages)",
        manager.config().base_url,
        manager.config().max_pages
    );

    handle_command(ArchiveArgs { command: cli.command }, &manager).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> HumanDuration {
        HumanDuration(Duration::from_secs(s))
    }

    #[test]
    fn test_human_duration() {
        assert_eq!("30s".parse::<HumanDuration>().unwrap(), secs(30));
        assert_eq!("2m".parse::<HumanDuration>().unwrap(), secs(120));
        assert_eq!("1h15m30s".parse::<HumanDuration>().unwrap(), secs(4530));
        assert_eq!("45".parse::<HumanDuration>().unwrap(), secs(45));
        assert_eq!(
            "250ms".parse::<HumanDuration>().unwrap(),
            HumanDuration(Duration::from_millis(250))
        );
        assert!("".parse::<HumanDuration>().is_err());
        assert!("5x".parse::<HumanDuration>().is_err());
        assert!("s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        assert!("9999999999999999h".parse::<HumanDuration>().is_err());
        assert!("99999999999999999999s".parse::<HumanDuration>().is_err());
        assert!(format!("{}s{}s", u64::MAX, 1).parse::<HumanDuration>().is_err());
        assert!(Cli::try_parse_from(["ns", "--timeout", "9999999999999999h", "page", "AAPL", "1"]).is_err());
    }

    #[test]
    fn test_cli_builds_configs() {
        let cli = Cli::parse_from([
            "ns",
            "--timeout",
            "5s",
            "--max-pages",
            "50",
            "report",
            "AAPL",
            "TSLA",
            "--date",
            "03/06/2024",
            "--only-target-date",
            "--model",
            "huggingface",
        ]);

        let config = cli.archive_config();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_pages, 50);
        assert!(config.only_target_date);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(cli.inference_config().model_name.as_deref(), Some("huggingface"));
        assert_eq!(cli.log_level(), Level::INFO);

        match cli.command {
            ArchiveCommands::Report { tickers, date, json, top } => {
                assert_eq!(tickers, vec!["AAPL", "TSLA"]);
                assert_eq!(date.to_string(), "2024-03-06");
                assert!(!json);
                assert_eq!(top, 5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_requires_tickers_and_date() {
        assert!(Cli::try_parse_from(["ns", "report", "--date", "03/06/2024"]).is_err());
        assert!(Cli::try_parse_from(["ns", "report", "AAPL"]).is_err());
        assert!(Cli::try_parse_from(["ns", "locate", "AAPL", "--date", "not-a-date"]).is_err());
        assert!(Cli::try_parse_from(["ns", "-vv", "page", "AAPL", "2"]).is_ok());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
