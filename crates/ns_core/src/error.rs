use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("No results: {0}")]
    NoResults(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
