use std::env;

pub mod adapter;
pub mod models;

pub use adapter::SentimentAdapter;
pub use models::{create_model, ModelKind};
pub use ns_core::SentimentModel;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub model_name: Option<String>,
    pub model_url: Option<String>,
    pub api_key: Option<String>,
}

impl Config {
    /// Reads `NS_MODEL`, `NS_MODEL_URL` and `HF_API_TOKEN`.
    pub fn from_env() -> Self {
        Self {
            model_name: env::var("NS_MODEL").ok().filter(|v| !v.is_empty()),
            model_url: env::var("NS_MODEL_URL").ok().filter(|v| !v.is_empty()),
            api_key: env::var("HF_API_TOKEN").ok().filter(|v| !v.is_empty()),
        }
    }

    /// Fills every unset field from `other`.
    pub fn or(self, other: Config) -> Self {
        Self {
            model_name: self.model_name.or(other.model_name),
            model_url: self.model_url.or(other.model_url),
            api_key: self.api_key.or(other.api_key),
        }
    }
}

/// Per-model settings derived from the shared [`Config`].
pub trait ModelConfig {
    fn from_config(config: &Config) -> Self;
}

pub mod prelude {
    pub use super::adapter::SentimentAdapter;
    pub use super::models::create_model;
    pub use super::Config;
    pub use ns_core::{Error, Result, SentimentLabel, SentimentModel, SentimentResult};
}
