use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use langchain_rust::language_models::llm::LLM;
use langchain_rust::llm::client::GenerationOptions;
use langchain_rust::llm::ollama::client::{Ollama, OllamaClient};
use ns_core::{Error, Result, SentimentLabel, SentimentModel, SentimentResult};
use url::Url;

use crate::{Config, ModelConfig};

const DEFAULT_MODEL_URL: &str = "http://localhost:11434/gemma3:12b";

#[derive(Debug)]
pub struct OllamaConfig {
    ollama_host: String,
    ollama_port: u16,
    model_name: String,
}

impl ModelConfig for OllamaConfig {
    /// Reads `http://host:port/model` from the model URL.
    fn from_config(config: &Config) -> Self {
        let url = config
            .model_url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .or_else(|| Url::parse(DEFAULT_MODEL_URL).ok());

        match url {
            Some(url) => {
                let model_name = url.path().trim_start_matches('/').to_string();
                Self {
                    ollama_host: format!("{}://{}", url.scheme(), url.host_str().unwrap_or("localhost")),
                    ollama_port: url.port().unwrap_or(11434),
                    model_name: if model_name.is_empty() { "gemma3:12b".to_string() } else { model_name },
                }
            }
            None => Self {
                ollama_host: "http://localhost".to_string(),
                ollama_port: 11434,
                model_name: "gemma3:12b".to_string(),
            },
        }
    }
}

/// Asks a local LLM for a one-word label per headline.
pub struct OllamaModel {
    ollama: Ollama,
    model_name: String,
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("ollama", &"<Ollama>")
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OllamaModel {
    pub async fn new(config: &Config) -> Result<Self> {
        let config = OllamaConfig::from_config(config);
        let client = Arc::new(OllamaClient::new(config.ollama_host.as_str(), config.ollama_port));
        let ollama = Ollama::new(client, config.model_name.clone(), Some(GenerationOptions::default()));

        if let Err(e) = ollama.invoke("Reply with the word ok.").await {
            return Err(Error::External(anyhow!(
                "Ollama is not available at {}:{}: {}. Please ensure Ollama is running and the model '{}' is installed.",
                config.ollama_host,
                config.ollama_port,
                e,
                config.model_name
            )));
        }

        Ok(Self {
            ollama,
            model_name: config.model_name,
        })
    }
}

fn prompt(headline: &str) -> String {
    format!(
        "Classify the sentiment of this financial news headline as positive, negative or neutral. \
         Answer with exactly one word.\n\nHeadline: {}",
        headline
    )
}

#[async_trait]
impl SentimentModel for OllamaModel {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn classify_one(&self, text: &str) -> Result<SentimentResult> {
        let answer = self
            .ollama
            .invoke(&prompt(text))
            .await
            .map_err(|e| Error::External(anyhow!("Failed to classify headline: {}", e)))?;

        let word = answer
            .split(|c: char| !c.is_alphabetic())
            .find(|w| !w.is_empty())
            .unwrap_or_default();
        match SentimentLabel::parse(word) {
            SentimentLabel::Unknown => Err(Error::Inference(format!("unrecognised label: {}", answer.trim()))),
            label => Ok(SentimentResult::new(label, 1.0)),
        }
    }
}
