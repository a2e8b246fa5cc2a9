use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use ns_core::{Error, Result, SentimentLabel, SentimentModel, SentimentResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Config, ModelConfig};

const DEFAULT_MODEL_URL: &str = "https://api-inference.huggingface.co/models/ProsusAI/finbert";

#[derive(Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// The endpoint answers either one best label per input or every label per input.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    AllLabels(Vec<Vec<LabelScore>>),
    TopLabel(Vec<LabelScore>),
}

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub model_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ModelConfig for HuggingFaceConfig {
    fn from_config(config: &Config) -> Self {
        Self {
            model_url: config
                .model_url
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL_URL.to_string()),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Text-classification model served over HTTP, FinBERT by default.
pub struct HuggingFaceModel {
    client: Client,
    model_url: Url,
    api_key: Option<String>,
}

impl fmt::Debug for HuggingFaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HuggingFaceModel")
            .field("client", &"<reqwest::Client>")
            .field("model_url", &self.model_url.as_str())
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HuggingFaceModel {
    pub fn new(config: &Config) -> Result<Self> {
        let config = HuggingFaceConfig::from_config(config);
        let model_url = Url::parse(&config.model_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.model_url, e)))?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            model_url,
            api_key: config.api_key,
        })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        let mut request = self
            .client
            .post(self.model_url.clone())
            .json(&ClassificationRequest { inputs: texts });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Inference(format!(
                "classification endpoint returned {}: {}",
                status,
                body.trim()
            )));
        }
        parse_response(&body, texts.len())
    }
}

fn best(scores: &[LabelScore]) -> Option<SentimentResult> {
    scores
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|top| SentimentResult::new(SentimentLabel::parse(&top.label), top.score))
}

fn parse_response(body: &str, expected: usize) -> Result<Vec<SentimentResult>> {
    let response: ClassificationResponse = serde_json::from_str(body)
        .map_err(|e| Error::Inference(format!("unexpected classification response ({}): {}", e, body.trim())))?;

    let results: Vec<SentimentResult> = match response {
        ClassificationResponse::AllLabels(per_input) => per_input
            .iter()
            .map(|scores| best(scores).unwrap_or_else(SentimentResult::unknown))
            .collect(),
        ClassificationResponse::TopLabel(per_input) => per_input
            .iter()
            .map(|top| SentimentResult::new(SentimentLabel::parse(&top.label), top.score))
            .collect(),
    };

    if results.len() != expected {
        return Err(Error::Inference(format!(
            "expected {} classifications, got {}",
            expected,
            results.len()
        )));
    }
    Ok(results)
}

#[async_trait]
impl SentimentModel for HuggingFaceModel {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify_one(&self, text: &str) -> Result<SentimentResult> {
        let texts = [text.to_string()];
        let mut results = self.request(&texts).await?;
        results
            .pop()
            .ok_or_else(|| Error::Inference("empty classification response".to_string()))
    }

    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}
