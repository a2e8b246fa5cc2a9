use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ns_core::{Error, Result, SentimentModel};
use tracing::info;

use crate::Config;

pub mod huggingface;
pub mod lexicon;
#[cfg(feature = "ollama")]
pub mod ollama;

pub use huggingface::HuggingFaceModel;
pub use lexicon::LexiconModel;
#[cfg(feature = "ollama")]
pub use ollama::OllamaModel;

/// Sentiment backends selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Lexicon,
    HuggingFace,
    Ollama,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Lexicon => "lexicon",
            ModelKind::HuggingFace => "huggingface",
            ModelKind::Ollama => "ollama",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lexicon" | "dummy" => Ok(ModelKind::Lexicon),
            "huggingface" | "hf" | "finbert" => Ok(ModelKind::HuggingFace),
            "ollama" => Ok(ModelKind::Ollama),
            other => Err(Error::InvalidInput(format!(
                "Unknown sentiment model '{}'. Available models: lexicon (default), huggingface, ollama",
                other
            ))),
        }
    }
}

/// Builds the model named in `config`, defaulting to the offline lexicon.
pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn SentimentModel>> {
    let config = config.unwrap_or_default();
    let kind = match config.model_name.as_deref() {
        Some(name) => name.parse::<ModelKind>()?,
        None => ModelKind::default(),
    };

    let model: Arc<dyn SentimentModel> = match kind {
        ModelKind::Lexicon => Arc::new(LexiconModel::new()),
        ModelKind::HuggingFace => Arc::new(HuggingFaceModel::new(&config)?),
        #[cfg(feature = "ollama")]
        ModelKind::Ollama => Arc::new(OllamaModel::new(&config).await?),
        #[cfg(not(feature = "ollama"))]
        ModelKind::Ollama => {
            return Err(Error::Inference(
                "ollama support is not compiled in, rebuild with --features ollama".to_string(),
            ))
        }
    };

    info!("🧠 Sentiment model ready: {}", model.name());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_from_str() {
        assert_eq!("lexicon".parse::<ModelKind>().unwrap(), ModelKind::Lexicon);
        assert_eq!("FinBERT".parse::<ModelKind>().unwrap(), ModelKind::HuggingFace);
        assert_eq!(" ollama ".parse::<ModelKind>().unwrap(), ModelKind::Ollama);
        assert!("gpt".parse::<ModelKind>().is_err());
    }

    #[tokio::test]
    async fn test_create_model_defaults_to_lexicon() {
        let model = create_model(None).await.unwrap();
        assert_eq!(model.name(), "lexicon");
    }

    #[tokio::test]
    async fn test_create_model_rejects_unknown_name() {
        let config = Config {
            model_name: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(create_model(Some(config)).await, Err(Error::InvalidInput(_))));
    }
}
