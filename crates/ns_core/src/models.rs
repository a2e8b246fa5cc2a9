use async_trait::async_trait;
use crate::types::SentimentResult;
use crate::Result;

#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Short name used in logs and CLI output
    fn name(&self) -> &str;

    /// Classify a single piece of text
    async fn classify_one(&self, text: &str) -> Result<SentimentResult>;

    /// Classify a batch of texts, one result per input in input order
    async fn classify_batch(&self, texts: &[String]) -> Result<Vec<SentimentResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.classify_one(text).await?);
        }
        Ok(results)
    }
}
