use std::fmt;
use std::sync::Arc;

use ns_core::{SentimentModel, SentimentResult};
use tracing::{debug, warn};

/// Batch front end over a [`SentimentModel`].
///
/// Construct once and share; cloning only bumps the model's reference count.
/// Results always line up with the input titles, and a title the model
/// cannot score comes back as [`SentimentResult::unknown`].
#[derive(Clone)]
pub struct SentimentAdapter {
    model: Arc<dyn SentimentModel>,
}

impl fmt::Debug for SentimentAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentAdapter")
            .field("model", &self.model.name())
            .finish()
    }
}

impl SentimentAdapter {
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn classify(&self, titles: &[String]) -> Vec<SentimentResult> {
        if titles.is_empty() {
            return Vec::new();
        }

        match self.model.classify_batch(titles).await {
            Ok(results) if results.len() == titles.len() => return results,
            Ok(results) => warn!(
                model = self.model.name(),
                expected = titles.len(),
                got = results.len(),
                "Batch classification returned the wrong number of results, scoring titles one by one"
            ),
            Err(e) => warn!(
                model = self.model.name(),
                error = %e,
                "Batch classification failed, scoring titles one by one"
            ),
        }

        let mut results = Vec::with_capacity(titles.len());
        for title in titles {
            let result = match self.model.classify_one(title).await {
                Ok(result) => result,
                Err(e) => {
                    debug!(model = self.model.name(), %title, error = %e, "Title could not be classified");
                    SentimentResult::unknown()
                }
            };
            results.push(result);
        }
        results
    }
}
