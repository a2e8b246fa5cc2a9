use std::fmt;

use async_trait::async_trait;
use ns_core::{Error, Result, SentimentLabel, SentimentModel, SentimentResult};

const POSITIVE: &[&str] = &[
    "beat", "beats", "boost", "boosts", "bullish", "buy", "climb", "climbs", "gain", "gains",
    "growth", "high", "higher", "jump", "jumps", "outperform", "outperforms", "profit",
    "profits", "rally", "rallies", "record", "rebound", "rise", "rises", "soar", "soars",
    "strong", "surge", "surges", "upgrade", "upgraded", "upgrades", "win", "wins",
];

const NEGATIVE: &[&str] = &[
    "bearish", "cut", "cuts", "decline", "declines", "downgrade", "downgraded", "downgrades",
    "drop", "drops", "fall", "falls", "fraud", "lawsuit", "layoffs", "lose", "loses", "loss",
    "losses", "low", "lower", "miss", "misses", "plunge", "plunges", "probe", "recall", "sell",
    "selloff", "sink", "sinks", "slump", "slumps", "tumble", "tumbles", "warning", "weak",
];

const NEGATORS: &[&str] = &["no", "not", "never", "without", "fails", "failed"];

/// Offline keyword scorer for financial headlines.
///
/// Counts positive and negative terms, flipping a term that directly follows
/// a negator. The label follows the majority; confidence grows with how
/// one-sided the hits are.
#[derive(Default, Clone)]
pub struct LexiconModel;

impl fmt::Debug for LexiconModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexiconModel").finish()
    }
}

impl LexiconModel {
    pub fn new() -> Self {
        Self
    }

    fn score(text: &str) -> SentimentResult {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
            .collect();

        let (mut positive, mut negative) = (0u32, 0u32);
        for (i, word) in words.iter().enumerate() {
            let negated = i > 0 && NEGATORS.contains(&words[i - 1].as_str());
            let polarity = if POSITIVE.contains(&word.as_str()) {
                1
            } else if NEGATIVE.contains(&word.as_str()) {
                -1
            } else {
                0
            };
            match (polarity, negated) {
                (1, false) | (-1, true) => positive += 1,
                (-1, false) | (1, true) => negative += 1,
                _ => {}
            }
        }

        let total = positive + negative;
        if total == 0 || positive == negative {
            return SentimentResult::new(SentimentLabel::Neutral, 0.5);
        }
        let lead = positive.abs_diff(negative) as f32 / total as f32;
        let label = if positive > negative {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };
        SentimentResult::new(label, 0.5 + 0.5 * lead)
    }
}

#[async_trait]
impl SentimentModel for LexiconModel {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn classify_one(&self, text: &str) -> Result<SentimentResult> {
        if text.trim().is_empty() {
            return Err(Error::Inference("cannot classify empty text".to_string()));
        }
        Ok(Self::score(text))
    }
}
