//! Token usage reported on assistant messages.

use crate::model::content::JsonObject;
use serde_json::Value;

/// Token usage statistics from a single message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Uncached input tokens.
    pub input_tokens: u64,
    /// Generated output tokens.
    pub output_tokens: u64,
    /// Input tokens written to the prompt cache.
    pub cache_creation_input_tokens: u64,
    /// Input tokens served from the prompt cache.
    pub cache_read_input_tokens: u64,
}

impl TokenUsage {
    /// Decode a `usage` object.
    ///
    /// Both `input_tokens` and `output_tokens` must be present; cache counters
    /// default to zero. Counts may be encoded as integers or floats.
    pub fn from_json(usage: &JsonObject) -> Option<Self> {
        Some(Self {
            input_tokens: token_count(usage, "input_tokens")?,
            output_tokens: token_count(usage, "output_tokens")?,
            cache_creation_input_tokens: token_count(usage, "cache_creation_input_tokens")
                .unwrap_or(0),
            cache_read_input_tokens: token_count(usage, "cache_read_input_tokens").unwrap_or(0),
        })
    }

    /// Cached input tokens (read + creation).
    pub fn cached_input(&self) -> u64 {
        self.cache_creation_input_tokens
            .saturating_add(self.cache_read_input_tokens)
    }
}

fn token_count(usage: &JsonObject, key: &str) -> Option<u64> {
    let value = usage.get(key)?;
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}
