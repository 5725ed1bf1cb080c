//! Model pricing and per-message cost estimation.
//!
//! Prices are per million tokens in USD. Defaults cover the three Claude
//! model families and can be overridden from the `[pricing]` config section.

use crate::model::TokenUsage;
use std::collections::HashMap;

const MODEL_FAMILIES: [&str; 3] = ["opus", "sonnet", "haiku"];

// ===== PricingConfig =====

/// Pricing table used to estimate the cost of an assistant message.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    models: HashMap<String, ModelPricing>,
    default_pricing: Option<ModelPricing>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let mut models = HashMap::new();

        // Claude Opus - $15/$75 per million tokens
        models.insert(
            "opus".to_string(),
            ModelPricing::new(15.0, 75.0).with_cache(1.5),
        );
        // Claude Sonnet - $3/$15 per million tokens
        models.insert(
            "sonnet".to_string(),
            ModelPricing::new(3.0, 15.0).with_cache(0.3),
        );
        // Claude Haiku - $0.80/$4 per million tokens
        models.insert(
            "haiku".to_string(),
            ModelPricing::new(0.8, 4.0).with_cache(0.08),
        );

        Self {
            models,
            default_pricing: None,
        }
    }
}

impl PricingConfig {
    /// Get pricing for a model id.
    ///
    /// Tries:
    /// 1. Exact match on model_id
    /// 2. Model family match (contains "opus", "sonnet", or "haiku")
    /// 3. Configured default pricing, if any
    pub fn get(&self, model_id: &str) -> Option<&ModelPricing> {
        if let Some(pricing) = self.models.get(model_id) {
            return Some(pricing);
        }

        let normalized = model_id.to_lowercase();
        MODEL_FAMILIES
            .iter()
            .filter(|family| normalized.contains(*family))
            .find_map(|family| self.models.get(*family))
            .or(self.default_pricing.as_ref())
    }

    /// Estimated cost in USD of one message's usage.
    ///
    /// Returns `None` when the model has no known pricing or the cost is zero;
    /// callers suppress the figure in that case.
    pub fn cost(&self, usage: &TokenUsage, model_id: &str) -> Option<f64> {
        let pricing = self.get(model_id)?;

        let input_cost =
            (usage.input_tokens as f64 / 1_000_000.0) * pricing.input_cost_per_million;
        let output_cost =
            (usage.output_tokens as f64 / 1_000_000.0) * pricing.output_cost_per_million;

        // Use cached rate if available, otherwise use standard input rate
        let cache_rate = pricing
            .cached_input_cost_per_million
            .unwrap_or(pricing.input_cost_per_million);
        let cache_cost = (usage.cached_input() as f64 / 1_000_000.0) * cache_rate;

        let total = input_cost + output_cost + cache_cost;
        (total > 0.0).then_some(total)
    }
}

// ===== ModelPricing =====

/// Pricing for a specific model (per million tokens, in USD).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Cost per million uncached input tokens.
    pub input_cost_per_million: f64,
    /// Cost per million output tokens.
    pub output_cost_per_million: f64,
    /// Cost per million cached input tokens (cache read and creation).
    /// Falls back to the input rate when `None`.
    pub cached_input_cost_per_million: Option<f64>,
}

impl ModelPricing {
    /// Create new model pricing with input and output costs.
    pub const fn new(input: f64, output: f64) -> Self {
        Self {
            input_cost_per_million: input,
            output_cost_per_million: output,
            cached_input_cost_per_million: None,
        }
    }

    /// Add cached input pricing.
    pub const fn with_cache(mut self, cached: f64) -> Self {
        self.cached_input_cost_per_million = Some(cached);
        self
    }
}

// ===== Config Conversions =====

impl From<crate::config::PricingEntry> for ModelPricing {
    fn from(entry: crate::config::PricingEntry) -> Self {
        let mut pricing = ModelPricing::new(entry.input, entry.output);
        pricing.cached_input_cost_per_million = entry.cached_input;
        pricing
    }
}

impl From<crate::config::PricingConfigSection> for PricingConfig {
    /// Config entries are layered over the built-in defaults.
    fn from(section: crate::config::PricingConfigSection) -> Self {
        let mut config = PricingConfig::default();
        for (key, entry) in section.models {
            config.models.insert(key, entry.into());
        }
        config.default_pricing = section.default.map(Into::into);
        config
    }
}
