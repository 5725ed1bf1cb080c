//! Domain model types (pure).
//!
//! Records are decoded once at the input boundary; everything downstream
//! works with the typed accessors and the closed [`ContentBlock`] variant set.

pub mod content;
pub mod error;
pub mod pricing;
pub mod record;
pub mod usage;

// Re-export for convenience
pub use content::{extract, ContentBlock, JsonObject, ResultContent};
pub use error::{AppError, InputError};
pub use pricing::{ModelPricing, PricingConfig};
pub use record::{Record, Role};
pub use usage::TokenUsage;
