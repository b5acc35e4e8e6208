//! Buyback price calculation.
//!
//! A quote starts from the variant's undamaged market value and walks the
//! seller's questionnaire answers. Categories with configured evaluation
//! rules are priced rule by rule; categories without any fall back to the
//! hardcoded legacy policy. Either way the offer is floored and clamped at
//! zero.

pub mod answers;
pub mod engine;
pub mod import;
mod legacy;
pub mod provider;
pub mod quote;
pub mod router;
pub mod rules;

#[cfg(test)]
mod tests;

pub use answers::{parse_answer_pair, AnswerParseError, AnswerValue, QuoteAnswers};
pub use engine::{apply_legacy, apply_rules, PriceCalculator};
pub use import::{RuleCsvImporter, RuleImportError};
pub use provider::{InMemoryRuleStore, RuleProvider, RuleStoreError};
pub use quote::{
    floor_price, AdjustmentKind, PriceAdjustment, PriceQuote, PricingPolicy, QuoteRequest,
};
pub use router::{pricing_router, RuleSetView};
pub use rules::{EvaluationRule, ProductCategory};
