use serde::{Deserialize, Serialize};

use super::answers::QuoteAnswers;
use super::rules::ProductCategory;

/// Inbound quote request, built once per questionnaire submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub base_price: f64,
    #[serde(default)]
    pub answers: QuoteAnswers,
    #[serde(default)]
    pub category: Option<ProductCategory>,
}

impl QuoteRequest {
    pub fn new(base_price: f64, answers: QuoteAnswers) -> Self {
        Self {
            base_price,
            answers,
            category: None,
        }
    }

    pub fn for_category(mut self, category: impl Into<ProductCategory>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Which policy produced a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingPolicy {
    ConfiguredRules { rule_count: usize, fired: usize },
    LegacyFallback,
}

impl PricingPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            PricingPolicy::ConfiguredRules { .. } => "configured_rules",
            PricingPolicy::LegacyFallback => "legacy_fallback",
        }
    }
}

/// How a single adjustment was derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdjustmentKind {
    Multiplier { factor: f64 },
    Flat,
    PercentOfBase { percent: f64 },
}

/// One step applied to the running price; `delta` is signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAdjustment {
    pub source: String,
    #[serde(flatten)]
    pub kind: AdjustmentKind,
    pub delta: f64,
}

/// Final offer together with the trail of adjustments that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub category: ProductCategory,
    pub base_price: f64,
    pub final_price: u64,
    pub policy: PricingPolicy,
    pub adjustments: Vec<PriceAdjustment>,
}

/// Running total accumulated while a policy walks the answers.
#[derive(Debug)]
pub(crate) struct PriceLedger {
    running: f64,
    adjustments: Vec<PriceAdjustment>,
}

impl PriceLedger {
    pub(crate) fn new(base_price: f64) -> Self {
        Self {
            running: base_price,
            adjustments: Vec::new(),
        }
    }

    pub(crate) fn multiply(&mut self, source: String, factor: f64) {
        let next = self.running * factor;
        self.record(source, AdjustmentKind::Multiplier { factor }, next - self.running);
        self.running = next;
    }

    pub(crate) fn add(&mut self, source: String, kind: AdjustmentKind, delta: f64) {
        self.running += delta;
        self.record(source, kind, delta);
    }

    fn record(&mut self, source: String, kind: AdjustmentKind, delta: f64) {
        self.adjustments.push(PriceAdjustment {
            source,
            kind,
            delta,
        });
    }

    pub(crate) fn running(&self) -> f64 {
        self.running
    }

    pub(crate) fn into_parts(self) -> (u64, Vec<PriceAdjustment>) {
        (floor_price(self.running), self.adjustments)
    }
}

/// `max(0, floor(running))`; NaN collapses to zero.
pub fn floor_price(running: f64) -> u64 {
    if running.is_nan() || running <= 0.0 {
        0
    } else {
        running.floor() as u64
    }
}
