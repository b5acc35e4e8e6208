use tracing::{debug, trace};

use super::answers::QuoteAnswers;
use super::legacy::apply_legacy_policy;
use super::provider::{RuleProvider, RuleStoreError};
use super::quote::{AdjustmentKind, PriceLedger, PriceQuote, PricingPolicy, QuoteRequest};
use super::rules::{EvaluationRule, ProductCategory};

/// Stateless calculator that turns questionnaire answers into an offer.
pub struct PriceCalculator<P> {
    provider: P,
    default_category: ProductCategory,
}

impl<P: RuleProvider> PriceCalculator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            default_category: ProductCategory::default(),
        }
    }

    pub fn with_default_category(mut self, category: ProductCategory) -> Self {
        self.default_category = category;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn default_category(&self) -> &ProductCategory {
        &self.default_category
    }

    /// Final offer for `base_price`; never negative, never fractional.
    ///
    /// Rule-store failures are returned unchanged.
    pub fn calculate_price(
        &self,
        base_price: f64,
        answers: &QuoteAnswers,
        category: Option<&ProductCategory>,
    ) -> Result<u64, RuleStoreError> {
        let category = category.unwrap_or(&self.default_category);
        let quote = self.price(base_price, answers, category)?;
        Ok(quote.final_price)
    }

    pub fn quote(&self, request: &QuoteRequest) -> Result<PriceQuote, RuleStoreError> {
        let category = request.category.as_ref().unwrap_or(&self.default_category);
        self.price(request.base_price, &request.answers, category)
    }

    fn price(
        &self,
        base_price: f64,
        answers: &QuoteAnswers,
        category: &ProductCategory,
    ) -> Result<PriceQuote, RuleStoreError> {
        let rules = self.provider.evaluation_rules(category)?;
        let quote = if rules.is_empty() {
            apply_legacy(base_price, answers, category.clone())
        } else {
            apply_rules(base_price, answers, &rules, category.clone())
        };

        debug!(
            %category,
            policy = quote.policy.label(),
            base_price,
            final_price = quote.final_price,
            "priced quote"
        );
        Ok(quote)
    }
}

/// Price `answers` against an ordered rule list.
///
/// Every firing rule contributes independently; percentages are always taken
/// of `base_price`, not of the running total.
pub fn apply_rules(
    base_price: f64,
    answers: &QuoteAnswers,
    rules: &[EvaluationRule],
    category: ProductCategory,
) -> PriceQuote {
    let mut ledger = PriceLedger::new(base_price);
    let mut fired = 0;

    for rule in rules.iter().filter(|rule| rule.fires(answers)) {
        fired += 1;
        trace!(rule = %rule.label(), "evaluation rule fired");

        // Non-finite deductions are skipped so one bad value cannot zero the offer.
        if rule.deduction_amount.is_finite() && rule.deduction_amount != 0.0 {
            ledger.add(rule.label(), AdjustmentKind::Flat, -rule.deduction_amount);
        }
        if rule.deduction_percent.is_finite() && rule.deduction_percent != 0.0 {
            ledger.add(
                rule.label(),
                AdjustmentKind::PercentOfBase {
                    percent: rule.deduction_percent,
                },
                -(base_price * rule.deduction_percent / 100.0),
            );
        }
    }

    finish(
        ledger,
        base_price,
        category,
        PricingPolicy::ConfiguredRules {
            rule_count: rules.len(),
            fired,
        },
    )
}

/// Price `answers` with the hardcoded fallback policy.
pub fn apply_legacy(
    base_price: f64,
    answers: &QuoteAnswers,
    category: ProductCategory,
) -> PriceQuote {
    let mut ledger = PriceLedger::new(base_price);
    apply_legacy_policy(&mut ledger, answers);
    finish(ledger, base_price, category, PricingPolicy::LegacyFallback)
}

fn finish(
    ledger: PriceLedger,
    base_price: f64,
    category: ProductCategory,
    policy: PricingPolicy,
) -> PriceQuote {
    if ledger.running() < 0.0 {
        trace!(running = ledger.running(), "offer clamped to zero");
    }
    let (final_price, adjustments) = ledger.into_parts();

    PriceQuote {
        category,
        base_price,
        final_price,
        policy,
        adjustments,
    }
}
