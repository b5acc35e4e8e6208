use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use serde_json::Value;

use crate::pricing::{
    EvaluationRule, InMemoryRuleStore, PriceCalculator, ProductCategory, QuoteAnswers,
    RuleProvider, RuleStoreError,
};

pub(super) const BASE_PRICE: f64 = 10_000.0;

pub(super) fn legacy_calculator() -> PriceCalculator<InMemoryRuleStore> {
    PriceCalculator::new(InMemoryRuleStore::new())
}

pub(super) fn calculator_with(rules: Vec<EvaluationRule>) -> PriceCalculator<InMemoryRuleStore> {
    PriceCalculator::new(InMemoryRuleStore::new().with_rules(ProductCategory::default(), rules))
}

pub(super) fn price(
    calculator: &PriceCalculator<impl RuleProvider>,
    answers: &QuoteAnswers,
) -> u64 {
    calculator
        .calculate_price(BASE_PRICE, answers, None)
        .expect("in-memory store never fails")
}

pub(super) struct UnavailableStore;

impl RuleProvider for UnavailableStore {
    fn evaluation_rules(
        &self,
        _category: &ProductCategory,
    ) -> Result<Vec<EvaluationRule>, RuleStoreError> {
        Err(RuleStoreError::Unavailable("connection refused".to_string()))
    }
}

/// Counts lookups so tests can assert one fetch per calculation.
#[derive(Default)]
pub(super) struct CountingStore {
    pub(super) inner: InMemoryRuleStore,
    pub(super) lookups: AtomicUsize,
}

impl CountingStore {
    pub(super) fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl RuleProvider for CountingStore {
    fn evaluation_rules(
        &self,
        category: &ProductCategory,
    ) -> Result<Vec<EvaluationRule>, RuleStoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.evaluation_rules(category)
    }
}

pub(super) fn shared(
    calculator: PriceCalculator<InMemoryRuleStore>,
) -> Arc<PriceCalculator<InMemoryRuleStore>> {
    Arc::new(calculator)
}

pub(super) async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
