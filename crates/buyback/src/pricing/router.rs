use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::engine::PriceCalculator;
use super::provider::{RuleProvider, RuleStoreError};
use super::quote::QuoteRequest;
use super::rules::{EvaluationRule, ProductCategory};

/// Read-only view of the rules configured for one category.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSetView {
    pub category: ProductCategory,
    pub policy: &'static str,
    pub rules: Vec<EvaluationRule>,
}

/// Router builder exposing quote calculation and rule inspection.
pub fn pricing_router<P>(calculator: Arc<PriceCalculator<P>>) -> Router
where
    P: RuleProvider + 'static,
{
    Router::new()
        .route("/api/v1/quotes", post(quote_handler::<P>))
        .route("/api/v1/pricing/rules/:category", get(rules_handler::<P>))
        .with_state(calculator)
}

pub(crate) async fn quote_handler<P>(
    State(calculator): State<Arc<PriceCalculator<P>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    P: RuleProvider + 'static,
{
    match calculator.quote(&request) {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(error) => store_failure(error),
    }
}

pub(crate) async fn rules_handler<P>(
    State(calculator): State<Arc<PriceCalculator<P>>>,
    Path(category): Path<String>,
) -> Response
where
    P: RuleProvider + 'static,
{
    let category = ProductCategory::new(category);
    match calculator.provider().evaluation_rules(&category) {
        Ok(rules) => {
            let policy = if rules.is_empty() {
                "legacy_fallback"
            } else {
                "configured_rules"
            };
            let view = RuleSetView {
                category,
                policy,
                rules,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => store_failure(error),
    }
}

fn store_failure(error: RuleStoreError) -> Response {
    warn!(%error, "rule store lookup failed");
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
}
