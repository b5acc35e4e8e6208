use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::pricing::{pricing_router, EvaluationRule, PriceCalculator};

fn quote_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/quotes")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn quote_endpoint_prices_with_legacy_policy() {
    let app = pricing_router(shared(legacy_calculator()));

    let response = app
        .oneshot(quote_request(json!({
            "base_price": 10000,
            "answers": { "calls": false, "touch": false }
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["final_price"], 5600);
    assert_eq!(body["category"], "smartphone");
    assert_eq!(body["policy"]["kind"], "legacy_fallback");
    assert_eq!(body["adjustments"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn quote_endpoint_honors_category() {
    let calculator = calculator_with(vec![EvaluationRule::percent(
        "screen_original",
        "false",
        10.0,
    )]);
    let app = pricing_router(shared(calculator));

    let response = app
        .oneshot(quote_request(json!({
            "base_price": 10000,
            "answers": { "screen_original": false },
            "category": "SMARTPHONE"
        })))
        .await
        .expect("router responds");

    let body = json_body(response).await;
    assert_eq!(body["final_price"], 9000);
    assert_eq!(body["policy"]["kind"], "configured_rules");
    assert_eq!(body["policy"]["fired"], 1);
}

#[tokio::test]
async fn quote_endpoint_rejects_malformed_payload() {
    let app = pricing_router(shared(legacy_calculator()));

    let response = app
        .oneshot(quote_request(json!({ "answers": { "calls": false } })))
        .await
        .expect("router responds");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn quote_endpoint_accepts_unexpected_answer_shapes() {
    let app = pricing_router(shared(legacy_calculator()));

    let response = app
        .oneshot(quote_request(json!({
            "base_price": 10000,
            "answers": { "calls": false, "notes": null, "storage_gb": 128 }
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["final_price"], 8000);
    assert_eq!(body["adjustments"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn quote_endpoint_reports_store_outage() {
    let app = pricing_router(Arc::new(PriceCalculator::new(UnavailableStore)));

    let response = app
        .oneshot(quote_request(json!({ "base_price": 10000 })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("connection refused")));
}

#[tokio::test]
async fn rules_endpoint_lists_configured_rules() {
    let calculator = calculator_with(vec![EvaluationRule::flat("accessories", "box", 50.0)]);
    let app = pricing_router(shared(calculator));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/pricing/rules/smartphone")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["policy"], "configured_rules");
    assert_eq!(body["rules"][0]["answer_key"], "box");
    assert_eq!(body["rules"][0]["deduction_amount"], 50.0);
}

#[tokio::test]
async fn rules_endpoint_reports_legacy_fallback_for_unknown_category() {
    let app = pricing_router(shared(legacy_calculator()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/pricing/rules/smartwatch")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    let body = json_body(response).await;
    assert_eq!(body["category"], "smartwatch");
    assert_eq!(body["policy"], "legacy_fallback");
    assert_eq!(body["rules"], json!([]));
}
