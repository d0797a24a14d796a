//! Behavior-driven tests for the HTTP surface.
//!
//! In-process requests against the router: response shape, ordering under
//! partial failure, sentinel rendering, and the CORS headers every response
//! must carry.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use tickersnap_core::provider::{ProfileSource, ProviderError};
use tickersnap_core::SnapshotFetcher;
use tickersnap_server::{create_router, AppState};
use tickersnap_tests::{all_fixed_succeed, sparse_profile, ScriptedSource};

fn router_with(source: impl ProfileSource + 'static) -> Router {
    let fetcher = Arc::new(SnapshotFetcher::new(Arc::new(source)));
    create_router(AppState::new(fetcher))
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}

// =============================================================================
// HTTP Surface: Response Shape
// =============================================================================

#[tokio::test]
async fn when_all_symbols_resolve_response_is_an_array_of_five_objects() {
    let (status, value) = get_json(router_with(all_fixed_succeed()), "/top-stocks").await;

    assert_eq!(status, StatusCode::OK);
    let entries = value.as_array().expect("array body");
    assert_eq!(entries.len(), 5);

    let symbols: Vec<&str> = entries
        .iter()
        .map(|entry| entry["symbol"].as_str().expect("symbol string"))
        .collect();
    assert_eq!(symbols, ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA"]);

    // Numeric fields stay numbers on the wire
    assert!(entries[0]["currentPrice"].is_f64());
    assert!(entries[0]["previousClose"].is_f64());
    assert_eq!(entries[0]["name"], "Apple Inc.");
    assert_eq!(entries[0]["sector"], "Technology");
}

#[tokio::test]
async fn when_a_symbol_fails_the_response_drops_that_entry_only() {
    let source = all_fixed_succeed()
        .with_failure("MSFT", ProviderError::unavailable("upstream timeout"));

    let (status, value) = get_json(router_with(source), "/top-stocks").await;

    assert_eq!(status, StatusCode::OK);
    let symbols: Vec<&str> = value
        .as_array()
        .expect("array body")
        .iter()
        .map(|entry| entry["symbol"].as_str().expect("symbol string"))
        .collect();
    assert_eq!(symbols, ["AAPL", "GOOGL", "AMZN", "TSLA"]);
}

#[tokio::test]
async fn when_fields_are_missing_the_sentinel_appears_as_a_string() {
    let source = ScriptedSource::new().with_profile(sparse_profile("AAPL"));

    // Only AAPL is scripted; the other four fixed symbols fail and drop out.
    let (_, value) = get_json(router_with(source), "/top-stocks").await;

    let entries = value.as_array().expect("array body");
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry["symbol"], "AAPL");
    assert_eq!(entry["name"], "N/A");
    assert_eq!(entry["sector"], "N/A");
    assert_eq!(entry["currentPrice"], "N/A");
    assert_eq!(entry["previousClose"], "N/A");
    assert!(!entry["currentPrice"].is_null());
}

#[tokio::test]
async fn when_every_symbol_fails_the_response_is_an_empty_array_with_status_ok() {
    let (status, value) = get_json(router_with(ScriptedSource::new()), "/top-stocks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value.as_array().map(Vec::len), Some(0));
}

// =============================================================================
// HTTP Surface: CORS
// =============================================================================

#[tokio::test]
async fn when_a_browser_origin_calls_cors_headers_allow_it_with_credentials() {
    let response = router_with(all_fixed_succeed())
        .oneshot(
            Request::builder()
                .uri("/top-stocks")
                .header(header::ORIGIN, "https://dashboard.example")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|v| v.to_str().expect("header value")),
        Some("https://dashboard.example")
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .map(|v| v.to_str().expect("header value")),
        Some("true")
    );
}

#[tokio::test]
async fn when_symbol_lookups_fail_cors_headers_are_still_present() {
    let source = ScriptedSource::new(); // every lookup fails
    let response = router_with(source)
        .oneshot(
            Request::builder()
                .uri("/top-stocks")
                .header(header::ORIGIN, "https://dashboard.example")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn when_a_preflight_arrives_the_requested_method_is_allowed() {
    let response = router_with(all_fixed_succeed())
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/top-stocks")
                .header(header::ORIGIN, "https://dashboard.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert!(response.status().is_success());
    let allowed = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .map(|v| v.to_str().expect("header value"))
        .expect("preflight must allow the requested method");
    assert!(allowed.contains("GET"));
}

// =============================================================================
// HTTP Surface: Health
// =============================================================================

#[tokio::test]
async fn when_health_is_probed_the_service_answers_ok() {
    let response = router_with(all_fixed_succeed())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}
