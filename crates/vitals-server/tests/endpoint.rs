#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::util::ServiceExt;

use vitals_core::error::{Result as CoreResult, VitalsError};
use vitals_core::metrics::Registry;
use vitals_server::app_state::AppState;
use vitals_server::config;
use vitals_server::handlers::{ApiMessage, CallerContext, RecordHandler};
use vitals_server::router::build_router;

fn test_state() -> AppState {
    let cfg = config::load_from_str("version: 1\n").expect("config");
    AppState::new(cfg)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("infallible");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec();
    (status, body)
}

#[tokio::test]
async fn records_value_and_acknowledges() {
    let state = test_state();
    let app = build_router(state.clone());

    let (status, body) = get(app, "/test/42").await;
    assert_eq!(status, StatusCode::OK);

    let msg: ApiMessage = serde_json::from_slice(&body).expect("json body");
    assert_eq!(msg, ApiMessage::ok("magic!"));

    assert_eq!(state.registry().meter("requests").count(), 1);
    let values = state.registry().histogram("values");
    assert_eq!(values.count(), 1);
    let snapshot = values.weighted_snapshot();
    assert_eq!(snapshot.min(), 42.0);
    assert_eq!(snapshot.max(), 42.0);
}

#[tokio::test]
async fn truncates_toward_zero() {
    let state = test_state();
    let app = build_router(state.clone());

    let (status, _) = get(app.clone(), "/test/3.9").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(app, "/test/-2.7").await;
    assert_eq!(status, StatusCode::OK);

    let snapshot = state.registry().histogram("values").weighted_snapshot();
    assert_eq!(snapshot.size(), 2);
    assert_eq!(snapshot.min(), -2.0);
    assert_eq!(snapshot.max(), 3.0);
}

#[tokio::test]
async fn n_calls_count_exactly_n() {
    let state = test_state();
    let app = build_router(state.clone());

    for _ in 0..5 {
        let (status, _) = get(app.clone(), "/test/1").await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(state.registry().meter("requests").count(), 5);
}

#[tokio::test]
async fn concurrent_calls_do_not_lose_counts() {
    let state = test_state();
    let app = build_router(state.clone());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let (status, _) = get(app, "/test/1").await;
            assert_eq!(status, StatusCode::OK);
        }));
    }
    for h in handles {
        h.await.expect("request task");
    }

    assert_eq!(state.registry().meter("requests").count(), 16);
}

#[tokio::test]
async fn malformed_value_is_rejected_before_the_handler() {
    let state = test_state();
    let app = build_router(state.clone());

    let (status, _) = get(app.clone(), "/test/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(app, "/test/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nothing reached a handler, so no instrument was ever created.
    let snapshot = state.registry().snapshot();
    assert!(snapshot.meters.is_empty());
    assert!(snapshot.histograms.is_empty());
}

#[tokio::test]
async fn out_of_range_value_rejects_without_recording() {
    let state = test_state();
    let app = build_router(state.clone());

    // Parses as a decimal but its truncation does not fit i64.
    let (status, _) = get(app, "/test/100000000000000000000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let snapshot = state.registry().snapshot();
    assert!(snapshot.meters.is_empty());
    assert!(snapshot.histograms.is_empty());
}

struct NotFoundHandler;

#[async_trait]
impl RecordHandler for NotFoundHandler {
    fn name(&self) -> &'static str {
        "not-found"
    }

    async fn record(&self, _value: Decimal, _ctx: &CallerContext) -> CoreResult<ApiMessage> {
        Err(VitalsError::NotFound)
    }
}

#[tokio::test]
async fn delegate_not_found_maps_to_404() {
    let cfg = config::load_from_str("version: 1\n").expect("config");
    let registry = Arc::new(Registry::new());
    let state = AppState::with_handler(cfg, registry, Arc::new(NotFoundHandler));
    let app = build_router(state);

    let (status, body) = get(app, "/test/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(body["code"], 404);
    assert_eq!(body["type"], "NOT_FOUND");
}

#[tokio::test]
async fn ops_endpoints_respond() {
    let state = test_state();
    let app = build_router(state.clone());

    let (status, body) = get(app.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");

    let (status, _) = get(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    state.set_draining();
    let (status, body) = get(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, b"draining");

    let (status, body) = get(app.clone(), "/about").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"vitals test server");

    let (status, body) = get(app, "/version").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn metrics_endpoint_reflects_recorded_values() {
    let state = test_state();
    let app = build_router(state);

    let (status, _) = get(app.clone(), "/test/7").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(body["meters"]["requests"]["count"], 1);
    assert_eq!(body["histograms"]["values"]["count"], 1);
    assert_eq!(body["histograms"]["values"]["min"], 7.0);
    assert_eq!(body["histograms"]["values"]["max"], 7.0);
}
