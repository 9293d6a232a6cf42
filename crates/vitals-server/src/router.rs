//! Axum route table, built once at startup.

use axum::{routing::get, Router};

use crate::{api, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/test/:value", get(api::test))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .route("/about", get(ops::about))
        .route("/version", get(ops::version))
        .with_state(state)
}
