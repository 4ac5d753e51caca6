use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use listing_insights::listing::{
    insights_router, AmenitySource, InsightsCache, ListingDataSource, ListingInsightsService,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Calculator and listing routes plus the health, readiness and metrics probes.
pub(crate) fn with_operational_routes<L, A, C>(
    service: Arc<ListingInsightsService<L, A, C>>,
) -> axum::Router
where
    L: ListingDataSource + 'static,
    A: AmenitySource + 'static,
    C: InsightsCache + 'static,
{
    insights_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
