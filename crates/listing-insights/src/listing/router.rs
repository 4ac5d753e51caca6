use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::cache::InsightsCache;
use super::report::{MortgageCalculatorRequest, PaymentReport, PaymentRequest};
use super::service::{InsightsError, ListingInsightsService};
use super::sources::{AmenitySource, ListingDataSource, ListingId};
use crate::error::AppError;
use crate::market::{classify_market_position, MarketPosition};
use crate::walkability::AmenityObservation;

/// HTTP endpoints for the calculators and the listing-backed reports.
pub fn insights_router<L, A, C>(service: Arc<ListingInsightsService<L, A, C>>) -> Router
where
    L: ListingDataSource + 'static,
    A: AmenitySource + 'static,
    C: InsightsCache + 'static,
{
    Router::new()
        .route(
            "/api/v1/calculators/mortgage",
            post(mortgage_handler::<L, A, C>),
        )
        .route(
            "/api/v1/calculators/walkability",
            post(walkability_calculator_handler::<L, A, C>),
        )
        .route(
            "/api/v1/calculators/market-position",
            post(market_position_handler),
        )
        .route(
            "/api/v1/listings/:listing_id/payments",
            post(listing_payments_handler::<L, A, C>),
        )
        .route(
            "/api/v1/listings/:listing_id/walkability",
            get(listing_walkability_handler::<L, A, C>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct WalkabilityRequest {
    #[serde(default)]
    pub(crate) observations: Vec<AmenityObservation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MarketPositionRequest {
    pub(crate) listing_price: f64,
    #[serde(default)]
    pub(crate) estimated_value: Option<f64>,
    #[serde(default)]
    pub(crate) comparable_average: Option<f64>,
    #[serde(default)]
    pub(crate) position_hint: Option<String>,
}

pub(crate) fn error_response(error: InsightsError) -> Response {
    AppError::from(error).into_response()
}

pub(crate) async fn mortgage_handler<L, A, C>(
    State(service): State<Arc<ListingInsightsService<L, A, C>>>,
    Json(request): Json<MortgageCalculatorRequest>,
) -> Response
where
    L: ListingDataSource + 'static,
    A: AmenitySource + 'static,
    C: InsightsCache + 'static,
{
    match service.calculate(&request) {
        Ok(report) => {
            let rounded = PaymentReport::Priced(Box::new(report)).rounded();
            (StatusCode::OK, Json(rounded)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn walkability_calculator_handler<L, A, C>(
    State(service): State<Arc<ListingInsightsService<L, A, C>>>,
    Json(request): Json<WalkabilityRequest>,
) -> Response
where
    L: ListingDataSource + 'static,
    A: AmenitySource + 'static,
    C: InsightsCache + 'static,
{
    let score = service.walkability_engine().score(&request.observations);
    (StatusCode::OK, Json(score)).into_response()
}

pub(crate) async fn market_position_handler(Json(request): Json<MarketPositionRequest>) -> Response {
    let hint = request
        .position_hint
        .as_deref()
        .and_then(MarketPosition::from_hint);

    match classify_market_position(
        request.listing_price,
        request.estimated_value,
        request.comparable_average,
        hint,
    ) {
        Ok(comparison) => (StatusCode::OK, Json(comparison)).into_response(),
        Err(error) => error_response(error.into()),
    }
}

pub(crate) async fn listing_payments_handler<L, A, C>(
    State(service): State<Arc<ListingInsightsService<L, A, C>>>,
    Path(listing_id): Path<String>,
    request: Option<Json<PaymentRequest>>,
) -> Response
where
    L: ListingDataSource + 'static,
    A: AmenitySource + 'static,
    C: InsightsCache + 'static,
{
    let request = request.map(|Json(request)| request).unwrap_or_default();
    match service.payment_report(&ListingId(listing_id), &request) {
        Ok(report) => (StatusCode::OK, Json(report.rounded())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn listing_walkability_handler<L, A, C>(
    State(service): State<Arc<ListingInsightsService<L, A, C>>>,
    Path(listing_id): Path<String>,
) -> Response
where
    L: ListingDataSource + 'static,
    A: AmenitySource + 'static,
    C: InsightsCache + 'static,
{
    match service.walkability(&ListingId(listing_id)) {
        Ok(score) => (StatusCode::OK, Json(score)).into_response(),
        Err(error) => error_response(error),
    }
}
