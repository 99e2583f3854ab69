//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that delegates to the PoP estimator.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{error, info_span, warn};
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::error::PopError;
use crate::observability::record_http_request;
use crate::simulation::{PopEstimator, PopOutcome};

use super::request::PopRequest;
use super::response::{ErrorResponse, HealthResponse, PopResponse, StatusResponse};

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Estimator shared by all requests.
    pub estimator: Arc<PopEstimator>,
    /// Conventions used to turn a request into a position.
    pub pricing: PricingConfig,
    /// Application version.
    pub version: String,
}

impl AppState {
    /// Create handler state.
    #[must_use]
    pub fn new(
        estimator: Arc<PopEstimator>,
        pricing: PricingConfig,
        version: impl Into<String>,
    ) -> Self {
        Self {
            estimator,
            pricing,
            version: version.into(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .route("/pop", post(calculate_pop))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// Service status endpoint.
async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.estimator.config();
    Json(StatusResponse {
        status: "running".to_string(),
        volatility_source: state.estimator.source_name().to_string(),
        trials: config.trials,
        workers: config.workers,
        version: state.version.clone(),
    })
}

/// Probability-of-profit endpoint.
async fn calculate_pop(
    State(state): State<AppState>,
    payload: Result<Json<PopRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected malformed PoP request");
            return respond(
                started,
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Invalid JSON"),
            );
        }
    };

    let span = info_span!(
        "pop_request",
        request_id = %Uuid::new_v4(),
        symbol = %request.symbol,
        legs = request.legs.len(),
    );
    let position = request.to_position(&state.pricing);
    let quotes = request.quoted_source();
    let estimator = Arc::clone(&state.estimator);

    let result = tokio::task::spawn_blocking(move || {
        span.in_scope(|| match quotes {
            Some(quotes) => estimator.estimate_with_source(&position, &quotes),
            None => estimator.estimate(&position),
        })
    })
    .await;

    match result {
        Ok(Ok(outcome)) => respond_outcome(started, &outcome),
        Ok(Err(err)) => {
            let status = if err.is_client_error() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            warn!(error = %err, code = err.code(), "PoP estimate refused");
            respond(started, status, pop_error_body(&err))
        }
        Err(join_error) => {
            error!(error = %join_error, "PoP estimate task failed");
            respond(
                started,
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("PoP computation failed"),
            )
        }
    }
}

fn pop_error_body(err: &PopError) -> ErrorResponse {
    ErrorResponse::new(err.to_string()).with_code(err.code())
}

fn respond_outcome(started: Instant, outcome: &PopOutcome) -> Response {
    record_http_request("/pop", StatusCode::OK.as_u16(), started.elapsed().as_secs_f64());
    (StatusCode::OK, Json(PopResponse::from(outcome))).into_response()
}

fn respond(started: Instant, status: StatusCode, body: ErrorResponse) -> Response {
    record_http_request("/pop", status.as_u16(), started.elapsed().as_secs_f64());
    (status, Json(body)).into_response()
}
