//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::{info, warn};

use super::AppState;
use super::types::{ErrorResponse, HealthResponse, PredictRequest, PredictResponse};
use crate::advisor;
use crate::predict::PredictError;
use crate::weather::WeatherObservation;
use crate::weather::gateway::GatewayError;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Liveness probe.
///
/// `GET /healthz` → 200 + `{"status":"ok"}`
pub async fn get_healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Runs the snapshot-to-advice pipeline for one city.
///
/// `POST /predict` → 200 + `PredictResponse` JSON
///
/// Error mapping: blank or missing city → 400, unknown city → 404,
/// non-finite measurements → 422, weather or timezone upstream failure
/// → 502.
pub async fn post_predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let city = request.city.trim();
    if city.is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "`city` must not be blank"));
    }

    let current = state
        .gateway
        .fetch_current_weather(city)
        .await
        .map_err(|e| match &e {
            GatewayError::CityNotFound(_) => error(StatusCode::NOT_FOUND, e.to_string()),
            _ => {
                warn!(error = %e, "weather fetch failed");
                error(StatusCode::BAD_GATEWAY, e.to_string())
            }
        })?;

    let zone = state
        .resolver
        .resolve(current.latitude, current.longitude)
        .await
        .map_err(|e| {
            warn!(error = %e, "timezone resolution failed");
            error(StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    let observation = WeatherObservation::new(current, Utc::now().with_timezone(&zone));
    let prediction = state.service.predict(&observation).map_err(|e| match &e {
        PredictError::FeatureMismatch(_) => error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        PredictError::Artifact(_) => error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    })?;
    let tips = advisor::generate_tips(&observation, &prediction);

    info!(
        city = %observation.current.city,
        power_kw = prediction.rounded(),
        "served prediction"
    );
    Ok(Json(PredictResponse::build(&observation, &prediction, tips)))
}
