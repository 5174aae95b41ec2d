//! HTTP handlers for watering endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::domain::foundation::ValidationError;
use crate::domain::watering::{SensorReading, WateringAdvisor};

use super::super::middleware::RequireAuth;
use super::super::payment::ErrorResponse;
use super::dto::{AdviceRequest, AdviceResponse};

/// Shared state for watering endpoints.
#[derive(Clone)]
pub struct WateringAppState {
    pub advisor: Arc<WateringAdvisor>,
}

/// POST /advice - recommend a watering action for a sensor reading.
pub async fn watering_advice(
    State(state): State<WateringAppState>,
    RequireAuth(_user): RequireAuth,
    Json(request): Json<AdviceRequest>,
) -> Result<impl IntoResponse, WateringApiError> {
    let reading = SensorReading::new(
        request.soil_moisture,
        request.temperature_c,
        request.humidity,
    )?;

    let advice = state.advisor.recommend(&reading);

    Ok(Json(AdviceResponse::from(advice)))
}

/// API error type for watering endpoints.
pub struct WateringApiError(ValidationError);

impl From<ValidationError> for WateringApiError {
    fn from(err: ValidationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WateringApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorResponse::new("INVALID_READING", self.0.to_string());
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}
