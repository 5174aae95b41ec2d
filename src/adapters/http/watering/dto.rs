//! Request/response DTOs for watering endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::watering::{WateringAction, WateringAdvice};

/// A raw sensor reading submitted for advice.
#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub soil_moisture: u8,
    pub temperature_c: f64,
    pub humidity: u8,
}

/// The advisor's recommendation.
#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub action: WateringAction,
    pub reasons: Vec<String>,
}

impl From<WateringAdvice> for AdviceResponse {
    fn from(advice: WateringAdvice) -> Self {
        Self {
            action: advice.action,
            reasons: advice.reasons,
        }
    }
}
