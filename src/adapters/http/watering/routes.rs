//! Axum router configuration for watering endpoints.

use axum::{routing::post, Router};

use super::handlers::{watering_advice, WateringAppState};

/// Create the watering API router.
///
/// # Routes
///
/// - `POST /advice` - Watering recommendation for a sensor reading
///
/// Mount behind the auth middleware.
pub fn watering_routes() -> Router<WateringAppState> {
    Router::new().route("/advice", post(watering_advice))
}
