//! Watering HTTP module.

mod dto;
mod handlers;
mod routes;

pub use handlers::WateringAppState;
pub use routes::watering_routes;
