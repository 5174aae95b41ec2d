//! HTTP adapters - axum routers, handlers, and middleware.

pub mod middleware;
pub mod payment;
pub mod watering;
