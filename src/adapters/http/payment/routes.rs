//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout, expire_stale_orders, gateway_callback, get_order, get_subscription,
    PaymentAppState,
};

/// Create the authenticated payment API router.
///
/// # Routes
///
/// - `POST /checkout` - Start a gateway payment for a plan
/// - `GET /orders/{order_id}` - Order status for the owning user
/// - `GET /subscription` - Current user's subscription
///
/// Mount behind the auth middleware.
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/orders/:order_id", get(get_order))
        .route("/subscription", get(get_subscription))
}

/// Create the gateway callback router.
///
/// Separate from the authenticated routes: callbacks carry no user
/// token, their authenticity is the HMAC signature.
///
/// # Routes
/// - `GET /callback` - Gateway transaction-outcome callback
pub fn callback_routes() -> Router<PaymentAppState> {
    Router::new().route("/callback", get(gateway_callback))
}

/// Create the maintenance router.
///
/// Driven by the deployment's external scheduler, not by end users.
///
/// # Routes
/// - `POST /maintenance/expire` - Expire stale pending orders
pub fn maintenance_routes() -> Router<PaymentAppState> {
    Router::new().route("/maintenance/expire", post(expire_stale_orders))
}
