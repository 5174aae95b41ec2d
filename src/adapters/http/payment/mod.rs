//! Payment HTTP module.

mod dto;
mod handlers;
mod routes;

pub use dto::{CallbackAck, CheckoutRequest, CheckoutResponse, ErrorResponse};
pub use handlers::PaymentAppState;
pub use routes::{callback_routes, maintenance_routes, payment_routes};
