//! Payment command and query handlers.

mod create_checkout;
mod expire_orders;
mod get_order;
mod process_callback;

pub use create_checkout::{CreateCheckoutCommand, CreateCheckoutHandler, CreatedCheckout};
pub use expire_orders::ExpireStaleOrdersHandler;
pub use get_order::{GetOrderHandler, GetOrderQuery};
pub use process_callback::{
    ProcessCallbackCommand, ProcessCallbackHandler, ProcessCallbackResult,
};
