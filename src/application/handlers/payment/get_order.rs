//! GetOrderHandler - order status lookup for the owning user.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, UserId};
use crate::domain::payment::PaymentOrder;
use crate::ports::OrderRepository;

/// Query for a user's order.
#[derive(Debug, Clone)]
pub struct GetOrderQuery {
    pub order_id: OrderId,
    pub user_id: UserId,
}

/// Handler for order status lookups.
pub struct GetOrderHandler {
    orders: Arc<dyn OrderRepository>,
}

impl GetOrderHandler {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Fetches an order owned by the requesting user.
    ///
    /// Another user's order reads as not found, so references cannot be
    /// probed.
    pub async fn handle(&self, query: GetOrderQuery) -> Result<PaymentOrder, DomainError> {
        let order = self
            .orders
            .find_by_order_id(&query.order_id)
            .await?
            .filter(|order| order.user_id == query.user_id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::OrderNotFound,
                    format!("Order {} not found", query.order_id),
                )
            })?;

        Ok(order)
    }
}
