//! ExpireStaleOrdersHandler - sweeps pending orders past the timeout.
//!
//! Driven by an external scheduler; the handler only applies the policy
//! for the `now` it is given.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::OrderRepository;

/// Handler for the pending-order expiry sweep.
pub struct ExpireStaleOrdersHandler {
    orders: Arc<dyn OrderRepository>,
    timeout_minutes: i64,
}

impl ExpireStaleOrdersHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, timeout_minutes: i64) -> Self {
        Self {
            orders,
            timeout_minutes,
        }
    }

    /// Expires every pending order older than the timeout.
    ///
    /// Returns the number of orders expired.
    pub async fn handle(&self, now: Timestamp) -> Result<u64, DomainError> {
        let cutoff = now.minus_minutes(self.timeout_minutes);
        let expired = self.orders.expire_pending_before(cutoff, now).await?;

        if expired > 0 {
            tracing::info!(expired, "Expired stale pending orders");
        }

        Ok(expired)
    }
}
