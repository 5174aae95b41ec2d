//! OrderRepository port - persistence contract for payment orders.
//!
//! ## Why the guarded settle matters
//!
//! The gateway may deliver the same callback multiple times (network
//! timeouts, our endpoint acknowledging too late), and two deliveries can
//! race. Implementations must make `settle` first-writer-wins: the status
//! update only applies while the order is still `pending`, enforced by the
//! persistence engine (e.g. `UPDATE ... WHERE status = 'pending'`). The
//! losing caller observes `NotPending` and treats the callback as already
//! handled.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, Timestamp};
use crate::domain::payment::{PaymentOrder, PaymentStatus};

/// Result of attempting a guarded settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// This caller won: the order moved from `pending` to the target.
    Applied,

    /// The order was not `pending` anymore (or never was); nothing
    /// changed.
    NotPending,
}

/// Port for storing and retrieving payment orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order.
    ///
    /// # Errors
    ///
    /// - `OrderAlreadyExists` if the order reference is already taken
    /// - `DatabaseError` on persistence failure
    async fn create(&self, order: &PaymentOrder) -> Result<(), DomainError>;

    /// Find an order by its merchant reference.
    ///
    /// Returns `None` if we never issued this reference.
    async fn find_by_order_id(&self, order_id: &OrderId)
        -> Result<Option<PaymentOrder>, DomainError>;

    /// Record that the gateway redirect was issued (`created` -> `pending`).
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn mark_pending(&self, order_id: &OrderId, now: Timestamp) -> Result<(), DomainError>;

    /// Settle a pending order to a terminal status, first-writer-wins.
    ///
    /// `status` must be terminal (`succeeded`, `failed`, or `expired`).
    /// The update applies only while the stored status is `pending`;
    /// `updated_at` and `gateway_transaction_id` are untouched otherwise.
    async fn settle(
        &self,
        order_id: &OrderId,
        status: PaymentStatus,
        gateway_transaction_id: Option<&str>,
        now: Timestamp,
    ) -> Result<SettleOutcome, DomainError>;

    /// Expire every pending order created strictly before `cutoff`.
    ///
    /// Returns the number of orders expired. Driven by an external
    /// scheduler; `now` stamps `updated_at` on the expired rows.
    async fn expire_pending_before(
        &self,
        cutoff: Timestamp,
        now: Timestamp,
    ) -> Result<u64, DomainError>;
}

#[cfg(test)]
pub(crate) mod in_memory {
    //! In-memory implementation shared by unit tests.

    use std::collections::HashMap;
    use std::sync::Arc;

    use tokio::sync::RwLock;

    use crate::domain::foundation::ErrorCode;
    use crate::domain::payment::Settlement;

    use super::*;

    /// HashMap-backed repository with the same first-writer-wins
    /// semantics the Postgres adapter gets from its guarded UPDATE.
    pub struct InMemoryOrderRepository {
        orders: Arc<RwLock<HashMap<String, PaymentOrder>>>,
    }

    impl InMemoryOrderRepository {
        pub fn new() -> Self {
            Self {
                orders: Arc::new(RwLock::new(HashMap::new())),
            }
        }
    }

    #[async_trait]
    impl OrderRepository for InMemoryOrderRepository {
        async fn create(&self, order: &PaymentOrder) -> Result<(), DomainError> {
            let mut orders = self.orders.write().await;
            if orders.contains_key(order.order_id.as_str()) {
                return Err(DomainError::new(
                    ErrorCode::OrderAlreadyExists,
                    format!("Order {} already exists", order.order_id),
                ));
            }
            orders.insert(order.order_id.as_str().to_string(), order.clone());
            Ok(())
        }

        async fn find_by_order_id(
            &self,
            order_id: &OrderId,
        ) -> Result<Option<PaymentOrder>, DomainError> {
            let orders = self.orders.read().await;
            Ok(orders.get(order_id.as_str()).cloned())
        }

        async fn mark_pending(
            &self,
            order_id: &OrderId,
            now: Timestamp,
        ) -> Result<(), DomainError> {
            let mut orders = self.orders.write().await;
            let order = orders.get_mut(order_id.as_str()).ok_or_else(|| {
                DomainError::new(ErrorCode::OrderNotFound, format!("Order {} not found", order_id))
            })?;
            order.mark_pending(now)?;
            Ok(())
        }

        async fn settle(
            &self,
            order_id: &OrderId,
            status: PaymentStatus,
            gateway_transaction_id: Option<&str>,
            now: Timestamp,
        ) -> Result<SettleOutcome, DomainError> {
            let mut orders = self.orders.write().await;
            let order = match orders.get_mut(order_id.as_str()) {
                Some(order) => order,
                None => return Ok(SettleOutcome::NotPending),
            };
            if order.status != PaymentStatus::Pending {
                return Ok(SettleOutcome::NotPending);
            }
            match order.settle(status, gateway_transaction_id.map(String::from), now) {
                Ok(Settlement::Applied) => Ok(SettleOutcome::Applied),
                Ok(Settlement::AlreadySettled(_)) => Ok(SettleOutcome::NotPending),
                Err(e) => Err(e.into()),
            }
        }

        async fn expire_pending_before(
            &self,
            cutoff: Timestamp,
            now: Timestamp,
        ) -> Result<u64, DomainError> {
            let mut orders = self.orders.write().await;
            let mut expired = 0;
            for order in orders.values_mut() {
                if order.status == PaymentStatus::Pending && order.created_at.is_before(&cutoff) {
                    order
                        .settle(PaymentStatus::Expired, None, now)
                        .map_err(DomainError::from)?;
                    expired += 1;
                }
            }
            Ok(expired)
        }
    }
}
