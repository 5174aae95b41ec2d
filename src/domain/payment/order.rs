//! PaymentOrder aggregate.
//!
//! An order is created at checkout, marked pending once the gateway
//! redirect is issued, and settled exactly once by a verified callback
//! or the expiry sweep. Settled orders are immutable; replayed
//! settlement attempts are observed as no-ops so gateway retries stay
//! harmless.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, StateMachine, Timestamp, UserId, ValidationError};
use crate::domain::subscription::Plan;

use super::status::PaymentStatus;

/// Result of applying a settlement to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The order moved from pending to the target status.
    Applied,

    /// The order was already settled; nothing changed, including
    /// `updated_at`.
    AlreadySettled(PaymentStatus),
}

/// A payment order owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Merchant order reference (unique, echoed by the gateway).
    pub order_id: OrderId,

    /// Purchasing user.
    pub user_id: UserId,

    /// Subscription tier being purchased.
    pub plan: Plan,

    /// Charge amount in minor currency units.
    pub amount: i64,

    /// ISO currency code.
    pub currency: String,

    /// Lifecycle status.
    pub status: PaymentStatus,

    /// Gateway-side transaction reference, set on settlement.
    pub gateway_transaction_id: Option<String>,

    /// Creation time.
    pub created_at: Timestamp,

    /// Last mutation time. Replayed settlements never touch this.
    pub updated_at: Timestamp,
}

impl PaymentOrder {
    /// Creates a new order in `Created`.
    pub fn create(
        order_id: OrderId,
        user_id: UserId,
        plan: Plan,
        amount: i64,
        currency: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            order_id,
            user_id,
            plan,
            amount,
            currency: currency.into(),
            status: PaymentStatus::Created,
            gateway_transaction_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records that the gateway redirect was issued.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the order is not in `Created`.
    pub fn mark_pending(&mut self, now: Timestamp) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(PaymentStatus::Pending)?;
        self.updated_at = now;
        Ok(())
    }

    /// Applies a settlement (`Succeeded`, `Failed`, or `Expired`).
    ///
    /// Settlement is idempotent over terminal states: an already-settled
    /// order reports `AlreadySettled` with its current status and remains
    /// untouched. A `Created` order cannot settle; the redirect was never
    /// issued, so a settlement attempt is an inconsistency.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the transition is not permitted from
    /// the current state (and the state is not terminal).
    pub fn settle(
        &mut self,
        target: PaymentStatus,
        gateway_transaction_id: Option<String>,
        now: Timestamp,
    ) -> Result<Settlement, ValidationError> {
        if self.status.is_settled() {
            return Ok(Settlement::AlreadySettled(self.status));
        }

        self.status = self.status.transition_to(target)?;
        if gateway_transaction_id.is_some() {
            self.gateway_transaction_id = gateway_transaction_id;
        }
        self.updated_at = now;
        Ok(Settlement::Applied)
    }
}
