//! ProcessCallbackHandler - handles a verified gateway callback end to end.
//!
//! Explicit composition, each stage feeding a typed result to the next:
//!
//! 1. Parse the raw query parameters.
//! 2. Signature verifier: reject on any mismatch, no state change.
//! 3. Amount check against the stored order, no state change on mismatch.
//! 4. Payment state machine: guarded `pending -> succeeded|failed`
//!    settlement through the repository (first writer wins).
//! 5. Subscription activator: exactly once, only after a won
//!    `pending -> succeeded` transition.
//!
//! ## Replay tolerance
//!
//! The gateway redelivers callbacks. A callback for an already-settled
//! order (or one that loses the settle race) reports `AlreadySettled`,
//! which the route acknowledges as success. No activation, no
//! `updated_at` change.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{OrderId, Timestamp, UserId};
use crate::domain::payment::{
    CallbackError, CallbackParams, CallbackVerifier, PaymentStatus, SignatureCheck,
};
use crate::ports::{OrderRepository, SettleOutcome};

use crate::application::handlers::subscription::SubscriptionActivator;

/// Command carrying the raw callback query parameters.
#[derive(Debug, Clone)]
pub struct ProcessCallbackCommand {
    pub query: HashMap<String, String>,
}

/// Result of callback processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessCallbackResult {
    /// Verified success callback settled the order and activated the
    /// subscription until `subscription_end`.
    Succeeded {
        order_id: OrderId,
        user_id: UserId,
        subscription_end: Timestamp,
    },

    /// Verified failure callback settled the order as failed.
    Failed { order_id: OrderId },

    /// The order was already settled (replay or lost race); acknowledged
    /// without side effects.
    AlreadySettled {
        order_id: OrderId,
        status: PaymentStatus,
    },
}

/// Handler for inbound gateway callbacks.
pub struct ProcessCallbackHandler {
    orders: Arc<dyn OrderRepository>,
    verifier: Arc<CallbackVerifier>,
    activator: SubscriptionActivator,
}

impl ProcessCallbackHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        verifier: Arc<CallbackVerifier>,
        activator: SubscriptionActivator,
    ) -> Self {
        Self {
            orders,
            verifier,
            activator,
        }
    }

    /// Processes one callback delivery.
    ///
    /// `now` is supplied by the caller; the handler never reads the clock.
    ///
    /// # Errors
    ///
    /// - `SignatureInvalid`, `OrderNotFound`, `AmountMismatch`,
    ///   `MissingParameter`, `MalformedParameter` - callback rejected, no
    ///   state change
    /// - `InvalidTransition` - callback for an order whose redirect was
    ///   never issued (inconsistency)
    /// - `ActivationFailed` - order settled as succeeded but the
    ///   subscription upgrade failed; needs manual reconciliation
    /// - `Database` - persistence failure
    pub async fn handle(
        &self,
        cmd: ProcessCallbackCommand,
        now: Timestamp,
    ) -> Result<ProcessCallbackResult, CallbackError> {
        // 1. Parse
        let params = CallbackParams::from_query(&cmd.query)?;

        // 2. Verify authenticity before touching anything
        let check = self
            .verifier
            .verify(&params.signed_params, params.signature.as_deref());
        if check != SignatureCheck::Valid {
            tracing::warn!(order_id = %params.order_id, "Rejected callback with invalid signature");
            return Err(CallbackError::SignatureInvalid);
        }

        // 3. Load the order and cross-check the amount
        let order = self
            .orders
            .find_by_order_id(&params.order_id)
            .await?
            .ok_or_else(|| CallbackError::OrderNotFound(params.order_id.to_string()))?;

        if params.amount != order.amount {
            tracing::warn!(
                order_id = %order.order_id,
                expected = order.amount,
                received = params.amount,
                "Rejected callback with mismatched amount"
            );
            return Err(CallbackError::AmountMismatch {
                expected: order.amount,
                received: params.amount,
            });
        }

        // Replayed callback for a settled order: acknowledge, change nothing
        if order.status.is_settled() {
            return Ok(ProcessCallbackResult::AlreadySettled {
                order_id: order.order_id,
                status: order.status,
            });
        }

        // Callback for an order whose redirect was never issued
        if order.status == PaymentStatus::Created {
            return Err(CallbackError::InvalidTransition(format!(
                "order {} received a callback before its redirect was issued",
                order.order_id
            )));
        }

        // 4. Guarded settlement; concurrent deliveries serialize here
        let target = if params.is_success() {
            PaymentStatus::Succeeded
        } else {
            PaymentStatus::Failed
        };

        let outcome = self
            .orders
            .settle(
                &order.order_id,
                target,
                params.transaction_id.as_deref(),
                now,
            )
            .await?;

        if outcome == SettleOutcome::NotPending {
            // Lost the race; the other delivery owns the side effects.
            let settled = self
                .orders
                .find_by_order_id(&order.order_id)
                .await?
                .ok_or_else(|| CallbackError::OrderNotFound(order.order_id.to_string()))?;
            return Ok(ProcessCallbackResult::AlreadySettled {
                order_id: settled.order_id,
                status: settled.status,
            });
        }

        if target == PaymentStatus::Failed {
            tracing::info!(order_id = %order.order_id, code = %params.response_code, "Order failed");
            return Ok(ProcessCallbackResult::Failed {
                order_id: order.order_id,
            });
        }

        // 5. Exactly-once activation, only for the settle winner
        let subscription_end = self
            .activator
            .activate(&order.user_id, order.plan, now)
            .await?;

        tracing::info!(
            order_id = %order.order_id,
            user_id = %order.user_id,
            plan = %order.plan,
            "Order succeeded, subscription activated"
        );

        Ok(ProcessCallbackResult::Succeeded {
            order_id: order.order_id,
            user_id: order.user_id,
            subscription_end,
        })
    }
}
