//! SubscriptionActivator - grants the purchased plan after a verified payment.

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::payment::CallbackError;
use crate::domain::subscription::Plan;
use crate::ports::SubscriptionStore;

/// Activates subscriptions exactly once per successful payment.
///
/// Invoked only after the payment state machine has recorded a
/// `pending -> succeeded` transition. A failure here is reported as
/// `ActivationFailed` so the paid-but-not-activated state is surfaced for
/// reconciliation instead of being lost; it is never retried against the
/// already-succeeded order.
pub struct SubscriptionActivator {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionActivator {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Upgrades the user to the purchased plan.
    ///
    /// Returns the granted end date (`now + plan duration`).
    ///
    /// # Errors
    ///
    /// Returns `CallbackError::ActivationFailed` if the store rejects the
    /// upgrade.
    pub async fn activate(
        &self,
        user_id: &UserId,
        plan: Plan,
        now: Timestamp,
    ) -> Result<Timestamp, CallbackError> {
        let end_date = now.add_days(plan.duration_days());

        self.store
            .upgrade_plan(user_id, plan, end_date)
            .await
            .map_err(|e| CallbackError::ActivationFailed(e.to_string()))?;

        Ok(end_date)
    }
}
