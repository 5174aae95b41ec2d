//! GetSubscriptionHandler - subscription lookup for the current user.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::SubscriptionRecord;
use crate::ports::SubscriptionStore;

/// Handler for subscription lookups.
pub struct GetSubscriptionHandler {
    store: Arc<dyn SubscriptionStore>,
}

impl GetSubscriptionHandler {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Fetches the user's subscription record.
    ///
    /// Users without a purchase history get an empty record rather than
    /// an error.
    pub async fn handle(
        &self,
        user_id: UserId,
        now: Timestamp,
    ) -> Result<SubscriptionRecord, DomainError> {
        let record = self
            .store
            .find_by_user_id(&user_id)
            .await?
            .unwrap_or_else(|| SubscriptionRecord::none(user_id, now));

        Ok(record)
    }
}
