//! SubscriptionStore port - persistence contract for subscriptions.
//!
//! One record per user. The activator is the only writer; implementations
//! upsert so a first purchase and a renewal are the same operation.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::{Plan, SubscriptionRecord};

/// Port for reading and upgrading subscription records.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Find a user's subscription record.
    ///
    /// Returns `None` if the user has never subscribed.
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Set the user's plan to the purchased tier with the given end date.
    ///
    /// Upserts: creates the record on first purchase, overwrites plan and
    /// end date on renewal.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upgrade_plan(
        &self,
        user_id: &UserId,
        plan: Plan,
        end_date: Timestamp,
    ) -> Result<(), DomainError>;
}


#[cfg(test)]
mod tests {
    use super::in_memory::InMemorySubscriptionStore;
    use super::*;
    use crate::domain::subscription::SubscriptionStatus;

    #[tokio::test]
    async fn find_returns_none_for_new_user() {
        let store = InMemorySubscriptionStore::new();
        let found = store.find_by_user_id(&UserId::new()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn upgrade_creates_active_record() {
        let store = InMemorySubscriptionStore::new();
        let user_id = UserId::new();
        let end_date = Timestamp::now().add_days(30);

        store
            .upgrade_plan(&user_id, Plan::Monthly, end_date)
            .await
            .unwrap();

        let record = store.find_by_user_id(&user_id).await.unwrap().unwrap();
        assert_eq!(record.status, SubscriptionStatus::Active);
        assert_eq!(record.plan, Some(Plan::Monthly));
        assert_eq!(record.end_date, Some(end_date));
    }

    #[tokio::test]
    async fn upgrade_overwrites_existing_record() {
        let store = InMemorySubscriptionStore::new();
        let user_id = UserId::new();
        let first_end = Timestamp::now().add_days(30);
        let second_end = Timestamp::now().add_days(365);

        store
            .upgrade_plan(&user_id, Plan::Monthly, first_end)
            .await
            .unwrap();
        store
            .upgrade_plan(&user_id, Plan::Annual, second_end)
            .await
            .unwrap();

        let record = store.find_by_user_id(&user_id).await.unwrap().unwrap();
        assert_eq!(record.plan, Some(Plan::Annual));
        assert_eq!(record.end_date, Some(second_end));
        assert_eq!(store.upgrade_count(), 2);
    }

    #[tokio::test]
    async fn failing_store_reports_database_error() {
        let store = InMemorySubscriptionStore::failing();
        let result = store
            .upgrade_plan(&UserId::new(), Plan::Monthly, Timestamp::now())
            .await;
        assert!(result.is_err());
        assert_eq!(store.upgrade_count(), 0);
    }

    // Trait object safety test
    #[test]
    fn subscription_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn SubscriptionStore) {}
    }
}
