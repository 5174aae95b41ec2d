//! SubscriptionRecord entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, Timestamp, UserId, ValidationError};

use super::plan::Plan;
use super::status::SubscriptionStatus;

/// A user's subscription state.
///
/// Written exclusively by the subscription activator after a verified
/// payment success; read by access checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Owning user.
    pub user_id: UserId,

    /// Purchased tier. `None` until the first activation.
    pub plan: Option<Plan>,

    /// Lifecycle status.
    pub status: SubscriptionStatus,

    /// End of the paid period. `None` until the first activation.
    pub end_date: Option<Timestamp>,

    /// Last mutation time.
    pub updated_at: Timestamp,
}

impl SubscriptionRecord {
    /// Record for a user who has never subscribed.
    pub fn none(user_id: UserId, now: Timestamp) -> Self {
        Self {
            user_id,
            plan: None,
            status: SubscriptionStatus::None,
            end_date: None,
            updated_at: now,
        }
    }

    /// Activates or renews the subscription for the purchased plan.
    ///
    /// Sets `end_date = now + plan duration`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the status cannot move to `Active`
    /// (unreachable with the current state machine, but kept explicit).
    pub fn upgrade(&mut self, plan: Plan, now: Timestamp) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(SubscriptionStatus::Active)?;
        self.plan = Some(plan);
        self.end_date = Some(now.add_days(plan.duration_days()));
        self.updated_at = now;
        Ok(())
    }

    /// Returns true if the subscription grants access at the given time.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.status.has_access()
            && self
                .end_date
                .map(|end| !end.is_before(&now))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_record_has_no_plan_or_end_date() {
        let now = Timestamp::now();
        let record = SubscriptionRecord::none(UserId::new(), now);

        assert_eq!(record.status, SubscriptionStatus::None);
        assert!(record.plan.is_none());
        assert!(record.end_date.is_none());
        assert!(!record.is_active_at(now));
    }

    #[test]
    fn upgrade_activates_with_plan_duration() {
        let now = Timestamp::now();
        let mut record = SubscriptionRecord::none(UserId::new(), now);

        record.upgrade(Plan::Monthly, now).unwrap();

        assert_eq!(record.status, SubscriptionStatus::Active);
        assert_eq!(record.plan, Some(Plan::Monthly));
        assert_eq!(record.end_date, Some(now.add_days(30)));
        assert!(record.is_active_at(now));
    }

    #[test]
    fn renewal_extends_from_now() {
        let now = Timestamp::now();
        let mut record = SubscriptionRecord::none(UserId::new(), now);
        record.upgrade(Plan::Monthly, now).unwrap();

        let renewal_at = now.add_days(20);
        record.upgrade(Plan::Annual, renewal_at).unwrap();

        assert_eq!(record.plan, Some(Plan::Annual));
        assert_eq!(record.end_date, Some(renewal_at.add_days(365)));
    }

    #[test]
    fn access_lapses_after_end_date() {
        let now = Timestamp::now();
        let mut record = SubscriptionRecord::none(UserId::new(), now);
        record.upgrade(Plan::Monthly, now).unwrap();

        assert!(record.is_active_at(now.add_days(30)));
        assert!(!record.is_active_at(now.add_days(31)));
    }
}
