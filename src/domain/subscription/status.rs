//! Subscription status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// User has never held a subscription.
    None,

    /// Paid subscription with access until `end_date`.
    Active,

    /// Subscription lapsed. User must purchase again to regain access.
    Expired,
}

impl SubscriptionStatus {
    /// Returns true if this status grants premium access.
    pub fn has_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // First purchase
            (None, Active)
            // Renewal extends the current period
                | (Active, Active)
                | (Active, Expired)
            // Re-purchase after lapse
                | (Expired, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            None => vec![Active],
            Active => vec![Active, Expired],
            Expired => vec![Active],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_purchase_activates() {
        let result = SubscriptionStatus::None.transition_to(SubscriptionStatus::Active);
        assert_eq!(result, Ok(SubscriptionStatus::Active));
    }

    #[test]
    fn active_can_renew() {
        assert!(SubscriptionStatus::Active.can_transition_to(&SubscriptionStatus::Active));
    }

    #[test]
    fn active_can_expire() {
        let result = SubscriptionStatus::Active.transition_to(SubscriptionStatus::Expired);
        assert_eq!(result, Ok(SubscriptionStatus::Expired));
    }

    #[test]
    fn expired_can_reactivate() {
        let result = SubscriptionStatus::Expired.transition_to(SubscriptionStatus::Active);
        assert_eq!(result, Ok(SubscriptionStatus::Active));
    }

    #[test]
    fn none_cannot_expire() {
        assert!(SubscriptionStatus::None
            .transition_to(SubscriptionStatus::Expired)
            .is_err());
    }

    #[test]
    fn only_active_has_access() {
        assert!(SubscriptionStatus::Active.has_access());
        assert!(!SubscriptionStatus::None.has_access());
        assert!(!SubscriptionStatus::Expired.has_access());
    }
}
