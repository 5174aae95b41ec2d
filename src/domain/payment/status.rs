//! Payment order status state machine.
//!
//! Defines all possible order states and valid transitions
//! according to the gateway payment lifecycle.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Payment order status.
///
/// Represents the current position of an order in the gateway
/// redirect/callback lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Order recorded; the gateway redirect has not been issued yet.
    Created,

    /// Redirect issued; awaiting the gateway callback.
    Pending,

    /// Verified success callback received. Terminal.
    Succeeded,

    /// Verified failure callback received. Terminal.
    Failed,

    /// No callback arrived within the timeout window. Terminal.
    Expired,
}

impl PaymentStatus {
    /// Returns true if the order has reached a settled outcome.
    ///
    /// Settled orders never change again; replayed callbacks for them
    /// are acknowledged without side effects.
    pub fn is_settled(&self) -> bool {
        self.is_terminal()
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            // From CREATED
            (Created, Pending)
            // From PENDING
                | (Pending, Succeeded)
                | (Pending, Failed)
                | (Pending, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Created => vec![Pending],
            Pending => vec![Succeeded, Failed, Expired],
            Succeeded => vec![],
            Failed => vec![],
            Expired => vec![],
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}
