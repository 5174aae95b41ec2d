//! Subscription plan definitions.
//!
//! Represents the paid tiers available in the Verdant companion app.

use serde::{Deserialize, Serialize};

/// Subscription plan tier.
///
/// Determines the subscription duration granted on activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    /// Monthly subscription.
    Monthly,

    /// Annual subscription - best value.
    Annual,
}

impl Plan {
    /// Returns the subscription duration granted by this plan, in days.
    pub fn duration_days(&self) -> i64 {
        match self {
            Plan::Monthly => 30,
            Plan::Annual => 365,
        }
    }

    /// Returns the display name for this plan.
    pub fn display_name(&self) -> &'static str {
        match self {
            Plan::Monthly => "Monthly",
            Plan::Annual => "Annual",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
