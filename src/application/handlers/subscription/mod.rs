//! Subscription handlers.

mod activate_subscription;
mod get_subscription;

pub use activate_subscription::SubscriptionActivator;
pub use get_subscription::GetSubscriptionHandler;
