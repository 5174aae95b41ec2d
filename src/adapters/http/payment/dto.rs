//! Request/response DTOs for payment endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{PaymentOrder, PaymentStatus};
use crate::domain::subscription::{Plan, SubscriptionRecord, SubscriptionStatus};

/// Request to start a checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plan: Plan,
}

/// Response for a created checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub payment_url: String,
}

/// Response describing an order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub plan: Plan,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub gateway_transaction_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PaymentOrder> for OrderResponse {
    fn from(order: PaymentOrder) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            plan: order.plan,
            amount: order.amount,
            currency: order.currency,
            status: order.status,
            gateway_transaction_id: order.gateway_transaction_id,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Response describing the current user's subscription.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub plan: Option<Plan>,
    pub status: SubscriptionStatus,
    pub end_date: Option<Timestamp>,
    pub has_access: bool,
}

impl SubscriptionResponse {
    pub fn from_record(record: SubscriptionRecord, now: Timestamp) -> Self {
        Self {
            plan: record.plan,
            status: record.status,
            end_date: record.end_date,
            has_access: record.is_active_at(now),
        }
    }
}

/// Acknowledgment body returned to the gateway for every callback.
///
/// The gateway retries until it reads a well-formed ack; the `code`
/// carries the outcome (`"00"` accepted or already handled).
#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackAck {
    pub code: String,
    pub message: String,
}

impl CallbackAck {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            code: "00".to_string(),
            message: message.into(),
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Response for the expiry sweep.
#[derive(Debug, Serialize)]
pub struct ExpireResponse {
    pub expired: u64,
}

/// Standard error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
