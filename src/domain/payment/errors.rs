//! Callback error types for gateway callback handling.
//!
//! Defines all error conditions that can occur while processing a gateway
//! callback, with acknowledgment-code mapping for the gateway's retry
//! machinery.

use thiserror::Error;

use crate::domain::foundation::DomainError;

/// Errors that occur during callback processing.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// Callback signature verification failed (or signature was absent).
    #[error("Invalid signature")]
    SignatureInvalid,

    /// Callback references an order we never issued.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Callback amount does not match the order amount.
    #[error("Amount mismatch: expected {expected}, received {received}")]
    AmountMismatch { expected: i64, received: i64 },

    /// Attempted state transition is not valid (e.g. callback for an
    /// order that never had its redirect issued).
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Payment recorded as succeeded but subscription activation failed.
    /// Requires manual reconciliation; never retried automatically.
    #[error("Activation failed: {0}")]
    ActivationFailed(String),

    /// Required callback parameter absent.
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Callback parameter present but unparseable.
    #[error("Malformed parameter: {0}")]
    MalformedParameter(&'static str),

    /// Persistence layer failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl CallbackError {
    /// Maps the error to the acknowledgment code returned to the gateway.
    ///
    /// The gateway keys its retry machinery off the ack body, not the HTTP
    /// status: `"00"` acknowledges, anything else reports why the callback
    /// was not accepted.
    pub fn ack_code(&self) -> &'static str {
        match self {
            CallbackError::OrderNotFound(_) => "01",
            CallbackError::AmountMismatch { .. } => "04",
            CallbackError::SignatureInvalid => "97",
            CallbackError::InvalidTransition(_)
            | CallbackError::ActivationFailed(_)
            | CallbackError::MissingParameter(_)
            | CallbackError::MalformedParameter(_)
            | CallbackError::Database(_) => "99",
        }
    }

    /// Returns true if the callback was rejected before any state change.
    ///
    /// Rejected callbacks leave the order exactly as it was.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CallbackError::SignatureInvalid
                | CallbackError::OrderNotFound(_)
                | CallbackError::AmountMismatch { .. }
                | CallbackError::MissingParameter(_)
                | CallbackError::MalformedParameter(_)
        )
    }
}

impl From<DomainError> for CallbackError {
    fn from(err: DomainError) -> Self {
        CallbackError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_invalid_displays_correctly() {
        assert_eq!(format!("{}", CallbackError::SignatureInvalid), "Invalid signature");
    }

    #[test]
    fn order_not_found_displays_reference() {
        let err = CallbackError::OrderNotFound("ord-123".to_string());
        assert_eq!(format!("{}", err), "Order not found: ord-123");
    }

    #[test]
    fn amount_mismatch_displays_both_amounts() {
        let err = CallbackError::AmountMismatch {
            expected: 49_000,
            received: 1_000,
        };
        assert_eq!(
            format!("{}", err),
            "Amount mismatch: expected 49000, received 1000"
        );
    }

    #[test]
    fn invalid_transition_displays_reason() {
        let err = CallbackError::InvalidTransition("created order got a callback".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid state transition: created order got a callback"
        );
    }

    #[test]
    fn activation_failed_displays_reason() {
        let err = CallbackError::ActivationFailed("store unreachable".to_string());
        assert_eq!(format!("{}", err), "Activation failed: store unreachable");
    }

    // ══════════════════════════════════════════════════════════════
    // Ack Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn order_not_found_acks_01() {
        assert_eq!(CallbackError::OrderNotFound("x".to_string()).ack_code(), "01");
    }

    #[test]
    fn amount_mismatch_acks_04() {
        let err = CallbackError::AmountMismatch {
            expected: 1,
            received: 2,
        };
        assert_eq!(err.ack_code(), "04");
    }

    #[test]
    fn signature_invalid_acks_97() {
        assert_eq!(CallbackError::SignatureInvalid.ack_code(), "97");
    }

    #[test]
    fn internal_errors_ack_99() {
        assert_eq!(
            CallbackError::InvalidTransition("x".to_string()).ack_code(),
            "99"
        );
        assert_eq!(
            CallbackError::ActivationFailed("x".to_string()).ack_code(),
            "99"
        );
        assert_eq!(CallbackError::Database("x".to_string()).ack_code(), "99");
        assert_eq!(CallbackError::MissingParameter("orderId").ack_code(), "99");
    }

    // ══════════════════════════════════════════════════════════════
    // Rejection Classification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn pre_transition_errors_are_rejections() {
        assert!(CallbackError::SignatureInvalid.is_rejection());
        assert!(CallbackError::OrderNotFound("x".to_string()).is_rejection());
        assert!(CallbackError::AmountMismatch {
            expected: 1,
            received: 2
        }
        .is_rejection());
        assert!(CallbackError::MissingParameter("amount").is_rejection());
    }

    #[test]
    fn post_transition_errors_are_not_rejections() {
        assert!(!CallbackError::ActivationFailed("x".to_string()).is_rejection());
        assert!(!CallbackError::InvalidTransition("x".to_string()).is_rejection());
        assert!(!CallbackError::Database("x".to_string()).is_rejection());
    }

    #[test]
    fn domain_error_converts_to_database_variant() {
        let domain = DomainError::database("connection refused");
        let err: CallbackError = domain.into();
        assert!(matches!(err, CallbackError::Database(_)));
    }
}
