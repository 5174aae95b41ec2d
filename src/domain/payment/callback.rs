//! Parsed gateway callback parameters.
//!
//! The gateway reports a transaction outcome by redirecting to our
//! callback endpoint with a flat set of query parameters plus a
//! signature. This module extracts the fields we act on while keeping
//! the full parameter set for signature verification (the gateway signs
//! everything it sends, including fields we do not model).

use std::collections::{BTreeMap, HashMap};

use crate::domain::foundation::{OrderId, ValidationError};

use super::errors::CallbackError;

/// Gateway parameter names.
pub const PARAM_ORDER_ID: &str = "orderId";
pub const PARAM_AMOUNT: &str = "amount";
pub const PARAM_RESPONSE_CODE: &str = "responseCode";
pub const PARAM_TRANSACTION_STATUS: &str = "transactionStatus";
pub const PARAM_TRANSACTION_ID: &str = "transactionId";
pub const PARAM_SIGNATURE: &str = "signature";

/// Gateway code reported for a successful transaction.
const SUCCESS_CODE: &str = "00";

/// A parsed gateway callback.
#[derive(Debug, Clone)]
pub struct CallbackParams {
    /// Merchant order reference the callback is about.
    pub order_id: OrderId,

    /// Amount the gateway reports, in minor currency units.
    pub amount: i64,

    /// Gateway response code (`"00"` on success).
    pub response_code: String,

    /// Gateway transaction status (`"00"` on success).
    pub transaction_status: String,

    /// Gateway-side transaction reference, when provided.
    pub transaction_id: Option<String>,

    /// Every parameter except the signature, preserved for verification.
    pub signed_params: BTreeMap<String, String>,

    /// The signature parameter, if present.
    pub signature: Option<String>,
}

impl CallbackParams {
    /// Parses callback query parameters.
    ///
    /// # Errors
    ///
    /// - `MissingParameter` if `orderId`, `amount`, `responseCode`, or
    ///   `transactionStatus` is absent
    /// - `MalformedParameter` if `orderId` or `amount` cannot be parsed
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, CallbackError> {
        let order_id = query
            .get(PARAM_ORDER_ID)
            .ok_or(CallbackError::MissingParameter(PARAM_ORDER_ID))?;
        let order_id = OrderId::new(order_id.clone())
            .map_err(|_: ValidationError| CallbackError::MalformedParameter(PARAM_ORDER_ID))?;

        let amount = query
            .get(PARAM_AMOUNT)
            .ok_or(CallbackError::MissingParameter(PARAM_AMOUNT))?
            .parse::<i64>()
            .map_err(|_| CallbackError::MalformedParameter(PARAM_AMOUNT))?;

        let response_code = query
            .get(PARAM_RESPONSE_CODE)
            .ok_or(CallbackError::MissingParameter(PARAM_RESPONSE_CODE))?
            .clone();

        let transaction_status = query
            .get(PARAM_TRANSACTION_STATUS)
            .ok_or(CallbackError::MissingParameter(PARAM_TRANSACTION_STATUS))?
            .clone();

        let transaction_id = query.get(PARAM_TRANSACTION_ID).cloned();

        let signature = query.get(PARAM_SIGNATURE).cloned();

        let signed_params = query
            .iter()
            .filter(|(key, _)| key.as_str() != PARAM_SIGNATURE)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            order_id,
            amount,
            response_code,
            transaction_status,
            transaction_id,
            signed_params,
            signature,
        })
    }

    /// Returns true if the gateway reports the transaction as successful.
    ///
    /// Both the response code and the transaction status must carry the
    /// success code; any other verified combination is a failure.
    pub fn is_success(&self) -> bool {
        self.response_code == SUCCESS_CODE && self.transaction_status == SUCCESS_CODE
    }
}
