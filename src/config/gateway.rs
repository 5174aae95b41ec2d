//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment gateway configuration (redirect-based gateway).
///
/// The shared secret signs outbound redirect URLs and verifies inbound
/// callback signatures. It never leaves this struct unredacted.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Merchant code issued by the gateway
    pub merchant_code: String,

    /// Shared HMAC secret issued by the gateway
    pub secret: SecretString,

    /// Gateway payment page URL (user is redirected here)
    pub payment_url: String,

    /// URL the gateway redirects the user back to after payment
    pub return_url: String,

    /// ISO currency code charged by the gateway
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Monthly plan amount in minor currency units
    pub monthly_amount: i64,

    /// Annual plan amount in minor currency units
    pub annual_amount: i64,

    /// Minutes a pending order may wait for a callback before expiry
    #[serde(default = "default_pending_timeout")]
    pub pending_timeout_minutes: i64,
}

impl GatewayConfig {
    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.merchant_code.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_MERCHANT_CODE"));
        }
        if self.secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_SECRET"));
        }
        if !self.payment_url.starts_with("http://") && !self.payment_url.starts_with("https://") {
            return Err(ValidationError::InvalidGatewayUrl("payment_url"));
        }
        if !self.return_url.starts_with("http://") && !self.return_url.starts_with("https://") {
            return Err(ValidationError::InvalidGatewayUrl("return_url"));
        }
        if self.monthly_amount <= 0 {
            return Err(ValidationError::InvalidPlanAmount("monthly_amount"));
        }
        if self.annual_amount <= 0 {
            return Err(ValidationError::InvalidPlanAmount("annual_amount"));
        }
        if !(1..=1440).contains(&self.pending_timeout_minutes) {
            return Err(ValidationError::InvalidPendingTimeout);
        }
        Ok(())
    }
}

fn default_currency() -> String {
    "VND".to_string()
}

fn default_pending_timeout() -> i64 {
    15
}
