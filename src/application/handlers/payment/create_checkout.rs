//! CreateCheckoutHandler - starts a gateway payment for a plan.
//!
//! Creates the order, builds the signed redirect URL, and marks the order
//! pending once the redirect is issued. The redirect URL carries the same
//! sorted-parameter HMAC the callback verifier checks on the way back.

use std::collections::BTreeMap;
use std::sync::Arc;

use url::Url;

use crate::config::GatewayConfig;
use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp, UserId};
use crate::domain::payment::{CallbackVerifier, PaymentOrder, PARAM_AMOUNT, PARAM_ORDER_ID, PARAM_SIGNATURE};
use crate::domain::subscription::Plan;
use crate::ports::OrderRepository;

/// Outbound redirect parameter names not shared with the callback.
const PARAM_MERCHANT_CODE: &str = "merchantCode";
const PARAM_CURRENCY: &str = "currency";
const PARAM_ORDER_INFO: &str = "orderInfo";
const PARAM_RETURN_URL: &str = "returnUrl";
const PARAM_CREATED_AT: &str = "createdAt";

/// Command to start a checkout.
#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub user_id: UserId,
    pub plan: Plan,
}

/// A created checkout: the order reference and where to send the user.
#[derive(Debug, Clone)]
pub struct CreatedCheckout {
    pub order_id: OrderId,
    pub payment_url: String,
}

/// Handler for checkout initiation.
pub struct CreateCheckoutHandler {
    orders: Arc<dyn OrderRepository>,
    verifier: Arc<CallbackVerifier>,
    gateway: Arc<GatewayConfig>,
}

impl CreateCheckoutHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        verifier: Arc<CallbackVerifier>,
        gateway: Arc<GatewayConfig>,
    ) -> Self {
        Self {
            orders,
            verifier,
            gateway,
        }
    }

    /// Creates an order and returns the signed redirect URL.
    ///
    /// # Errors
    ///
    /// - `OrderAlreadyExists` if the generated reference collides
    /// - `DatabaseError` on persistence failure
    /// - `InternalError` if the configured gateway URL is unparseable
    pub async fn handle(
        &self,
        cmd: CreateCheckoutCommand,
        now: Timestamp,
    ) -> Result<CreatedCheckout, DomainError> {
        let amount = match cmd.plan {
            Plan::Monthly => self.gateway.monthly_amount,
            Plan::Annual => self.gateway.annual_amount,
        };

        let order = PaymentOrder::create(
            OrderId::generate(),
            cmd.user_id,
            cmd.plan,
            amount,
            self.gateway.currency.clone(),
            now,
        );

        self.orders.create(&order).await?;

        let payment_url = self.build_payment_url(&order, now)?;

        // Redirect issued: created -> pending
        self.orders.mark_pending(&order.order_id, now).await?;

        tracing::info!(
            order_id = %order.order_id,
            user_id = %order.user_id,
            plan = %order.plan,
            amount,
            "Checkout created"
        );

        Ok(CreatedCheckout {
            order_id: order.order_id,
            payment_url,
        })
    }

    /// Builds the signed gateway redirect URL for the order.
    fn build_payment_url(&self, order: &PaymentOrder, now: Timestamp) -> Result<String, DomainError> {
        let params = BTreeMap::from([
            (
                PARAM_MERCHANT_CODE.to_string(),
                self.gateway.merchant_code.clone(),
            ),
            (PARAM_ORDER_ID.to_string(), order.order_id.to_string()),
            (PARAM_AMOUNT.to_string(), order.amount.to_string()),
            (PARAM_CURRENCY.to_string(), order.currency.clone()),
            (
                PARAM_ORDER_INFO.to_string(),
                format!("Verdant {} plan", order.plan),
            ),
            (PARAM_RETURN_URL.to_string(), self.gateway.return_url.clone()),
            (PARAM_CREATED_AT.to_string(), now.as_unix_secs().to_string()),
        ]);
        let signature = self.verifier.sign(&params);

        let mut url = Url::parse(&self.gateway.payment_url).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Invalid gateway payment URL: {}", e),
            )
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair(PARAM_SIGNATURE, &signature);
        }

        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentStatus;
    use crate::ports::InMemoryOrderRepository;
    use secrecy::SecretString;

    const TEST_SECRET: &str = "verdant-gateway-test-secret";

    fn gateway_config() -> GatewayConfig {
        GatewayConfig {
            merchant_code: "VERDANT01".to_string(),
            secret: SecretString::new(TEST_SECRET.to_string()),
            payment_url: "https://sandbox.gateway.example/pay".to_string(),
            return_url: "https://app.verdant.io/payments/return".to_string(),
            currency: "VND".to_string(),
            monthly_amount: 49_000,
            annual_amount: 490_000,
            pending_timeout_minutes: 15,
        }
    }

    fn handler_with(orders: Arc<InMemoryOrderRepository>) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(
            orders,
            Arc::new(CallbackVerifier::new(SecretString::new(
                TEST_SECRET.to_string(),
            ))),
            Arc::new(gateway_config()),
        )
    }

    #[tokio::test]
    async fn checkout_persists_a_pending_order() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let handler = handler_with(orders.clone());
        let now = Timestamp::now();

        let checkout = handler
            .handle(
                CreateCheckoutCommand {
                    user_id: UserId::new(),
                    plan: Plan::Monthly,
                },
                now,
            )
            .await
            .unwrap();

        let order = orders
            .find_by_order_id(&checkout.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, PaymentStatus::Pending);
        assert_eq!(order.amount, 49_000);
        assert_eq!(order.currency, "VND");
    }

    #[tokio::test]
    async fn annual_plan_charges_annual_amount() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let handler = handler_with(orders.clone());

        let checkout = handler
            .handle(
                CreateCheckoutCommand {
                    user_id: UserId::new(),
                    plan: Plan::Annual,
                },
                Timestamp::now(),
            )
            .await
            .unwrap();

        let order = orders
            .find_by_order_id(&checkout.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.amount, 490_000);
    }

    #[tokio::test]
    async fn payment_url_points_at_the_gateway_with_signature() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let handler = handler_with(orders);

        let checkout = handler
            .handle(
                CreateCheckoutCommand {
                    user_id: UserId::new(),
                    plan: Plan::Monthly,
                },
                Timestamp::now(),
            )
            .await
            .unwrap();

        let url = Url::parse(&checkout.payment_url).unwrap();
        assert_eq!(url.host_str(), Some("sandbox.gateway.example"));

        let query: std::collections::HashMap<String, String> =
            url.query_pairs().into_owned().collect();
        assert_eq!(
            query.get(PARAM_ORDER_ID).map(String::as_str),
            Some(checkout.order_id.as_str())
        );
        assert_eq!(query.get(PARAM_AMOUNT).map(String::as_str), Some("49000"));
        assert_eq!(query.get(PARAM_MERCHANT_CODE).map(String::as_str), Some("VERDANT01"));
        assert!(query.contains_key(PARAM_SIGNATURE));
    }

    #[tokio::test]
    async fn redirect_signature_verifies_with_the_shared_secret() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let handler = handler_with(orders);

        let checkout = handler
            .handle(
                CreateCheckoutCommand {
                    user_id: UserId::new(),
                    plan: Plan::Monthly,
                },
                Timestamp::now(),
            )
            .await
            .unwrap();

        let url = Url::parse(&checkout.payment_url).unwrap();
        let mut signed = BTreeMap::new();
        let mut signature = None;
        for (key, value) in url.query_pairs().into_owned() {
            if key == PARAM_SIGNATURE {
                signature = Some(value);
            } else {
                signed.insert(key, value);
            }
        }

        let verifier = CallbackVerifier::new(SecretString::new(TEST_SECRET.to_string()));
        assert!(verifier.verify(&signed, signature.as_deref()).is_valid());
    }
}
