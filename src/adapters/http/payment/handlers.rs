//! HTTP handlers for payment endpoints.
//!
//! These handlers connect axum routes to application layer command/query
//! handlers. The callback handler is deliberately ack-shaped: the gateway
//! always receives HTTP 200 with a coded body, as redirect gateways
//! expect.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::application::handlers::payment::{
    CreateCheckoutCommand, CreateCheckoutHandler, ExpireStaleOrdersHandler, GetOrderHandler,
    GetOrderQuery, ProcessCallbackCommand, ProcessCallbackHandler, ProcessCallbackResult,
};
use crate::application::handlers::subscription::{GetSubscriptionHandler, SubscriptionActivator};
use crate::config::GatewayConfig;
use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp};
use crate::domain::payment::{CallbackError, CallbackVerifier};
use crate::ports::{OrderRepository, SubscriptionStore};

use super::super::middleware::RequireAuth;
use super::dto::{
    CallbackAck, CheckoutRequest, CheckoutResponse, ErrorResponse, ExpireResponse, OrderResponse,
    SubscriptionResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all payment dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct PaymentAppState {
    pub order_repository: Arc<dyn OrderRepository>,
    pub subscription_store: Arc<dyn SubscriptionStore>,
    pub verifier: Arc<CallbackVerifier>,
    pub gateway: Arc<GatewayConfig>,
}

impl PaymentAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(
            self.order_repository.clone(),
            self.verifier.clone(),
            self.gateway.clone(),
        )
    }

    pub fn process_callback_handler(&self) -> ProcessCallbackHandler {
        ProcessCallbackHandler::new(
            self.order_repository.clone(),
            self.verifier.clone(),
            SubscriptionActivator::new(self.subscription_store.clone()),
        )
    }

    pub fn expire_handler(&self) -> ExpireStaleOrdersHandler {
        ExpireStaleOrdersHandler::new(
            self.order_repository.clone(),
            self.gateway.pending_timeout_minutes,
        )
    }

    pub fn get_order_handler(&self) -> GetOrderHandler {
        GetOrderHandler::new(self.order_repository.clone())
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.subscription_store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /checkout - start a gateway payment for a plan.
pub async fn create_checkout(
    State(state): State<PaymentAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let handler = state.create_checkout_handler();
    let checkout = handler
        .handle(
            CreateCheckoutCommand {
                user_id: user.user_id,
                plan: request.plan,
            },
            Timestamp::now(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: checkout.order_id.to_string(),
            payment_url: checkout.payment_url,
        }),
    ))
}

/// GET /callback - gateway callback endpoint.
///
/// No authentication; authenticity comes from the callback signature.
/// Always responds 200 with a coded ack body.
pub async fn gateway_callback(
    State(state): State<PaymentAppState>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let handler = state.process_callback_handler();
    let result = handler
        .handle(ProcessCallbackCommand { query }, Timestamp::now())
        .await;

    let ack = match result {
        Ok(ProcessCallbackResult::Succeeded { .. }) => CallbackAck::ok("Confirmed"),
        Ok(ProcessCallbackResult::Failed { .. }) => CallbackAck::ok("Confirmed"),
        Ok(ProcessCallbackResult::AlreadySettled { .. }) => {
            CallbackAck::ok("Order already confirmed")
        }
        Err(e) => {
            if let CallbackError::ActivationFailed(_) = &e {
                // Paid but not activated: reconciliation required.
                tracing::error!(error = %e, "Callback settled payment but activation failed");
            } else if e.is_rejection() {
                tracing::warn!(error = %e, "Callback rejected");
            } else {
                tracing::error!(error = %e, "Callback processing failed");
            }
            CallbackAck::error(e.ack_code(), e.to_string())
        }
    };

    (StatusCode::OK, Json(ack))
}

/// GET /orders/{order_id} - order status for the owning user.
pub async fn get_order(
    State(state): State<PaymentAppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let order_id = OrderId::new(order_id).map_err(DomainError::from)?;

    let handler = state.get_order_handler();
    let order = handler
        .handle(GetOrderQuery {
            order_id,
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(OrderResponse::from(order)))
}

/// GET /subscription - the current user's subscription.
pub async fn get_subscription(
    State(state): State<PaymentAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, PaymentApiError> {
    let now = Timestamp::now();
    let handler = state.get_subscription_handler();
    let record = handler.handle(user.user_id, now).await?;

    Ok(Json(SubscriptionResponse::from_record(record, now)))
}

/// POST /maintenance/expire - expire stale pending orders.
///
/// Invoked by an external scheduler.
pub async fn expire_stale_orders(
    State(state): State<PaymentAppState>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let handler = state.expire_handler();
    let expired = handler.handle(Timestamp::now()).await?;

    Ok(Json(ExpireResponse { expired }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
pub struct PaymentApiError(DomainError);

impl From<DomainError> for PaymentApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<crate::domain::foundation::ValidationError> for PaymentApiError {
    fn from(err: crate::domain::foundation::ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.code {
            ErrorCode::OrderNotFound | ErrorCode::SubscriptionNotFound => StatusCode::NOT_FOUND,
            ErrorCode::OrderAlreadyExists | ErrorCode::InvalidStateTransition => {
                StatusCode::CONFLICT
            }
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse::new(self.0.code.to_string(), self.0.message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::payment::{
        PaymentOrder, PaymentStatus, PARAM_AMOUNT, PARAM_ORDER_ID, PARAM_RESPONSE_CODE,
        PARAM_SIGNATURE, PARAM_TRANSACTION_STATUS,
    };
    use crate::domain::subscription::Plan;
    use crate::ports::{InMemoryOrderRepository, InMemorySubscriptionStore};
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use secrecy::SecretString;
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    const TEST_SECRET: &str = "verdant-gateway-test-secret";

    fn test_state() -> (PaymentAppState, Arc<InMemoryOrderRepository>) {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let state = PaymentAppState {
            order_repository: orders.clone(),
            subscription_store: Arc::new(InMemorySubscriptionStore::new()),
            verifier: Arc::new(CallbackVerifier::new(SecretString::new(
                TEST_SECRET.to_string(),
            ))),
            gateway: Arc::new(GatewayConfig {
                merchant_code: "VERDANT01".to_string(),
                secret: SecretString::new(TEST_SECRET.to_string()),
                payment_url: "https://sandbox.gateway.example/pay".to_string(),
                return_url: "https://app.verdant.io/payments/return".to_string(),
                currency: "VND".to_string(),
                monthly_amount: 49_000,
                annual_amount: 490_000,
                pending_timeout_minutes: 15,
            }),
        };
        (state, orders)
    }

    fn callback_app(state: PaymentAppState) -> Router {
        Router::new()
            .route("/callback", get(gateway_callback))
            .with_state(state)
    }

    async fn seed_pending_order(orders: &InMemoryOrderRepository) -> PaymentOrder {
        let now = Timestamp::now();
        let mut order = PaymentOrder::create(
            OrderId::new("ord-1").unwrap(),
            UserId::new(),
            Plan::Monthly,
            49_000,
            "VND",
            now,
        );
        orders.create(&order).await.unwrap();
        orders.mark_pending(&order.order_id, now).await.unwrap();
        order.mark_pending(now).unwrap();
        order
    }

    fn signed_callback_uri(state: &PaymentAppState, order: &PaymentOrder) -> String {
        let signed = BTreeMap::from([
            (PARAM_ORDER_ID.to_string(), order.order_id.to_string()),
            (PARAM_AMOUNT.to_string(), order.amount.to_string()),
            (PARAM_RESPONSE_CODE.to_string(), "00".to_string()),
            (PARAM_TRANSACTION_STATUS.to_string(), "00".to_string()),
        ]);
        let signature = state.verifier.sign(&signed);

        let query: Vec<String> = signed
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .chain(std::iter::once(format!("{}={}", PARAM_SIGNATURE, signature)))
            .collect();
        format!("/callback?{}", query.join("&"))
    }

    async fn ack_for(app: Router, uri: &str) -> (StatusCode, CallbackAck) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let ack: CallbackAck = serde_json::from_slice(&body).unwrap();
        (status, ack)
    }

    #[tokio::test]
    async fn valid_callback_acks_00_and_settles() {
        let (state, orders) = test_state();
        let order = seed_pending_order(&orders).await;
        let uri = signed_callback_uri(&state, &order);

        let (status, ack) = ack_for(callback_app(state), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack.code, "00");
        let stored = orders
            .find_by_order_id(&order.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, PaymentStatus::Succeeded);
    }

    #[tokio::test]
    async fn tampered_callback_acks_97_with_http_200() {
        let (state, orders) = test_state();
        let order = seed_pending_order(&orders).await;
        let uri = signed_callback_uri(&state, &order).replace("amount=49000", "amount=1");

        let (status, ack) = ack_for(callback_app(state), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack.code, "97");
        let stored = orders
            .find_by_order_id(&order.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn callback_for_unknown_order_acks_01() {
        let (state, _orders) = test_state();
        let phantom = PaymentOrder::create(
            OrderId::new("ord-ghost").unwrap(),
            UserId::new(),
            Plan::Monthly,
            49_000,
            "VND",
            Timestamp::now(),
        );
        let uri = signed_callback_uri(&state, &phantom);

        let (status, ack) = ack_for(callback_app(state), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack.code, "01");
    }

    #[tokio::test]
    async fn replayed_callback_acks_00() {
        let (state, orders) = test_state();
        let order = seed_pending_order(&orders).await;
        let uri = signed_callback_uri(&state, &order);

        let (_, first) = ack_for(callback_app(state.clone()), &uri).await;
        let (_, second) = ack_for(callback_app(state), &uri).await;

        assert_eq!(first.code, "00");
        assert_eq!(second.code, "00");
        assert_eq!(second.message, "Order already confirmed");
    }
}
