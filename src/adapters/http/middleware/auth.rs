//! Authentication middleware and extractor for axum.
//!
//! Validates HS256 bearer tokens and injects the authenticated user into
//! request extensions; handlers read it back through the `RequireAuth`
//! extractor.
//!
//! ```text
//! Request -> auth_middleware -> injects AuthenticatedUser into extensions
//!                                      |
//!                              Handler -> RequireAuth extractor reads it
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};

/// Bearer token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    /// Expiry as Unix seconds.
    pub exp: i64,
}

/// Validates bearer tokens against the configured symmetric key.
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validates a token and extracts the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` on signature, expiry, or claim
    /// failures.
    pub fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let user_id: UserId = data
            .claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))?;

        Ok(AuthenticatedUser::new(user_id))
    }
}

/// Auth middleware state.
pub type AuthState = Arc<JwtAuthenticator>;

/// Authentication middleware that validates Bearer tokens.
///
/// Every route behind this layer requires authentication: a missing or
/// invalid token short-circuits with 401.
pub async fn auth_middleware(
    State(authenticator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = match token {
        Some(token) => token,
        None => return unauthorized("Missing bearer token"),
    };

    match authenticator.validate(token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected request with invalid token");
            unauthorized("Invalid token")
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "code": "UNAUTHORIZED",
            "message": message,
        })),
    )
        .into_response()
}

/// Extractor that requires authentication.
///
/// Reads the `AuthenticatedUser` injected by [`auth_middleware`]; returns
/// 401 if the route was mounted without the middleware.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .map(RequireAuth)
                .ok_or_else(|| unauthorized("Missing bearer token"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use tower::ServiceExt;

    const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn authenticator() -> AuthState {
        Arc::new(JwtAuthenticator::new(&SecretString::new(
            TEST_SECRET.to_string(),
        )))
    }

    fn token_for(user_id: UserId, exp_offset_secs: i64) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn protected_app() -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|RequireAuth(user): RequireAuth| async move { user.user_id.to_string() }),
            )
            .layer(middleware::from_fn_with_state(
                authenticator(),
                auth_middleware,
            ))
    }

    // ══════════════════════════════════════════════════════════════
    // Validator Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn valid_token_yields_the_user() {
        let user_id = UserId::new();
        let token = token_for(user_id, 3600);

        let user = authenticator().validate(&token).unwrap();

        assert_eq!(user.user_id, user_id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = token_for(UserId::new(), -3600);
        assert!(authenticator().validate(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(authenticator().validate("not.a.token").is_err());
    }

    #[test]
    fn non_uuid_subject_is_rejected() {
        let claims = Claims {
            sub: "admin".to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(authenticator().validate(&token).is_err());
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let claims = Claims {
            sub: UserId::new().to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"another-secret-another-secret-xx"),
        )
        .unwrap();

        assert!(authenticator().validate(&token).is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Middleware Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn request_without_token_gets_401() {
        let response = protected_app()
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn request_with_valid_token_reaches_the_handler() {
        let user_id = UserId::new();
        let token = token_for(user_id, 3600);

        let response = protected_app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], user_id.to_string().as_bytes());
    }

    #[tokio::test]
    async fn request_with_invalid_token_gets_401() {
        let response = protected_app()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
