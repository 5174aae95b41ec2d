//! Verdant backend entrypoint.
//!
//! Wires configuration, the PostgreSQL pool, and the HTTP routers, then
//! serves until interrupted.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::{middleware, routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use verdant::adapters::http::middleware::{auth_middleware, JwtAuthenticator};
use verdant::adapters::http::payment::{
    callback_routes, maintenance_routes, payment_routes, PaymentAppState,
};
use verdant::adapters::http::watering::{watering_routes, WateringAppState};
use verdant::adapters::postgres::{PostgresOrderRepository, PostgresSubscriptionStore};
use verdant::config::AppConfig;
use verdant::domain::payment::CallbackVerifier;
use verdant::domain::watering::WateringAdvisor;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_level))
        .init();

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let gateway = Arc::new(config.gateway.clone());
    let verifier = Arc::new(CallbackVerifier::new(gateway.secret.clone()));
    let payment_state = PaymentAppState {
        order_repository: Arc::new(PostgresOrderRepository::new(pool.clone())),
        subscription_store: Arc::new(PostgresSubscriptionStore::new(pool)),
        verifier,
        gateway,
    };
    let watering_state = WateringAppState {
        advisor: Arc::new(WateringAdvisor::default()),
    };
    let authenticator = Arc::new(JwtAuthenticator::new(&config.auth.jwt_secret));

    let payments = callback_routes()
        .merge(maintenance_routes())
        .merge(payment_routes().layer(middleware::from_fn_with_state(
            authenticator.clone(),
            auth_middleware,
        )))
        .with_state(payment_state);

    let watering = watering_routes()
        .layer(middleware::from_fn_with_state(
            authenticator,
            auth_middleware,
        ))
        .with_state(watering_state);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/payments", payments)
        .nest("/api/watering", watering)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                )))
                .layer(cors_layer(&config)?),
        );

    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()).await?;
    tracing::info!("Verdant backend listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Restrict CORS to the configured origins; wide open in development
/// when none are configured.
fn cors_layer(config: &AppConfig) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
