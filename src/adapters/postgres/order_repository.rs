//! PostgreSQL implementation of OrderRepository.
//!
//! The first-writer-wins settlement guarantee comes from the guarded
//! UPDATE: the status column only moves off `pending` once, no matter how
//! many callback deliveries race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp, UserId};
use crate::domain::payment::{PaymentOrder, PaymentStatus};
use crate::domain::subscription::Plan;
use crate::ports::{OrderRepository, SettleOutcome};

/// PostgreSQL implementation of the OrderRepository port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgresOrderRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    user_id: Uuid,
    plan: String,
    amount: i64,
    currency: String,
    status: String,
    gateway_transaction_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for PaymentOrder {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(PaymentOrder {
            order_id: OrderId::new(row.order_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid order_id: {}", e))
            })?,
            user_id: UserId::from_uuid(row.user_id),
            plan: parse_plan(&row.plan)?,
            amount: row.amount,
            currency: row.currency,
            status: parse_status(&row.status)?,
            gateway_transaction_id: row.gateway_transaction_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_plan(s: &str) -> Result<Plan, DomainError> {
    match s {
        "monthly" => Ok(Plan::Monthly),
        "annual" => Ok(Plan::Annual),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid plan value: {}", s),
        )),
    }
}

fn plan_to_string(plan: &Plan) -> &'static str {
    match plan {
        Plan::Monthly => "monthly",
        Plan::Annual => "annual",
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s {
        "created" => Ok(PaymentStatus::Created),
        "pending" => Ok(PaymentStatus::Pending),
        "succeeded" => Ok(PaymentStatus::Succeeded),
        "failed" => Ok(PaymentStatus::Failed),
        "expired" => Ok(PaymentStatus::Expired),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )),
    }
}

fn status_to_string(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Created => "created",
        PaymentStatus::Pending => "pending",
        PaymentStatus::Succeeded => "succeeded",
        PaymentStatus::Failed => "failed",
        PaymentStatus::Expired => "expired",
    }
}

fn map_db_err(e: sqlx::Error) -> DomainError {
    DomainError::database(e.to_string())
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &PaymentOrder) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_orders
                (order_id, user_id, plan, amount, currency, status,
                 gateway_transaction_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.order_id.as_str())
        .bind(order.user_id.as_uuid())
        .bind(plan_to_string(&order.plan))
        .bind(order.amount)
        .bind(&order.currency)
        .bind(status_to_string(&order.status))
        .bind(&order.gateway_transaction_id)
        .bind(order.created_at.as_datetime())
        .bind(order.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false)
            {
                DomainError::new(
                    ErrorCode::OrderAlreadyExists,
                    format!("Order {} already exists", order.order_id),
                )
            } else {
                map_db_err(e)
            }
        })?;

        Ok(())
    }

    async fn find_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<PaymentOrder>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT order_id, user_id, plan, amount, currency, status,
                   gateway_transaction_id, created_at, updated_at
            FROM payment_orders
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(PaymentOrder::try_from).transpose()
    }

    async fn mark_pending(&self, order_id: &OrderId, now: Timestamp) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_orders
            SET status = 'pending', updated_at = $2
            WHERE order_id = $1 AND status = 'created'
            "#,
        )
        .bind(order_id.as_str())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Order {} is not awaiting a redirect", order_id),
            ));
        }

        Ok(())
    }

    async fn settle(
        &self,
        order_id: &OrderId,
        status: PaymentStatus,
        gateway_transaction_id: Option<&str>,
        now: Timestamp,
    ) -> Result<SettleOutcome, DomainError> {
        // Guarded transition: only one caller moves the row off 'pending'.
        let result = sqlx::query(
            r#"
            UPDATE payment_orders
            SET status = $2,
                gateway_transaction_id = COALESCE($3, gateway_transaction_id),
                updated_at = $4
            WHERE order_id = $1 AND status = 'pending'
            "#,
        )
        .bind(order_id.as_str())
        .bind(status_to_string(&status))
        .bind(gateway_transaction_id)
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 1 {
            Ok(SettleOutcome::Applied)
        } else {
            Ok(SettleOutcome::NotPending)
        }
    }

    async fn expire_pending_before(
        &self,
        cutoff: Timestamp,
        now: Timestamp,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_orders
            SET status = 'expired', updated_at = $2
            WHERE status = 'pending' AND created_at < $1
            "#,
        )
        .bind(cutoff.as_datetime())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(result.rows_affected())
    }
}
