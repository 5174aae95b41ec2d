//! PostgreSQL implementation of SubscriptionStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::{Plan, SubscriptionRecord, SubscriptionStatus};
use crate::ports::SubscriptionStore;

/// PostgreSQL implementation of the SubscriptionStore port.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new PostgresSubscriptionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    user_id: Uuid,
    plan: Option<String>,
    status: String,
    end_date: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(SubscriptionRecord {
            user_id: UserId::from_uuid(row.user_id),
            plan: row.plan.as_deref().map(parse_plan).transpose()?,
            status: parse_status(&row.status)?,
            end_date: row.end_date.map(Timestamp::from_datetime),
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

fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    match s {
        "none" => Ok(SubscriptionStatus::None),
        "active" => Ok(SubscriptionStatus::Active),
        "expired" => Ok(SubscriptionStatus::Expired),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )),
    }
}

fn plan_to_string(plan: Plan) -> &'static str {
    match plan {
        Plan::Monthly => "monthly",
        Plan::Annual => "annual",
    }
}

fn map_db_err(e: sqlx::Error) -> DomainError {
    DomainError::database(e.to_string())
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT user_id, plan, status, end_date, updated_at
            FROM subscriptions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(SubscriptionRecord::try_from).transpose()
    }

    async fn upgrade_plan(
        &self,
        user_id: &UserId,
        plan: Plan,
        end_date: Timestamp,
    ) -> Result<(), DomainError> {
        // Upsert: one row per user, renewals overwrite in place.
        sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, plan, status, end_date, updated_at)
            VALUES ($1, $2, 'active', $3, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET plan = EXCLUDED.plan,
                status = 'active',
                end_date = EXCLUDED.end_date,
                updated_at = NOW()
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(plan_to_string(plan))
        .bind(end_date.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }
}
