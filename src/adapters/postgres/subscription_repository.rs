//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Provides persistent storage for Subscription aggregates using PostgreSQL.
//! Updates are version-checked in SQL so concurrent writers surface as
//! `BillingError::Conflict` rather than overwriting each other.

use crate::domain::billing::{
    BillingCycle, BillingError, PlanId, SeatAllocation, Subscription, SubscriptionStatus,
};
use crate::domain::foundation::{
    InvoiceId, Money, OrganizationId, SubscriptionId, Timestamp,
};
use crate::ports::SubscriptionRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT id, organization_id, plan_id, status, total_seats, used_seats,
           price_cents, billing_cycle, next_billing_date, square_customer_id,
           latest_invoice_id, version, created_at, updated_at, cancelled_at,
           cancellation_reason
    FROM subscriptions
"#;

/// PostgreSQL implementation of the SubscriptionRepository port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new PostgresSubscriptionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn stored_version(&self, id: &SubscriptionId) -> Result<Option<i64>, BillingError> {
        sqlx::query_scalar("SELECT version FROM subscriptions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                BillingError::infrastructure(format!("Failed to read subscription version: {}", e))
            })
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    organization_id: Uuid,
    plan_id: String,
    status: String,
    total_seats: i32,
    used_seats: i32,
    price_cents: i64,
    billing_cycle: String,
    next_billing_date: DateTime<Utc>,
    square_customer_id: String,
    latest_invoice_id: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
    cancellation_reason: Option<String>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = BillingError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;
        let billing_cycle = parse_billing_cycle(&row.billing_cycle)?;

        let total_seats = u32::try_from(row.total_seats).map_err(|_| {
            BillingError::infrastructure(format!("Invalid total_seats value: {}", row.total_seats))
        })?;
        let used_seats = u32::try_from(row.used_seats).map_err(|_| {
            BillingError::infrastructure(format!("Invalid used_seats value: {}", row.used_seats))
        })?;
        let seats = SeatAllocation::new(total_seats, used_seats)?;

        let version = u64::try_from(row.version).map_err(|_| {
            BillingError::infrastructure(format!("Invalid version value: {}", row.version))
        })?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            plan_id: PlanId::new(row.plan_id),
            status,
            seats,
            price: Money::from_cents(row.price_cents),
            billing_cycle,
            next_billing_date: Timestamp::from_datetime(row.next_billing_date),
            square_customer_id: row.square_customer_id,
            latest_invoice_id: row.latest_invoice_id.map(InvoiceId::new),
            version,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
            cancellation_reason: row.cancellation_reason,
        })
    }
}

fn parse_status(s: &str) -> Result<SubscriptionStatus, BillingError> {
    match s.to_lowercase().as_str() {
        "active" => Ok(SubscriptionStatus::Active),
        "past_due" => Ok(SubscriptionStatus::PastDue),
        "cancelled" => Ok(SubscriptionStatus::Cancelled),
        _ => Err(BillingError::infrastructure(format!(
            "Invalid status value: {}",
            s
        ))),
    }
}

fn status_to_string(status: &SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Active => "active",
        SubscriptionStatus::PastDue => "past_due",
        SubscriptionStatus::Cancelled => "cancelled",
    }
}

fn parse_billing_cycle(s: &str) -> Result<BillingCycle, BillingError> {
    match s.to_lowercase().as_str() {
        "monthly" => Ok(BillingCycle::Monthly),
        "annual" => Ok(BillingCycle::Annual),
        _ => Err(BillingError::infrastructure(format!(
            "Invalid billing_cycle value: {}",
            s
        ))),
    }
}

fn billing_cycle_to_string(cycle: &BillingCycle) -> &'static str {
    match cycle {
        BillingCycle::Monthly => "monthly",
        BillingCycle::Annual => "annual",
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), BillingError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, organization_id, plan_id, status, total_seats, used_seats,
                price_cents, billing_cycle, next_billing_date, square_customer_id,
                latest_invoice_id, version, created_at, updated_at, cancelled_at,
                cancellation_reason
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.organization_id.as_uuid())
        .bind(subscription.plan_id.as_str())
        .bind(status_to_string(&subscription.status))
        .bind(subscription.seats.total() as i32)
        .bind(subscription.seats.used() as i32)
        .bind(subscription.price.cents())
        .bind(billing_cycle_to_string(&subscription.billing_cycle))
        .bind(subscription.next_billing_date.as_datetime())
        .bind(&subscription.square_customer_id)
        .bind(subscription.latest_invoice_id.as_ref().map(|i| i.as_str()))
        .bind(subscription.version as i64)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .bind(subscription.cancelled_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.cancellation_reason.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("subscriptions_organization_id_key") {
                    return BillingError::already_exists(subscription.organization_id);
                }
            }
            BillingError::infrastructure(format!("Failed to save subscription: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), BillingError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan_id = $3,
                status = $4,
                total_seats = $5,
                used_seats = $6,
                price_cents = $7,
                billing_cycle = $8,
                next_billing_date = $9,
                square_customer_id = $10,
                latest_invoice_id = $11,
                updated_at = $12,
                cancelled_at = $13,
                cancellation_reason = $14,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.version as i64)
        .bind(subscription.plan_id.as_str())
        .bind(status_to_string(&subscription.status))
        .bind(subscription.seats.total() as i32)
        .bind(subscription.seats.used() as i32)
        .bind(subscription.price.cents())
        .bind(billing_cycle_to_string(&subscription.billing_cycle))
        .bind(subscription.next_billing_date.as_datetime())
        .bind(&subscription.square_customer_id)
        .bind(subscription.latest_invoice_id.as_ref().map(|i| i.as_str()))
        .bind(subscription.updated_at.as_datetime())
        .bind(subscription.cancelled_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.cancellation_reason.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            BillingError::infrastructure(format!("Failed to update subscription: {}", e))
        })?;

        if result.rows_affected() == 0 {
            // Zero rows means the id is missing or the version is stale;
            // re-read to tell the two apart
            return match self.stored_version(&subscription.id).await? {
                Some(_) => Err(BillingError::conflict(
                    subscription.organization_id,
                    subscription.version,
                )),
                None => Err(BillingError::not_found(subscription.organization_id)),
            };
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, BillingError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    BillingError::infrastructure(format!("Failed to find subscription: {}", e))
                })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Subscription>, BillingError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE organization_id = $1", SELECT_COLUMNS))
                .bind(organization_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    BillingError::infrastructure(format!("Failed to find subscription: {}", e))
                })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_square_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, BillingError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(&format!("{} WHERE square_customer_id = $1", SELECT_COLUMNS))
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    BillingError::infrastructure(format!("Failed to find subscription: {}", e))
                })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<(), BillingError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                BillingError::infrastructure(format!("Failed to delete subscription: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(BillingError::infrastructure(format!(
                "Subscription {} not found",
                id
            )));
        }

        Ok(())
    }
}
