//! Meeting repository module for database operations.

use crate::errors::BoError;
use crate::models::{Meeting, NewMeeting};
use crate::observability::metrics::record_db_query;
use chrono::{DateTime, Utc};
use common::types::{MeetingId, ProductId, TenantId};
use sqlx::PgPool;
use std::time::Instant;

/// Meeting row (maps to meetings table)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeetingRow {
    pub id: i64,
    pub product_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub owner_tenant_id: i64,
    pub active: bool,
}

impl From<MeetingRow> for Meeting {
    fn from(row: MeetingRow) -> Self {
        Meeting {
            id: MeetingId(row.id),
            product_id: ProductId(row.product_id),
            time: row.scheduled_at,
            owner_tenant_id: TenantId(row.owner_tenant_id),
            active: row.active,
        }
    }
}

fn record(operation: &str, start: Instant, ok: bool) {
    let status = if ok { "success" } else { "error" };
    record_db_query(operation, "meetings", status, start.elapsed());
}

/// Get meeting by id (active or disabled).
pub async fn get_by_id(pool: &PgPool, id: MeetingId) -> Result<Option<Meeting>, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, MeetingRow>(
        r#"
        SELECT id, product_id, scheduled_at, owner_tenant_id, active
        FROM meetings
        WHERE id = $1
        "#,
    )
    .bind(id.get())
    .fetch_optional(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to fetch meeting by id: {}", e)));
    record("select", start, row.is_ok());

    Ok(row?.map(Meeting::from))
}

/// Find the active meeting booked for exactly this product, time and tenant.
pub async fn find_active_slot(
    pool: &PgPool,
    product_id: ProductId,
    time: DateTime<Utc>,
    tenant: TenantId,
) -> Result<Option<Meeting>, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, MeetingRow>(
        r#"
        SELECT id, product_id, scheduled_at, owner_tenant_id, active
        FROM meetings
        WHERE product_id = $1
          AND scheduled_at = $2
          AND owner_tenant_id = $3
          AND active = TRUE
        LIMIT 1
        "#,
    )
    .bind(product_id.get())
    .bind(time)
    .bind(tenant.get())
    .fetch_optional(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to look up meeting slot: {}", e)));
    record("select", start, row.is_ok());

    Ok(row?.map(Meeting::from))
}

/// List the active meetings of a tenant, soonest first.
pub async fn list_active_by_tenant(
    pool: &PgPool,
    tenant: TenantId,
) -> Result<Vec<Meeting>, BoError> {
    let start = Instant::now();
    let rows = sqlx::query_as::<_, MeetingRow>(
        r#"
        SELECT id, product_id, scheduled_at, owner_tenant_id, active
        FROM meetings
        WHERE owner_tenant_id = $1 AND active = TRUE
        ORDER BY scheduled_at, id
        "#,
    )
    .bind(tenant.get())
    .fetch_all(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to list meetings: {}", e)));
    record("select", start, rows.is_ok());

    Ok(rows?.into_iter().map(Meeting::from).collect())
}

/// Persist a validated meeting proposal.
pub async fn create_meeting(pool: &PgPool, new: &NewMeeting) -> Result<Meeting, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, MeetingRow>(
        r#"
        INSERT INTO meetings (product_id, scheduled_at, owner_tenant_id, active)
        VALUES ($1, $2, $3, TRUE)
        RETURNING id, product_id, scheduled_at, owner_tenant_id, active
        "#,
    )
    .bind(new.product_id.get())
    .bind(new.time)
    .bind(new.owner_tenant_id.get())
    .fetch_one(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to create meeting: {}", e)));
    record("insert", start, row.is_ok());

    Ok(Meeting::from(row?))
}

/// Overwrite product, time and active flag of a meeting.
pub async fn update_meeting(pool: &PgPool, meeting: &Meeting) -> Result<Meeting, BoError> {
    let start = Instant::now();
    let row = sqlx::query_as::<_, MeetingRow>(
        r#"
        UPDATE meetings
        SET product_id = $2, scheduled_at = $3, active = $4, updated_at = NOW()
        WHERE id = $1
        RETURNING id, product_id, scheduled_at, owner_tenant_id, active
        "#,
    )
    .bind(meeting.id.get())
    .bind(meeting.product_id.get())
    .bind(meeting.time)
    .bind(meeting.active)
    .fetch_optional(pool)
    .await
    .map_err(|e| BoError::Store(format!("Failed to update meeting: {}", e)));
    record("update", start, row.is_ok());

    row?.map(Meeting::from)
        .ok_or_else(|| BoError::NotFound(format!("Invalid meeting id {}!", meeting.id)))
}
