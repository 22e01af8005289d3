//! Notification log repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, row: &NotificationRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                notification_id, tenant_id, kind, channel, message, status, reference, sent_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(row.notification_id)
        .bind(row.tenant_id)
        .bind(&row.kind)
        .bind(&row.channel)
        .bind(&row.message)
        .bind(&row.status)
        .bind(&row.reference)
        .bind(row.sent_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent notifications for a tenant, newest first
    pub async fn list_for_tenant(&self, tenant_id: Uuid, limit: i64) -> Result<Vec<NotificationRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT notification_id, tenant_id, kind, channel, message, status, reference, sent_at
            FROM notifications
            WHERE tenant_id = $1
            ORDER BY sent_at DESC
            LIMIT $2
            "#,
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    pub notification_id: Uuid,
    pub tenant_id: Uuid,
    pub kind: String,
    pub channel: String,
    pub message: String,
    pub status: String,
    pub reference: Option<String>,
    pub sent_at: DateTime<Utc>,
}
