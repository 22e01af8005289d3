//! PostgreSQL Notification Log
//!
//! `NotificationSink` that records every outbound message in the
//! `notifications` table. Delivery to an SMS gateway is out of scope; the
//! stored row is what operators read back.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, TenantId};
use domain_billing::{Notification, NotificationSink};

use crate::repositories::notification::{NotificationRepository, NotificationRow};

#[derive(Debug, Clone)]
pub struct PostgresNotificationLog {
    repository: NotificationRepository,
    pool: PgPool,
}

impl PostgresNotificationLog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: NotificationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Latest messages sent to a tenant
    pub async fn recent_for_tenant(&self, tenant_id: TenantId, limit: i64) -> Result<Vec<NotificationRow>, PortError> {
        Ok(self.repository.list_for_tenant(*tenant_id.as_uuid(), limit).await?)
    }
}

impl DomainPort for PostgresNotificationLog {}

#[async_trait]
impl HealthCheckable for PostgresNotificationLog {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-notification-log").await
    }
}

#[async_trait]
impl NotificationSink for PostgresNotificationLog {
    #[instrument(skip(self, notification), fields(notification_id = %notification.id, kind = %notification.kind))]
    async fn send(&self, notification: &Notification) -> Result<(), PortError> {
        let row = NotificationRow {
            notification_id: *notification.id.as_uuid(),
            tenant_id: *notification.tenant_id.as_uuid(),
            kind: notification.kind.as_str().to_string(),
            channel: notification.channel.as_str().to_string(),
            message: notification.message.clone(),
            status: notification.status.as_str().to_string(),
            reference: notification.reference.clone(),
            sent_at: notification.sent_at,
        };
        self.repository.insert(&row).await?;
        info!(tenant_id = %notification.tenant_id, "Notification recorded");
        Ok(())
    }
}
