//! Outbound tenant notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{NotificationId, TenantId, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Receipt,
    Due,
    Overdue,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Receipt => "receipt",
            NotificationKind::Due => "due",
            NotificationKind::Overdue => "overdue",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Sms,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::Sms => "sms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

/// A message addressed to a tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub tenant_id: TenantId,
    pub kind: NotificationKind,
    pub channel: NotificationChannel,
    pub message: String,
    /// Set by the sink once delivery has been attempted
    pub status: NotificationStatus,
    /// Free-form tag tying the message to what it is about, e.g. `unit:<id>`
    pub reference: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl Notification {
    /// Payment receipt for a unit
    pub fn receipt(tenant_id: TenantId, unit_id: UnitId, message: impl Into<String>) -> Self {
        Self {
            id: NotificationId::new_v7(),
            tenant_id,
            kind: NotificationKind::Receipt,
            channel: NotificationChannel::Sms,
            message: message.into(),
            status: NotificationStatus::Sent,
            reference: Some(format!("unit:{}", unit_id.as_uuid())),
            sent_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_reference_tag() {
        let unit_id = UnitId::new_v7();
        let notification = Notification::receipt(TenantId::new_v7(), unit_id, "hello");

        assert_eq!(notification.kind, NotificationKind::Receipt);
        assert_eq!(notification.channel.as_str(), "sms");
        assert_eq!(notification.reference, Some(format!("unit:{}", unit_id.as_uuid())));
    }
}
