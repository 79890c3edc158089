//! Direct (unscheduled) user notification model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use sowcycle_core::types::{DbId, Timestamp};

/// Priority for notifications that need attention before others.
pub const PRIORITY_HIGH: &str = "high";

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub farm_id: Option<DbId>,
    pub notification_type: String,
    pub priority: String,
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Insert payload for a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: DbId,
    pub farm_id: Option<DbId>,
    pub notification_type: String,
    pub priority: String,
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
}
