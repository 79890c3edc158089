//! Repository for the `notifications` table.

use sqlx::PgExecutor;
use sowcycle_core::types::DbId;

use crate::models::notification::{NewNotification, Notification};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, farm_id, notification_type, priority, title, message, \
    payload, is_read, read_at, created_at";

/// Provides persistence for direct user notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Create a notification, returning the stored row.
    pub async fn create(
        conn: impl PgExecutor<'_>,
        input: &NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications \
                (user_id, farm_id, notification_type, priority, title, message, payload) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.user_id)
            .bind(input.farm_id)
            .bind(&input.notification_type)
            .bind(&input.priority)
            .bind(&input.title)
            .bind(&input.message)
            .bind(&input.payload)
            .fetch_one(conn)
            .await
    }

    /// List notifications for a user, newest first.
    pub async fn list_for_user(
        conn: impl PgExecutor<'_>,
        user_id: DbId,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .fetch_all(conn)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification was found for the given user and updated.
    pub async fn mark_read(
        conn: impl PgExecutor<'_>,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND is_read = false",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
