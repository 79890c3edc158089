//! Repository for the `alerts` table.

use sqlx::PgExecutor;
use sowcycle_core::alert::{AlertStatus, AlertType};
use sowcycle_core::types::{DbId, Timestamp};

use crate::models::alert::{Alert, NewAlert};

/// Column list for `alerts` queries.
const COLUMNS: &str = "id, farm_id, pig_id, pen_id, pen_name, breeding_record_id, name, \
    alert_type, severity, message, alert_start_date, notify_on, status, created_by, \
    resolved_by, resolved_at, created_at, updated_at";

/// Provides persistence for scheduled alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Insert a pending alert.
    pub async fn create(conn: impl PgExecutor<'_>, input: &NewAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts \
                (farm_id, pig_id, pen_id, pen_name, breeding_record_id, name, alert_type, \
                 severity, message, alert_start_date, notify_on, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.farm_id)
            .bind(input.pig_id)
            .bind(input.pen_id)
            .bind(&input.pen_name)
            .bind(input.breeding_record_id)
            .bind(&input.name)
            .bind(input.alert_type.as_str())
            .bind(input.severity.as_str())
            .bind(&input.message)
            .bind(input.alert_start_date)
            .bind(&input.notify_on)
            .bind(input.created_by)
            .fetch_one(conn)
            .await
    }

    /// Move every pending alert of `pig_id` whose type is in `alert_types`
    /// to `target`. Already-resolved alerts are untouched, so repeating the
    /// call is a no-op. Returns the number of alerts transitioned.
    pub async fn resolve_pending_for_pig(
        conn: impl PgExecutor<'_>,
        pig_id: DbId,
        alert_types: &[AlertType],
        target: AlertStatus,
        resolved_by: DbId,
    ) -> Result<u64, sqlx::Error> {
        let types: Vec<&str> = alert_types.iter().map(|t| t.as_str()).collect();
        let result = sqlx::query(
            "UPDATE alerts SET status = $3, resolved_by = $4, resolved_at = NOW(), \
                updated_at = NOW() \
             WHERE pig_id = $1 AND alert_type = ANY($2) AND status = 'pending'",
        )
        .bind(pig_id)
        .bind(&types)
        .bind(target.as_str())
        .bind(resolved_by)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Same as [`resolve_pending_for_pig`](Self::resolve_pending_for_pig) but
    /// limited to the alerts created for one breeding record.
    pub async fn resolve_pending_for_record(
        conn: impl PgExecutor<'_>,
        breeding_record_id: DbId,
        alert_types: &[AlertType],
        target: AlertStatus,
        resolved_by: DbId,
    ) -> Result<u64, sqlx::Error> {
        let types: Vec<&str> = alert_types.iter().map(|t| t.as_str()).collect();
        let result = sqlx::query(
            "UPDATE alerts SET status = $3, resolved_by = $4, resolved_at = NOW(), \
                updated_at = NOW() \
             WHERE breeding_record_id = $1 AND alert_type = ANY($2) AND status = 'pending'",
        )
        .bind(breeding_record_id)
        .bind(&types)
        .bind(target.as_str())
        .bind(resolved_by)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// All alerts of a pig, ordered by start date then ID.
    pub async fn list_for_pig(conn: impl PgExecutor<'_>, pig_id: DbId) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts WHERE pig_id = $1 \
             ORDER BY alert_start_date ASC, id ASC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(pig_id)
            .fetch_all(conn)
            .await
    }

    /// Pending alerts of a pig, ordered by start date then ID.
    pub async fn list_pending_for_pig(
        conn: impl PgExecutor<'_>,
        pig_id: DbId,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts WHERE pig_id = $1 AND status = 'pending' \
             ORDER BY alert_start_date ASC, id ASC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(pig_id)
            .fetch_all(conn)
            .await
    }

    /// All alerts created for a breeding record.
    pub async fn list_for_record(
        conn: impl PgExecutor<'_>,
        breeding_record_id: DbId,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts WHERE breeding_record_id = $1 \
             ORDER BY alert_start_date ASC, id ASC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(breeding_record_id)
            .fetch_all(conn)
            .await
    }

    /// Pending alerts whose notify-on set contains `day` (a UTC midnight).
    ///
    /// This is the query the delivery system polls.
    pub async fn list_due_on(
        conn: impl PgExecutor<'_>,
        day: Timestamp,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             WHERE status = 'pending' AND notify_on @> ARRAY[$1]::timestamptz[] \
             ORDER BY farm_id, alert_start_date ASC, id ASC"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(day)
            .fetch_all(conn)
            .await
    }
}
