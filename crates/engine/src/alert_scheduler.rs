//! Translates milestones into persisted alerts and manages their status.
//!
//! All writes take a `&mut PgConnection` so they join the caller's
//! transaction. The scheduler never opens a transaction of its own.

use sqlx::{Connection, PgConnection, PgExecutor};
use sowcycle_core::alert::{
    default_notify_on, notify_on_timestamps, validate_cancel_target, AlertStatus, AlertType,
};
use sowcycle_core::calendar::utc_midnight;
use sowcycle_core::types::{CalendarDate, DbId};
use sowcycle_db::models::alert::{Alert, AlertSpec, NewAlert};
use sowcycle_db::models::pen::Pen;
use sowcycle_db::repositories::{AlertRepo, PenRepo, PigRepo};

use crate::error::EngineResult;

/// Creates, cancels and queries scheduled alerts.
pub struct AlertScheduler;

impl AlertScheduler {
    /// Persist a pending alert.
    ///
    /// Without explicit notify-on dates the alert notifies on the day before
    /// and the day of its start date. The pen is resolved best-effort: when
    /// the lookup fails the alert is stored without one.
    pub async fn create_alert(
        conn: &mut PgConnection,
        spec: &AlertSpec,
        created_by: DbId,
    ) -> EngineResult<Alert> {
        let notify_days = match &spec.notify_on {
            Some(days) => days.clone(),
            None => default_notify_on(spec.start_date)?,
        };
        let notify_on = notify_on_timestamps(&notify_days)?;

        let pen = match lookup_pen(&mut *conn, spec).await {
            Ok(pen) => pen,
            Err(e) => {
                tracing::warn!(
                    pig_id = spec.pig_id,
                    alert = %spec.name,
                    error = %e,
                    "Pen lookup failed, storing alert without pen"
                );
                None
            }
        };

        let input = NewAlert {
            farm_id: spec.farm_id,
            pig_id: spec.pig_id,
            pen_id: pen.as_ref().map(|p| p.id),
            pen_name: pen.map(|p| p.name),
            breeding_record_id: spec.breeding_record_id,
            name: spec.name.clone(),
            alert_type: spec.alert_type,
            severity: spec.severity,
            message: spec.message.clone(),
            alert_start_date: utc_midnight(spec.start_date),
            notify_on,
            created_by,
        };
        Ok(AlertRepo::create(&mut *conn, &input).await?)
    }

    /// Move every pending alert of `pig_id` with a type in `alert_types` to
    /// `target`, which must be terminal. Returns how many alerts changed;
    /// repeating the call changes nothing.
    pub async fn cancel_alerts(
        conn: impl PgExecutor<'_>,
        pig_id: DbId,
        alert_types: &[AlertType],
        target: AlertStatus,
        resolved_by: DbId,
    ) -> EngineResult<u64> {
        validate_cancel_target(target)?;
        let changed =
            AlertRepo::resolve_pending_for_pig(conn, pig_id, alert_types, target, resolved_by)
                .await?;
        tracing::debug!(pig_id, target = target.as_str(), changed, "Alerts cancelled");
        Ok(changed)
    }

    /// Cancel the pending alerts created for one breeding record, leaving
    /// alerts of the sow's other records alone.
    pub async fn cancel_record_alerts(
        conn: impl PgExecutor<'_>,
        breeding_record_id: DbId,
        alert_types: &[AlertType],
        target: AlertStatus,
        resolved_by: DbId,
    ) -> EngineResult<u64> {
        validate_cancel_target(target)?;
        let changed = AlertRepo::resolve_pending_for_record(
            conn,
            breeding_record_id,
            alert_types,
            target,
            resolved_by,
        )
        .await?;
        tracing::debug!(
            breeding_record_id,
            target = target.as_str(),
            changed,
            "Record alerts cancelled"
        );
        Ok(changed)
    }

    /// Pending alerts of a pig, earliest start first.
    pub async fn pending_for_pig(
        conn: impl PgExecutor<'_>,
        pig_id: DbId,
    ) -> EngineResult<Vec<Alert>> {
        Ok(AlertRepo::list_pending_for_pig(conn, pig_id).await?)
    }

    /// Pending alerts that should surface on `day`.
    pub async fn due_on(conn: impl PgExecutor<'_>, day: CalendarDate) -> EngineResult<Vec<Alert>> {
        Ok(AlertRepo::list_due_on(conn, utc_midnight(day)).await?)
    }
}

/// Runs inside a savepoint so a failed lookup does not abort the caller's
/// transaction.
async fn lookup_pen(conn: &mut PgConnection, spec: &AlertSpec) -> Result<Option<Pen>, sqlx::Error> {
    let mut savepoint = conn.begin().await?;
    let pen_id = match spec.pen_id {
        Some(id) => Some(id),
        None => PigRepo::current_pen_id(&mut *savepoint, spec.pig_id).await?,
    };
    let pen = match pen_id {
        Some(id) => PenRepo::find_by_id(&mut *savepoint, id).await?,
        None => None,
    };
    savepoint.commit().await?;
    Ok(pen)
}
