//! Scheduled alert entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use sowcycle_core::alert::{AlertSeverity, AlertStatus, AlertType};
use sowcycle_core::error::CoreError;
use sowcycle_core::types::{CalendarDate, DbId, Timestamp};

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub farm_id: DbId,
    pub pig_id: DbId,
    pub pen_id: Option<DbId>,
    pub pen_name: Option<String>,
    pub breeding_record_id: Option<DbId>,
    pub name: String,
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    /// UTC midnight of the day the event is due.
    pub alert_start_date: Timestamp,
    /// UTC midnights on which the alert surfaces; never empty.
    pub notify_on: Vec<Timestamp>,
    pub status: String,
    pub created_by: DbId,
    pub resolved_by: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Alert {
    pub fn status(&self) -> Result<AlertStatus, CoreError> {
        AlertStatus::parse(&self.status)
    }

    pub fn alert_type(&self) -> Result<AlertType, CoreError> {
        AlertType::parse(&self.alert_type)
    }

    pub fn start_day(&self) -> CalendarDate {
        self.alert_start_date.date_naive()
    }
}

/// What the scheduler is asked to create.
#[derive(Debug, Clone)]
pub struct AlertSpec {
    pub farm_id: DbId,
    pub pig_id: DbId,
    /// Explicit pen; when `None` the pig's current pen is looked up.
    pub pen_id: Option<DbId>,
    pub breeding_record_id: Option<DbId>,
    pub name: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub start_date: CalendarDate,
    /// Explicit notify-on days; `None` applies the day-before/day-of default.
    pub notify_on: Option<Vec<CalendarDate>>,
}

/// Insert payload once the notify-on set and pen are resolved.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub farm_id: DbId,
    pub pig_id: DbId,
    pub pen_id: Option<DbId>,
    pub pen_name: Option<String>,
    pub breeding_record_id: Option<DbId>,
    pub name: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub alert_start_date: Timestamp,
    pub notify_on: Vec<Timestamp>,
    pub created_by: DbId,
}
