//! Per-birth aggregate model.

use serde::Serialize;
use sqlx::FromRow;
use sowcycle_core::types::{CalendarDate, DbId, Timestamp};

/// A row from the `pig_birth_histories` table. One per resolved breeding record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PigBirthHistory {
    pub id: DbId,
    pub farm_id: DbId,
    pub sow_id: DbId,
    pub breeding_record_id: DbId,
    pub birth_date: CalendarDate,
    pub total_piglets: i32,
    pub created_by: DbId,
    pub created_at: Timestamp,
}

/// Insert payload.
#[derive(Debug, Clone)]
pub struct NewBirthHistory {
    pub farm_id: DbId,
    pub sow_id: DbId,
    pub breeding_record_id: DbId,
    pub birth_date: CalendarDate,
    pub total_piglets: i32,
    pub created_by: DbId,
}
