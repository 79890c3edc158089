//! Piglet record entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sowcycle_core::types::{CalendarDate, DbId, Timestamp};

/// A row from the `piglet_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PigletRecord {
    pub id: DbId,
    pub farm_id: DbId,
    pub breeding_record_id: DbId,
    pub birth_history_id: Option<DbId>,
    pub piglet_number: String,
    pub birth_weight_kg: Option<f64>,
    pub gender: String,
    pub color: Option<String>,
    pub status: String,
    pub female_parent_id: Option<DbId>,
    pub male_parent_id: Option<DbId>,
    pub birth_date: CalendarDate,
    pub weaning_date: CalendarDate,
    pub created_by: DbId,
    pub deleted_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Caller input for one piglet of a litter.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePigletRecord {
    pub piglet_number: String,
    /// Must match the breeding record the batch is registered against.
    pub breeding_record_id: DbId,
    pub birth_weight_kg: Option<f64>,
    pub gender: String,
    pub color: Option<String>,
    pub status: Option<String>,
    pub female_parent_id: Option<DbId>,
    pub male_parent_id: Option<DbId>,
}

/// Validated insert payload.
#[derive(Debug, Clone)]
pub struct NewPigletRecord {
    pub farm_id: DbId,
    pub breeding_record_id: DbId,
    pub birth_history_id: DbId,
    pub piglet_number: String,
    pub birth_weight_kg: Option<f64>,
    pub gender: String,
    pub color: Option<String>,
    pub status: String,
    pub female_parent_id: Option<DbId>,
    pub male_parent_id: Option<DbId>,
    pub birth_date: CalendarDate,
    pub weaning_date: CalendarDate,
    pub created_by: DbId,
}
