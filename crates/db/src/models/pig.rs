//! Pig entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sowcycle_core::types::{CalendarDate, DbId, Timestamp};

/// A row from the `pigs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pig {
    pub id: DbId,
    pub farm_id: DbId,
    pub tag: String,
    pub gender: String,
    pub pen_id: Option<DbId>,
    pub is_pregnant: bool,
    pub mated_on: Option<CalendarDate>,
    pub expected_birth_on: Option<CalendarDate>,
    pub last_birth_on: Option<CalendarDate>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a pig.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePig {
    pub farm_id: DbId,
    pub tag: String,
    pub gender: String,
    pub pen_id: Option<DbId>,
}
