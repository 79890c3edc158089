//! Breeding record entity model and DTOs.
//!
//! A breeding record is one mating attempt. It stays open until a birth
//! outcome is recorded or it is deleted.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sowcycle_core::lifecycle::BreedingState;
use sowcycle_core::types::{CalendarDate, DbId, Timestamp};

/// A row from the `breeding_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BreedingRecord {
    pub id: DbId,
    pub farm_id: DbId,
    pub sow_id: DbId,
    pub boar_id: DbId,
    pub mating_date: CalendarDate,
    pub expected_birth_date: CalendarDate,
    /// Pregnancy-confirmation marker.
    pub alert_date: CalendarDate,
    pub actual_birth_date: Option<CalendarDate>,
    pub number_of_piglets: Option<i32>,
    pub notes: Option<String>,
    pub created_by: DbId,
    pub updated_by: Option<DbId>,
    pub deleted_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BreedingRecord {
    pub fn state(&self) -> BreedingState {
        BreedingState::of(self.actual_birth_date, self.deleted_at.is_some())
    }
}

/// Caller input for recording a mating. Dates are raw strings and are
/// validated by the engine; the farm comes from the acting context.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBreedingRecord {
    pub sow_id: DbId,
    pub boar_id: DbId,
    pub mating_date: String,
    pub expected_birth_date: String,
    pub notes: Option<String>,
    /// Overrides the single notify-on date of the "breeding recorded" alert.
    pub notify_on: Option<String>,
    /// Overrides the message of the "breeding recorded" alert.
    pub confirmation_message: Option<String>,
}

/// Caller input for recording a birth outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordBirthOutcome {
    pub actual_birth_date: String,
    pub number_of_piglets: i32,
    pub notes: Option<String>,
}

/// Validated insert payload.
#[derive(Debug, Clone)]
pub struct NewBreedingRecord {
    pub farm_id: DbId,
    pub sow_id: DbId,
    pub boar_id: DbId,
    pub mating_date: CalendarDate,
    pub expected_birth_date: CalendarDate,
    pub alert_date: CalendarDate,
    pub notes: Option<String>,
    pub created_by: DbId,
}

/// Deletion acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedRecord {
    pub id: DbId,
}
