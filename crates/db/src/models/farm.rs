//! Farm entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sowcycle_core::types::{DbId, Timestamp};

/// A row from the `farms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Farm {
    pub id: DbId,
    pub name: String,
    pub owner_user_id: DbId,
    /// Display timezone. Never used for date arithmetic.
    pub timezone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a farm.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFarm {
    pub name: String,
    pub owner_user_id: DbId,
    pub timezone: Option<String>,
}
