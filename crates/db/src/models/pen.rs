//! Pen entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sowcycle_core::types::{DbId, Timestamp};

/// A row from the `pens` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pen {
    pub id: DbId,
    pub farm_id: DbId,
    pub name: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a pen.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePen {
    pub farm_id: DbId,
    pub name: String,
}
