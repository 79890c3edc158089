//! Repository for the `pens` table.

use sqlx::PgExecutor;
use sowcycle_core::types::DbId;

use crate::models::pen::{CreatePen, Pen};

/// Column list for `pens` queries.
const COLUMNS: &str = "id, farm_id, name, deleted_at, created_at";

/// Read access to pens. Pen management itself lives outside the engine.
pub struct PenRepo;

impl PenRepo {
    /// Insert a new pen, returning the created row.
    pub async fn create(conn: impl PgExecutor<'_>, input: &CreatePen) -> Result<Pen, sqlx::Error> {
        let query = format!(
            "INSERT INTO pens (farm_id, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pen>(&query)
            .bind(input.farm_id)
            .bind(&input.name)
            .fetch_one(conn)
            .await
    }

    /// Find a live pen by ID. Soft-deleted pens are excluded.
    pub async fn find_by_id(conn: impl PgExecutor<'_>, id: DbId) -> Result<Option<Pen>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pens WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Pen>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Soft-delete a pen. Returns `false` if it was already deleted.
    pub async fn soft_delete(conn: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE pens SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
