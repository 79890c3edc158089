//! Repository for the `pigs` table.
//!
//! The engine only touches the pregnancy-related columns; everything else
//! about a pig is owned by the pig registry.

use sqlx::PgExecutor;
use sowcycle_core::types::{CalendarDate, DbId};

use crate::models::pig::{CreatePig, Pig};

/// Column list for `pigs` queries.
const COLUMNS: &str = "id, farm_id, tag, gender, pen_id, is_pregnant, mated_on, \
    expected_birth_on, last_birth_on, deleted_at, created_at, updated_at";

/// Provides the pig registry operations the engine depends on.
pub struct PigRepo;

impl PigRepo {
    /// Insert a new pig, returning the created row.
    pub async fn create(conn: impl PgExecutor<'_>, input: &CreatePig) -> Result<Pig, sqlx::Error> {
        let query = format!(
            "INSERT INTO pigs (farm_id, tag, gender, pen_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pig>(&query)
            .bind(input.farm_id)
            .bind(&input.tag)
            .bind(&input.gender)
            .bind(input.pen_id)
            .fetch_one(conn)
            .await
    }

    /// Find a live pig belonging to `farm_id`.
    pub async fn find_in_farm(
        conn: impl PgExecutor<'_>,
        farm_id: DbId,
        id: DbId,
    ) -> Result<Option<Pig>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pigs \
             WHERE id = $1 AND farm_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Pig>(&query)
            .bind(id)
            .bind(farm_id)
            .fetch_optional(conn)
            .await
    }

    /// Like [`find_in_farm`](Self::find_in_farm) but takes a row lock for the
    /// rest of the transaction. Serialises concurrent writes for one sow.
    pub async fn lock_in_farm(
        conn: impl PgExecutor<'_>,
        farm_id: DbId,
        id: DbId,
    ) -> Result<Option<Pig>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pigs \
             WHERE id = $1 AND farm_id = $2 AND deleted_at IS NULL \
             FOR UPDATE"
        );
        sqlx::query_as::<_, Pig>(&query)
            .bind(id)
            .bind(farm_id)
            .fetch_optional(conn)
            .await
    }

    /// The pig's current pen, if any.
    pub async fn current_pen_id(
        conn: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let pen: Option<Option<DbId>> =
            sqlx::query_scalar("SELECT pen_id FROM pigs WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(pen.flatten())
    }

    /// Flag a sow as pregnant after a mating.
    pub async fn mark_pregnant(
        conn: impl PgExecutor<'_>,
        id: DbId,
        mated_on: CalendarDate,
        expected_birth_on: CalendarDate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE pigs SET is_pregnant = true, mated_on = $2, expected_birth_on = $3, \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(mated_on)
        .bind(expected_birth_on)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Clear pregnancy flags and record the birth date.
    pub async fn record_birth(
        conn: impl PgExecutor<'_>,
        id: DbId,
        birth_date: CalendarDate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE pigs SET is_pregnant = false, mated_on = NULL, expected_birth_on = NULL, \
                last_birth_on = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(birth_date)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Clear pregnancy flags without recording a birth.
    pub async fn clear_pregnancy(conn: impl PgExecutor<'_>, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE pigs SET is_pregnant = false, mated_on = NULL, expected_birth_on = NULL, \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }
}
