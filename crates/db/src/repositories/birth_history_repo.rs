//! Repository for the `pig_birth_histories` table.

use sqlx::PgExecutor;
use sowcycle_core::types::DbId;

use crate::models::birth_history::{NewBirthHistory, PigBirthHistory};

/// Column list for `pig_birth_histories` queries.
const COLUMNS: &str =
    "id, farm_id, sow_id, breeding_record_id, birth_date, total_piglets, created_by, created_at";

/// Provides persistence for per-birth aggregates.
pub struct BirthHistoryRepo;

impl BirthHistoryRepo {
    /// Insert a birth history row.
    ///
    /// Fails with a unique violation on `uq_pig_birth_histories_record` if
    /// the breeding record already has one; use
    /// [`find_for_record`](Self::find_for_record) first.
    pub async fn create(
        conn: impl PgExecutor<'_>,
        input: &NewBirthHistory,
    ) -> Result<PigBirthHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO pig_birth_histories \
                (farm_id, sow_id, breeding_record_id, birth_date, total_piglets, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PigBirthHistory>(&query)
            .bind(input.farm_id)
            .bind(input.sow_id)
            .bind(input.breeding_record_id)
            .bind(input.birth_date)
            .bind(input.total_piglets)
            .bind(input.created_by)
            .fetch_one(conn)
            .await
    }

    /// The birth history of a breeding record, if it exists.
    pub async fn find_for_record(
        conn: impl PgExecutor<'_>,
        breeding_record_id: DbId,
    ) -> Result<Option<PigBirthHistory>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM pig_birth_histories WHERE breeding_record_id = $1");
        sqlx::query_as::<_, PigBirthHistory>(&query)
            .bind(breeding_record_id)
            .fetch_optional(conn)
            .await
    }

    /// Non-zero litter sizes of a sow, most recent birth first.
    pub async fn recent_litter_sizes(
        conn: impl PgExecutor<'_>,
        sow_id: DbId,
        limit: i64,
    ) -> Result<Vec<i32>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT total_piglets FROM pig_birth_histories \
             WHERE sow_id = $1 AND total_piglets > 0 \
             ORDER BY birth_date DESC, id DESC \
             LIMIT $2",
        )
        .bind(sow_id)
        .bind(limit)
        .fetch_all(conn)
        .await
    }
}
