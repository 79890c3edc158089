//! Repository for the `piglet_records` table.

use sqlx::PgExecutor;
use sowcycle_core::types::DbId;

use crate::models::piglet::{NewPigletRecord, PigletRecord};

/// Column list for `piglet_records` queries.
const COLUMNS: &str = "id, farm_id, breeding_record_id, birth_history_id, piglet_number, \
    birth_weight_kg, gender, color, status, female_parent_id, male_parent_id, birth_date, \
    weaning_date, created_by, deleted_by, deleted_at, created_at";

/// Provides persistence for piglet records.
pub struct PigletRepo;

impl PigletRepo {
    /// Insert a piglet record.
    pub async fn create(
        conn: impl PgExecutor<'_>,
        input: &NewPigletRecord,
    ) -> Result<PigletRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO piglet_records \
                (farm_id, breeding_record_id, birth_history_id, piglet_number, birth_weight_kg, \
                 gender, color, status, female_parent_id, male_parent_id, birth_date, \
                 weaning_date, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PigletRecord>(&query)
            .bind(input.farm_id)
            .bind(input.breeding_record_id)
            .bind(input.birth_history_id)
            .bind(&input.piglet_number)
            .bind(input.birth_weight_kg)
            .bind(&input.gender)
            .bind(&input.color)
            .bind(&input.status)
            .bind(input.female_parent_id)
            .bind(input.male_parent_id)
            .bind(input.birth_date)
            .bind(input.weaning_date)
            .bind(input.created_by)
            .fetch_one(conn)
            .await
    }

    /// Number of live piglets registered against a breeding record.
    pub async fn count_for_record(
        conn: impl PgExecutor<'_>,
        breeding_record_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM piglet_records \
             WHERE breeding_record_id = $1 AND deleted_at IS NULL",
        )
        .bind(breeding_record_id)
        .fetch_one(conn)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Which of `numbers` are already taken by live piglets of the farm.
    pub async fn existing_numbers(
        conn: impl PgExecutor<'_>,
        farm_id: DbId,
        numbers: &[String],
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT piglet_number FROM piglet_records \
             WHERE farm_id = $1 AND piglet_number = ANY($2) AND deleted_at IS NULL \
             ORDER BY piglet_number",
        )
        .bind(farm_id)
        .bind(numbers)
        .fetch_all(conn)
        .await
    }

    /// Live piglets of a breeding record, in registration order.
    pub async fn list_for_record(
        conn: impl PgExecutor<'_>,
        breeding_record_id: DbId,
    ) -> Result<Vec<PigletRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM piglet_records \
             WHERE breeding_record_id = $1 AND deleted_at IS NULL \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, PigletRecord>(&query)
            .bind(breeding_record_id)
            .fetch_all(conn)
            .await
    }

    /// Soft-delete every live piglet of a breeding record.
    pub async fn soft_delete_for_record(
        conn: impl PgExecutor<'_>,
        breeding_record_id: DbId,
        deleted_by: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE piglet_records SET deleted_at = NOW(), deleted_by = $2 \
             WHERE breeding_record_id = $1 AND deleted_at IS NULL",
        )
        .bind(breeding_record_id)
        .bind(deleted_by)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
