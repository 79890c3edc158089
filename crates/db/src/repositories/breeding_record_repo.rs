//! Repository for the `breeding_records` table.
//!
//! Soft-deleted rows are invisible to every lookup here. The partial unique
//! index `uq_breeding_records_open_sow` backs the one-open-record-per-sow
//! invariant; callers lock the sow row before inserting.

use sqlx::PgExecutor;
use sowcycle_core::types::{CalendarDate, DbId};

use crate::models::breeding_record::{BreedingRecord, NewBreedingRecord};

/// Column list for `breeding_records` queries.
const COLUMNS: &str = "id, farm_id, sow_id, boar_id, mating_date, expected_birth_date, \
    alert_date, actual_birth_date, number_of_piglets, notes, created_by, updated_by, \
    deleted_by, deleted_at, created_at, updated_at";

/// Provides persistence for breeding records.
pub struct BreedingRecordRepo;

impl BreedingRecordRepo {
    /// Insert a new (open) breeding record.
    pub async fn create(
        conn: impl PgExecutor<'_>,
        input: &NewBreedingRecord,
    ) -> Result<BreedingRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO breeding_records \
                (farm_id, sow_id, boar_id, mating_date, expected_birth_date, alert_date, \
                 notes, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BreedingRecord>(&query)
            .bind(input.farm_id)
            .bind(input.sow_id)
            .bind(input.boar_id)
            .bind(input.mating_date)
            .bind(input.expected_birth_date)
            .bind(input.alert_date)
            .bind(&input.notes)
            .bind(input.created_by)
            .fetch_one(conn)
            .await
    }

    /// Find a live record by ID.
    pub async fn find_by_id(
        conn: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<BreedingRecord>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM breeding_records WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, BreedingRecord>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find a live record by ID and lock it for the rest of the transaction.
    pub async fn lock_by_id(
        conn: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<BreedingRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM breeding_records \
             WHERE id = $1 AND deleted_at IS NULL \
             FOR UPDATE"
        );
        sqlx::query_as::<_, BreedingRecord>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// The sow's open record, if one exists.
    pub async fn find_open_for_sow(
        conn: impl PgExecutor<'_>,
        farm_id: DbId,
        sow_id: DbId,
    ) -> Result<Option<BreedingRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM breeding_records \
             WHERE farm_id = $1 AND sow_id = $2 \
               AND actual_birth_date IS NULL AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, BreedingRecord>(&query)
            .bind(farm_id)
            .bind(sow_id)
            .fetch_optional(conn)
            .await
    }

    /// The sow's most recent resolved record (by actual birth date).
    pub async fn last_resolved_for_sow(
        conn: impl PgExecutor<'_>,
        farm_id: DbId,
        sow_id: DbId,
    ) -> Result<Option<BreedingRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM breeding_records \
             WHERE farm_id = $1 AND sow_id = $2 \
               AND actual_birth_date IS NOT NULL AND deleted_at IS NULL \
             ORDER BY actual_birth_date DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, BreedingRecord>(&query)
            .bind(farm_id)
            .bind(sow_id)
            .fetch_optional(conn)
            .await
    }

    /// All live records of a sow, newest mating first.
    pub async fn list_for_sow(
        conn: impl PgExecutor<'_>,
        farm_id: DbId,
        sow_id: DbId,
    ) -> Result<Vec<BreedingRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM breeding_records \
             WHERE farm_id = $1 AND sow_id = $2 AND deleted_at IS NULL \
             ORDER BY mating_date DESC, id DESC"
        );
        sqlx::query_as::<_, BreedingRecord>(&query)
            .bind(farm_id)
            .bind(sow_id)
            .fetch_all(conn)
            .await
    }

    /// All open records of a farm, oldest expected birth first.
    pub async fn list_open_for_farm(
        conn: impl PgExecutor<'_>,
        farm_id: DbId,
    ) -> Result<Vec<BreedingRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM breeding_records \
             WHERE farm_id = $1 AND actual_birth_date IS NULL AND deleted_at IS NULL \
             ORDER BY expected_birth_date ASC, id ASC"
        );
        sqlx::query_as::<_, BreedingRecord>(&query)
            .bind(farm_id)
            .fetch_all(conn)
            .await
    }

    /// Close an open record with its birth outcome.
    ///
    /// `notes` replaces the stored notes only when `Some`. Returns `None` if
    /// the record is missing, deleted, or already resolved.
    pub async fn record_birth(
        conn: impl PgExecutor<'_>,
        id: DbId,
        actual_birth_date: CalendarDate,
        number_of_piglets: i32,
        notes: Option<&str>,
        updated_by: DbId,
    ) -> Result<Option<BreedingRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE breeding_records SET \
                actual_birth_date = $2, \
                number_of_piglets = $3, \
                notes = COALESCE($4, notes), \
                updated_by = $5, \
                updated_at = NOW() \
             WHERE id = $1 AND actual_birth_date IS NULL AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BreedingRecord>(&query)
            .bind(id)
            .bind(actual_birth_date)
            .bind(number_of_piglets)
            .bind(notes)
            .bind(updated_by)
            .fetch_optional(conn)
            .await
    }

    /// Soft-delete an open record.
    ///
    /// Returns `false` if the record is missing, already deleted, or resolved.
    pub async fn soft_delete(
        conn: impl PgExecutor<'_>,
        id: DbId,
        deleted_by: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE breeding_records SET deleted_at = NOW(), deleted_by = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND actual_birth_date IS NULL",
        )
        .bind(id)
        .bind(deleted_by)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
