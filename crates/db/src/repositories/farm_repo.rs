//! Repository for the `farms` table.

use sqlx::PgExecutor;
use sowcycle_core::types::DbId;

use crate::models::farm::{CreateFarm, Farm};

/// Column list for `farms` queries.
const COLUMNS: &str = "id, name, owner_user_id, timezone, created_at, updated_at";

/// Provides the farm lookups the engine needs.
pub struct FarmRepo;

impl FarmRepo {
    /// Insert a new farm, returning the created row.
    pub async fn create(conn: impl PgExecutor<'_>, input: &CreateFarm) -> Result<Farm, sqlx::Error> {
        let query = format!(
            "INSERT INTO farms (name, owner_user_id, timezone) \
             VALUES ($1, $2, COALESCE($3, 'UTC')) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Farm>(&query)
            .bind(&input.name)
            .bind(input.owner_user_id)
            .bind(&input.timezone)
            .fetch_one(conn)
            .await
    }

    /// Find a farm by its primary key.
    pub async fn find_by_id(conn: impl PgExecutor<'_>, id: DbId) -> Result<Option<Farm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM farms WHERE id = $1");
        sqlx::query_as::<_, Farm>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// All farms, by ID.
    pub async fn list(conn: impl PgExecutor<'_>) -> Result<Vec<Farm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM farms ORDER BY id ASC");
        sqlx::query_as::<_, Farm>(&query).fetch_all(conn).await
    }
}
