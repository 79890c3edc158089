use sowcycle_core::error::CoreError;

/// PostgreSQL `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL `serialization_failure`.
const PG_SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL `deadlock_detected`.
const PG_DEADLOCK_DETECTED: &str = "40P01";

/// Error type returned by every engine operation.
///
/// Wraps [`CoreError`] for domain errors and `sqlx::Error` for everything
/// the store reports.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error from `sowcycle_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for engine return values.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Validation and not-found errors: surfaced verbatim, never retried.
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Core(core) => core.is_validation() || matches!(core, CoreError::NotFound { .. }),
            Self::Database(_) => false,
        }
    }

    /// Whether the store rolled the transaction back because of a concurrent
    /// write: a unique violation on a `uq_` constraint, a serialization
    /// failure, or a deadlock.
    pub fn is_integrity_conflict(&self) -> bool {
        let Self::Database(sqlx::Error::Database(db_err)) = self else {
            return false;
        };
        match db_err.code().as_deref() {
            Some(PG_UNIQUE_VIOLATION) => db_err
                .constraint()
                .is_some_and(|name| name.starts_with("uq_")),
            Some(PG_SERIALIZATION_FAILURE) | Some(PG_DEADLOCK_DETECTED) => true,
            _ => false,
        }
    }
}
