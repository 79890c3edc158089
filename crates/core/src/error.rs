use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid date for {field}: '{value}' is not a calendar date")]
    InvalidDate { field: &'static str, value: String },

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    /// Whether the error is user-correctable (missing field, bad date,
    /// eligibility rule). These are surfaced verbatim and never retried.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidDate { .. })
    }
}
