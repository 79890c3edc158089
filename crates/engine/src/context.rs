//! Caller scope supplied on every mutating operation.

use sowcycle_core::types::DbId;

/// The farm an operation is scoped to and the user performing it.
///
/// The user id is stored in audit columns and used as the recipient of
/// culling notifications; the engine does not otherwise interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingContext {
    pub farm_id: DbId,
    pub user_id: DbId,
}

impl ActingContext {
    pub fn new(farm_id: DbId, user_id: DbId) -> Self {
        Self { farm_id, user_id }
    }
}
