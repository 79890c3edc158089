//! Breeding record state machine and mating eligibility rules.
//!
//! Per sow: `NoOpenRecord -> Mated -> Resolved -> NoOpenRecord`, with
//! `Mated` also able to end through deletion. A record's state is derived
//! from its columns, never stored separately.

use serde::Serialize;

use crate::calendar::{days_between, shift_days};
use crate::error::CoreError;
use crate::profile::BreedingProfile;
use crate::types::CalendarDate;

/// State of a single breeding record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreedingState {
    /// Mating recorded, no birth yet.
    Mated,
    /// Birth outcome recorded.
    Resolved,
    /// Soft-deleted while still open.
    Deleted,
}

/// Mutations a caller may request on an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreedingAction {
    RecordBirth,
    Delete,
}

impl BreedingState {
    pub fn of(actual_birth_date: Option<CalendarDate>, is_deleted: bool) -> Self {
        match (is_deleted, actual_birth_date) {
            (true, _) => Self::Deleted,
            (false, Some(_)) => Self::Resolved,
            (false, None) => Self::Mated,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Mated => "Mated",
            Self::Resolved => "Resolved",
            Self::Deleted => "Deleted",
        }
    }
}

impl BreedingAction {
    fn name(self) -> &'static str {
        match self {
            Self::RecordBirth => "record birth",
            Self::Delete => "delete",
        }
    }
}

/// Only `Mated` records accept a birth outcome or a deletion.
pub fn validate_action(state: BreedingState, action: BreedingAction) -> Result<(), CoreError> {
    match state {
        BreedingState::Mated => Ok(()),
        other => Err(CoreError::Validation(format!(
            "Cannot {} a breeding record in state {}",
            action.name(),
            other.name()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Mating eligibility
// ---------------------------------------------------------------------------

/// A sow may have at most one open record.
pub fn ensure_no_open_record(sow_tag: &str, open_record_id: Option<i64>) -> Result<(), CoreError> {
    match open_record_id {
        Some(id) => Err(CoreError::Validation(format!(
            "Sow {sow_tag} already has an open breeding record ({id}); record its birth or delete it first"
        ))),
        None => Ok(()),
    }
}

/// Enforce weaning plus rest period since the sow's last birth.
///
/// Mating exactly on the first eligible day is allowed.
pub fn ensure_rest_period_elapsed(
    profile: &BreedingProfile,
    sow_tag: &str,
    last_birth: Option<CalendarDate>,
    mating: CalendarDate,
) -> Result<(), CoreError> {
    let Some(last_birth) = last_birth else {
        return Ok(());
    };
    let earliest = shift_days(last_birth, profile.remating_interval_days())?;
    if mating < earliest {
        return Err(CoreError::Validation(format!(
            "Sow {sow_tag} re-mated too soon after weaning: last birth {last_birth}, \
             earliest mating {earliest} ({} days weaning + {} days rest), got {mating} \
             ({} days after birth)",
            profile.weaning_days,
            profile.rest_days,
            days_between(last_birth, mating)
        )));
    }
    Ok(())
}

/// A dependent date may not precede the mating date.
pub fn ensure_not_before_mating(
    field: &'static str,
    mating: CalendarDate,
    date: CalendarDate,
) -> Result<(), CoreError> {
    if date < mating {
        return Err(CoreError::Validation(format!(
            "{field} {date} is before the mating date {mating}"
        )));
    }
    Ok(())
}
