//! Pig attribute constants and validation.

use crate::error::CoreError;

pub const GENDER_FEMALE: &str = "female";
pub const GENDER_MALE: &str = "male";

/// Accepted values of `pigs.gender` and `piglet_records.gender`.
pub const VALID_GENDERS: &[&str] = &[GENDER_FEMALE, GENDER_MALE];

pub const PIGLET_STATUS_ALIVE: &str = "alive";

/// Accepted values of `piglet_records.status`.
pub const VALID_PIGLET_STATUSES: &[&str] =
    &[PIGLET_STATUS_ALIVE, "dead", "stillborn", "fostered", "weaned", "sold"];

/// Maximum length of a piglet number.
pub const MAX_PIGLET_NUMBER_LEN: usize = 32;

pub fn validate_gender(value: &str) -> Result<(), CoreError> {
    if VALID_GENDERS.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid gender '{value}'. Must be one of: {}",
            VALID_GENDERS.join(", ")
        )))
    }
}

pub fn validate_piglet_status(value: &str) -> Result<(), CoreError> {
    if VALID_PIGLET_STATUSES.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid piglet status '{value}'. Must be one of: {}",
            VALID_PIGLET_STATUSES.join(", ")
        )))
    }
}

/// Require a pig acting in `role` ("sow", "boar", ...) to have `expected` gender.
pub fn ensure_gender(role: &str, tag: &str, actual: &str, expected: &str) -> Result<(), CoreError> {
    if actual == expected {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{role} {tag} must be {expected}, but is {actual}"
        )))
    }
}
