//! Litter registration checks: capacity, piglet numbering, lineage.
//!
//! Hard failures come back as `Err(CoreError::Validation)`. Lineage
//! inconsistencies that should not block a write come back as
//! [`LineageWarning`]s for the caller to display.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::pig::{ensure_gender, GENDER_FEMALE, GENDER_MALE, MAX_PIGLET_NUMBER_LEN};
use crate::types::DbId;

/// A parent pig as resolved from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentPig {
    pub id: DbId,
    pub tag: String,
    pub gender: String,
}

/// Advisory finding about a piglet's declared lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineageWarning {
    pub piglet_number: String,
    pub message: String,
}

/// Validate and normalise a piglet number.
pub fn normalize_piglet_number(raw: &str) -> Result<String, CoreError> {
    let number = raw.trim();
    if number.is_empty() {
        return Err(CoreError::Validation("Piglet number is required".to_string()));
    }
    if number.len() > MAX_PIGLET_NUMBER_LEN {
        return Err(CoreError::Validation(format!(
            "Piglet number '{number}' exceeds {MAX_PIGLET_NUMBER_LEN} characters"
        )));
    }
    Ok(number.to_string())
}

/// Reject a batch that repeats a piglet number.
pub fn ensure_unique_in_batch<'a>(
    numbers: impl IntoIterator<Item = &'a str>,
) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for number in numbers {
        if !seen.insert(number) {
            return Err(CoreError::Validation(format!(
                "Piglet number '{number}' appears more than once in this batch"
            )));
        }
    }
    Ok(())
}

/// A litter may carry at most `recorded + tolerance` piglet rows.
pub fn ensure_capacity(
    recorded_litter: i32,
    tolerance: i64,
    already_registered: i64,
    incoming: usize,
) -> Result<(), CoreError> {
    let limit = i64::from(recorded_litter) + tolerance;
    let total = already_registered + incoming as i64;
    if total > limit {
        return Err(CoreError::Validation(format!(
            "Litter size exceeded: {total} piglets would be registered \
             ({already_registered} existing + {incoming} new) but the record allows at most {limit}"
        )));
    }
    Ok(())
}

/// Check declared parents against the breeding record.
///
/// The female parent must be the record's sow and female; that is a hard
/// failure. A male parent that is not the record's boar, or not male, is
/// reported as a warning only.
pub fn assess_lineage(
    piglet_number: &str,
    sow_id: DbId,
    boar_id: DbId,
    female_parent: Option<&ParentPig>,
    male_parent: Option<&ParentPig>,
) -> Result<Vec<LineageWarning>, CoreError> {
    if let Some(female) = female_parent {
        if female.id != sow_id {
            return Err(CoreError::Validation(format!(
                "Piglet {piglet_number}: female parent {} is not the sow of this breeding record",
                female.tag
            )));
        }
        ensure_gender("Female parent", &female.tag, &female.gender, GENDER_FEMALE)?;
    }

    let mut warnings = Vec::new();
    if let Some(male) = male_parent {
        if male.id != boar_id {
            warnings.push(LineageWarning {
                piglet_number: piglet_number.to_string(),
                message: format!("Male parent {} is not the boar of this breeding record", male.tag),
            });
        }
        if male.gender != GENDER_MALE {
            warnings.push(LineageWarning {
                piglet_number: piglet_number.to_string(),
                message: format!("Male parent {} is recorded as {}", male.tag, male.gender),
            });
        }
    }
    Ok(warnings)
}
