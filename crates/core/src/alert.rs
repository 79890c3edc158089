//! Scheduled alert classification and the notify-on convention.

use serde::{Deserialize, Serialize};

use crate::calendar::{shift_days, utc_midnight};
use crate::error::CoreError;
use crate::types::{CalendarDate, Timestamp};

/// Which part of the breeding cycle an alert belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    /// Raised between mating and birth.
    Breeding,
    /// Raised after a litter is born.
    Birth,
}

/// How urgently a user should act on an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// Alert lifecycle. `Completed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Pending,
    /// The outcome the alert anticipated was recorded.
    Completed,
    /// The breeding record the alert belonged to was cancelled.
    Rejected,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breeding => "breeding",
            Self::Birth => "birth",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "breeding" => Ok(Self::Breeding),
            "birth" => Ok(Self::Birth),
            other => Err(CoreError::Validation(format!("Unknown alert type '{other}'"))),
        }
    }
}

impl AlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(CoreError::Validation(format!(
                "Unknown alert severity '{other}'"
            ))),
        }
    }
}

impl AlertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown alert status '{other}'"
            ))),
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Bulk cancellation may only move pending alerts into a terminal state.
pub fn validate_cancel_target(target: AlertStatus) -> Result<(), CoreError> {
    if target.is_terminal() {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Alerts can only be cancelled to 'completed' or 'rejected'".to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Notify-on convention
// ---------------------------------------------------------------------------

/// The default notify-on days for an alert starting on `start`:
/// the day before and the day itself.
pub fn default_notify_on(start: CalendarDate) -> Result<Vec<CalendarDate>, CoreError> {
    Ok(vec![shift_days(start, -1)?, start])
}

/// Normalise a notify-on set into sorted, de-duplicated UTC midnights.
///
/// Fails when the set is empty.
pub fn notify_on_timestamps(days: &[CalendarDate]) -> Result<Vec<Timestamp>, CoreError> {
    if days.is_empty() {
        return Err(CoreError::Validation(
            "An alert needs at least one notify-on date".to_string(),
        ));
    }
    let mut sorted = days.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    Ok(sorted.into_iter().map(utc_midnight).collect())
}
